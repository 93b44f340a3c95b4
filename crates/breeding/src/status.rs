//! Time-relative derivations: cycle status, gestation progress, urgency and
//! management-event status.
//!
//! Everything here is recomputed from a cycle and a `today` date on every
//! read. Nothing is cached or stored, because the answers change with the
//! calendar alone.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use farrowline_core::{Clock, days_between};

use crate::cycle::BreedingCycle;
use crate::schedule::{EventKind, ManagementEvent};

/// Days after farrowing during which a sow is considered lactating.
pub const LACTATION_DAYS: i64 = 28;

/// Days-until-farrowing threshold (inclusive) for [`Urgency::High`].
pub const HIGH_URGENCY_DAYS: i64 = 7;

/// Days-until-farrowing threshold (inclusive) for [`Urgency::Medium`].
pub const MEDIUM_URGENCY_DAYS: i64 = 14;

/// Reproductive status of a cycle, evaluated in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CycleStatus {
    /// Farrowed within the last 28 days.
    Lactating,
    /// Farrowed more than 28 days ago: weaned, ready to re-breed.
    Empty,
    Pregnant,
    NotPregnant,
}

/// Presentation hint attached to a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    Purple,
    Gray,
    Green,
    Red,
}

impl CycleStatus {
    pub const ALL: [CycleStatus; 4] = [
        CycleStatus::Lactating,
        CycleStatus::Empty,
        CycleStatus::Pregnant,
        CycleStatus::NotPregnant,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CycleStatus::Lactating => "LACTATING",
            CycleStatus::Empty => "EMPTY",
            CycleStatus::Pregnant => "PREGNANT",
            CycleStatus::NotPregnant => "NOT_PREGNANT",
        }
    }

    pub fn tone(self) -> StatusTone {
        match self {
            CycleStatus::Lactating => StatusTone::Purple,
            CycleStatus::Empty => StatusTone::Gray,
            CycleStatus::Pregnant => StatusTone::Green,
            CycleStatus::NotPregnant => StatusTone::Red,
        }
    }
}

impl core::fmt::Display for CycleStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

impl core::str::FromStr for CycleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        CycleStatus::ALL
            .into_iter()
            .find(|status| status.label() == wanted)
            .ok_or_else(|| format!("unknown status '{s}'"))
    }
}

/// Classify a cycle as of `today`.
///
/// A farrowing date after `today` is not a valid record; should one slip
/// through, it classifies as [`CycleStatus::Empty`].
pub fn classify(cycle: &BreedingCycle, today: NaiveDate) -> CycleStatus {
    if let Some(outcome) = cycle.farrowing_outcome() {
        let elapsed = days_between(outcome.actual_date, today);
        return if (0..=LACTATION_DAYS).contains(&elapsed) {
            CycleStatus::Lactating
        } else {
            CycleStatus::Empty
        };
    }
    if cycle.pregnancy().is_confirmed() {
        CycleStatus::Pregnant
    } else {
        CycleStatus::NotPregnant
    }
}

/// Farrowing urgency tier for a gestating cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    High,
    Medium,
    Low,
}

impl Urgency {
    /// Tier for a days-until-farrowing count; bounds are inclusive on the more urgent tier.
    pub fn from_days_until_farrowing(days: i64) -> Self {
        if days <= HIGH_URGENCY_DAYS {
            Urgency::High
        } else if days <= MEDIUM_URGENCY_DAYS {
            Urgency::Medium
        } else {
            Urgency::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Urgency::High => "HIGH",
            Urgency::Medium => "MEDIUM",
            Urgency::Low => "LOW",
        }
    }
}

/// Gestation progress of a confirmed, not-yet-farrowed cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestationProgress {
    /// 1-indexed: the first insemination date is day 1.
    pub gestation_day: i64,
    pub expected_farrowing_date: NaiveDate,
    /// Positive: in the future. Zero: due today. Negative: overdue.
    pub days_until_farrowing: i64,
    pub urgency: Urgency,
}

impl GestationProgress {
    pub fn is_overdue(&self) -> bool {
        self.days_until_farrowing < 0
    }
}

/// Progress for a gestating cycle; `None` when the cycle is not confirmed or already farrowed.
pub fn gestation_progress(cycle: &BreedingCycle, today: NaiveDate) -> Option<GestationProgress> {
    if !cycle.is_gestating() {
        return None;
    }
    let expected_farrowing_date = cycle.expected_farrowing_date();
    let days_until_farrowing = days_between(today, expected_farrowing_date);
    Some(GestationProgress {
        gestation_day: days_between(cycle.first_insemination_date(), today) + 1,
        expected_farrowing_date,
        days_until_farrowing,
        urgency: Urgency::from_days_until_farrowing(days_until_farrowing),
    })
}

/// Status of one scheduled management event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EventStatus {
    Done { completed_on: Option<NaiveDate> },
    Today,
    Upcoming { days: i64 },
    Overdue { days_late: i64 },
}

impl EventStatus {
    pub fn of(event: &ManagementEvent, today: NaiveDate) -> Self {
        if event.is_completed() {
            return EventStatus::Done {
                completed_on: event.completion_date(),
            };
        }
        let days = days_between(today, event.expected_date());
        match days {
            0 => EventStatus::Today,
            d if d > 0 => EventStatus::Upcoming { days: d },
            d => EventStatus::Overdue { days_late: -d },
        }
    }
}

impl core::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EventStatus::Done {
                completed_on: Some(date),
            } => write!(f, "done on {}", date.format("%d/%m/%Y")),
            EventStatus::Done { completed_on: None } => f.write_str("done"),
            EventStatus::Today => f.write_str("today"),
            EventStatus::Upcoming { days } => write!(f, "in {days} days"),
            EventStatus::Overdue { days_late } => write!(f, "overdue by {days_late} days"),
        }
    }
}

/// A management event with its status as of a given day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventView {
    pub kind: EventKind,
    pub label: &'static str,
    pub gestation_day: u32,
    pub expected_date: NaiveDate,
    pub notes: String,
    pub status: EventStatus,
}

/// Everything time-relative about one cycle, resolved against a single `today`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleView {
    pub today: NaiveDate,
    pub status: CycleStatus,
    pub tone: StatusTone,
    pub progress: Option<GestationProgress>,
    /// First insemination plus the heat interval, whatever date was recorded.
    pub expected_return_to_heat_date: NaiveDate,
    pub events: Vec<EventView>,
}

impl CycleView {
    pub fn at(cycle: &BreedingCycle, today: NaiveDate) -> Self {
        let status = classify(cycle, today);
        let events = cycle
            .management_schedule()
            .map(|schedule| {
                schedule
                    .iter()
                    .map(|event| EventView {
                        kind: event.kind(),
                        label: event.label(),
                        gestation_day: event.gestation_day_offset(),
                        expected_date: event.expected_date(),
                        notes: event.notes().to_string(),
                        status: EventStatus::of(event, today),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            today,
            status,
            tone: status.tone(),
            progress: gestation_progress(cycle, today),
            expected_return_to_heat_date: cycle.expected_return_to_heat_date(),
            events,
        }
    }

    /// Resolve `today` from a clock once, then derive.
    pub fn now<C: Clock + ?Sized>(cycle: &BreedingCycle, clock: &C) -> Self {
        Self::at(cycle, clock.today())
    }
}
