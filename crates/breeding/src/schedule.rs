//! Milestone schedule generator.
//!
//! Gestation day 1 is the first insemination date itself, so a task due on
//! gestation day `N` lands `N - 1` days after that date. The farrowing and
//! return-to-heat milestones are plain offsets from the same anchor.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use farrowline_core::{DomainError, add_days};

/// Days from first insemination to expected farrowing.
pub const GESTATION_LENGTH_DAYS: i64 = 114;

/// Days from first insemination to the expected return to heat.
pub const RETURN_TO_HEAT_DAYS: i64 = 21;

/// Expected farrowing date for a given first insemination date.
pub fn expected_farrowing_date(first_insemination: NaiveDate) -> NaiveDate {
    add_days(first_insemination, GESTATION_LENGTH_DAYS)
}

/// Expected return-to-heat date for a given first insemination date.
pub fn expected_return_to_heat_date(first_insemination: NaiveDate) -> NaiveDate {
    add_days(first_insemination, RETURN_TO_HEAT_DAYS)
}

/// Calendar date of a 1-indexed gestation day.
pub fn gestation_day_date(first_insemination: NaiveDate, gestation_day: u32) -> NaiveDate {
    add_days(first_insemination, i64::from(gestation_day) - 1)
}

/// The fixed husbandry tasks scheduled during gestation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    FirstAntibiotic,
    SecondAntibiotic,
    Deworming,
    Transfer,
}

struct EventSpec {
    kind: EventKind,
    code: &'static str,
    label: &'static str,
    gestation_day: u32,
}

const EVENT_TABLE: [EventSpec; 4] = [
    EventSpec {
        kind: EventKind::FirstAntibiotic,
        code: "coli1",
        label: "First antibiotic dose",
        gestation_day: 80,
    },
    EventSpec {
        kind: EventKind::SecondAntibiotic,
        code: "coli2",
        label: "Second antibiotic dose",
        gestation_day: 100,
    },
    EventSpec {
        kind: EventKind::Deworming,
        code: "deworming",
        label: "Deworming",
        gestation_day: 100,
    },
    EventSpec {
        kind: EventKind::Transfer,
        code: "transfer",
        label: "Transfer to maternity ward",
        gestation_day: 107,
    },
];

impl EventKind {
    /// All kinds, in schedule order.
    pub const ALL: [EventKind; 4] = [
        EventKind::FirstAntibiotic,
        EventKind::SecondAntibiotic,
        EventKind::Deworming,
        EventKind::Transfer,
    ];

    fn index(self) -> usize {
        match self {
            EventKind::FirstAntibiotic => 0,
            EventKind::SecondAntibiotic => 1,
            EventKind::Deworming => 2,
            EventKind::Transfer => 3,
        }
    }

    fn spec(self) -> &'static EventSpec {
        &EVENT_TABLE[self.index()]
    }

    /// Gestation day on which the task is due (1-indexed).
    pub fn gestation_day_offset(self) -> u32 {
        self.spec().gestation_day
    }

    pub fn label(self) -> &'static str {
        self.spec().label
    }

    /// Short code accepted on the command line.
    pub fn code(self) -> &'static str {
        self.spec().code
    }
}

impl core::fmt::Display for EventKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

impl core::str::FromStr for EventKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        EVENT_TABLE
            .iter()
            .find(|spec| spec.code == needle)
            .map(|spec| spec.kind)
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "unknown management event '{s}' (expected one of: coli1, coli2, deworming, transfer)"
                ))
            })
    }
}

/// One scheduled husbandry task tied to a gestation day.
///
/// `expected_date` is fixed when the schedule is generated; only the
/// completion flag, completion date and notes change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagementEvent {
    kind: EventKind,
    expected_date: NaiveDate,
    completed: bool,
    completion_date: Option<NaiveDate>,
    notes: String,
}

impl ManagementEvent {
    fn pending(kind: EventKind, first_insemination: NaiveDate) -> Self {
        Self {
            kind,
            expected_date: gestation_day_date(first_insemination, kind.gestation_day_offset()),
            completed: false,
            completion_date: None,
            notes: String::new(),
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn label(&self) -> &'static str {
        self.kind.label()
    }

    pub fn gestation_day_offset(&self) -> u32 {
        self.kind.gestation_day_offset()
    }

    pub fn expected_date(&self) -> NaiveDate {
        self.expected_date
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn completion_date(&self) -> Option<NaiveDate> {
        self.completion_date
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub(crate) fn mark_completed(&mut self, on: NaiveDate) {
        self.completed = true;
        self.completion_date = Some(on);
    }

    pub(crate) fn reopen(&mut self) {
        self.completed = false;
        self.completion_date = None;
    }

    pub(crate) fn set_completion_date(&mut self, on: NaiveDate) {
        self.completion_date = Some(on);
    }

    pub(crate) fn set_notes(&mut self, notes: String) {
        self.notes = notes;
    }
}

/// The four management events of one pregnancy, one per [`EventKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ManagementEvent>", into = "Vec<ManagementEvent>")]
pub struct ManagementSchedule {
    events: [ManagementEvent; 4],
}

impl ManagementSchedule {
    /// Generate the schedule for a pregnancy anchored at `first_insemination`.
    ///
    /// All events start pending with empty notes.
    pub fn generate(first_insemination: NaiveDate) -> Self {
        Self {
            events: EventKind::ALL.map(|kind| ManagementEvent::pending(kind, first_insemination)),
        }
    }

    pub fn get(&self, kind: EventKind) -> &ManagementEvent {
        &self.events[kind.index()]
    }

    pub(crate) fn get_mut(&mut self, kind: EventKind) -> &mut ManagementEvent {
        &mut self.events[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManagementEvent> {
        self.events.iter()
    }

    pub fn completed_count(&self) -> usize {
        self.events.iter().filter(|e| e.completed).count()
    }
}

impl TryFrom<Vec<ManagementEvent>> for ManagementSchedule {
    type Error = String;

    fn try_from(mut events: Vec<ManagementEvent>) -> Result<Self, Self::Error> {
        events.sort_by_key(|e| e.kind);
        let kinds: Vec<EventKind> = events.iter().map(|e| e.kind).collect();
        if kinds != EventKind::ALL {
            return Err(format!(
                "management schedule must hold exactly one event per kind, found {kinds:?}"
            ));
        }
        let events: [ManagementEvent; 4] = events
            .try_into()
            .map_err(|_| "management schedule must hold four events".to_string())?;
        Ok(Self { events })
    }
}

impl From<ManagementSchedule> for Vec<ManagementEvent> {
    fn from(schedule: ManagementSchedule) -> Self {
        schedule.events.into()
    }
}

/// Every derived milestone for one first insemination date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestonePlan {
    pub expected_return_to_heat_date: NaiveDate,
    pub expected_farrowing_date: NaiveDate,
    pub management: ManagementSchedule,
}

impl MilestonePlan {
    pub fn for_insemination(first_insemination: NaiveDate) -> Self {
        Self {
            expected_return_to_heat_date: expected_return_to_heat_date(first_insemination),
            expected_farrowing_date: expected_farrowing_date(first_insemination),
            management: ManagementSchedule::generate(first_insemination),
        }
    }
}
