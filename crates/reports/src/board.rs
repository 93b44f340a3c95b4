//! Gestation board and farrowing queue: the confirmed, not-yet-farrowed cycles.

use chrono::NaiveDate;
use serde::Serialize;

use farrowline_breeding::{BreedingCycle, CycleView, GestationProgress, Urgency, gestation_progress};
use farrowline_core::CycleId;

/// Days-until-farrowing (inclusive) at which a queued cycle is flagged imminent.
pub const IMMINENT_DAYS: i64 = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GestationEntry {
    pub cycle_id: CycleId,
    pub animal_number: u32,
    pub batch_label: String,
    pub first_insemination_date: NaiveDate,
    pub progress: GestationProgress,
    pub view: CycleView,
}

/// Gestating cycles, earliest insemination first.
pub fn gestation_board<'a, I>(cycles: I, today: NaiveDate) -> Vec<GestationEntry>
where
    I: IntoIterator<Item = &'a BreedingCycle>,
{
    let mut entries: Vec<GestationEntry> = cycles
        .into_iter()
        .filter_map(|cycle| {
            let progress = gestation_progress(cycle, today)?;
            Some(GestationEntry {
                cycle_id: cycle.id_typed(),
                animal_number: cycle.animal_number(),
                batch_label: cycle.batch_label().to_string(),
                first_insemination_date: cycle.first_insemination_date(),
                progress,
                view: CycleView::at(cycle, today),
            })
        })
        .collect();
    entries.sort_by(|a, b| {
        a.first_insemination_date
            .cmp(&b.first_insemination_date)
            .then(a.animal_number.cmp(&b.animal_number))
    });
    entries
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueFlag {
    /// Due today or overdue.
    Late,
    Imminent,
    Scheduled,
}

impl QueueFlag {
    pub fn from_days_until_farrowing(days: i64) -> Self {
        if days <= 0 {
            QueueFlag::Late
        } else if days <= IMMINENT_DAYS {
            QueueFlag::Imminent
        } else {
            QueueFlag::Scheduled
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QueueFlag::Late => "LATE",
            QueueFlag::Imminent => "IMMINENT",
            QueueFlag::Scheduled => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueEntry {
    pub cycle_id: CycleId,
    pub animal_number: u32,
    pub batch_label: String,
    pub expected_farrowing_date: NaiveDate,
    pub days_until_farrowing: i64,
    pub urgency: Urgency,
    pub flag: QueueFlag,
}

/// Gestating cycles, soonest expected farrowing first.
pub fn farrowing_queue<'a, I>(cycles: I, today: NaiveDate) -> Vec<QueueEntry>
where
    I: IntoIterator<Item = &'a BreedingCycle>,
{
    let mut queue: Vec<QueueEntry> = cycles
        .into_iter()
        .filter_map(|cycle| {
            let progress = gestation_progress(cycle, today)?;
            Some(QueueEntry {
                cycle_id: cycle.id_typed(),
                animal_number: cycle.animal_number(),
                batch_label: cycle.batch_label().to_string(),
                expected_farrowing_date: progress.expected_farrowing_date,
                days_until_farrowing: progress.days_until_farrowing,
                urgency: progress.urgency,
                flag: QueueFlag::from_days_until_farrowing(progress.days_until_farrowing),
            })
        })
        .collect();
    queue.sort_by(|a, b| {
        a.days_until_farrowing
            .cmp(&b.days_until_farrowing)
            .then(a.animal_number.cmp(&b.animal_number))
    });
    queue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{date, farrowed, registered};
    use farrowline_breeding::Pregnancy;

    fn herd() -> Vec<BreedingCycle> {
        vec![
            registered(1, date(2024, 1, 10), Pregnancy::Confirmed),
            registered(2, date(2024, 1, 1), Pregnancy::Confirmed),
            registered(3, date(2024, 2, 1), Pregnancy::NotConfirmed),
            farrowed(4, date(2023, 12, 1), date(2024, 3, 24), 10, 0, 0),
            registered(5, date(2024, 1, 3), Pregnancy::Confirmed),
        ]
    }

    #[test]
    fn board_holds_only_gestating_cycles_by_insemination_date() {
        let board = gestation_board(&herd(), date(2024, 4, 20));
        let order: Vec<u32> = board.iter().map(|e| e.animal_number).collect();
        assert_eq!(order, vec![2, 5, 1]);

        let first = &board[0];
        assert_eq!(first.progress.gestation_day, 111);
        assert_eq!(first.progress.days_until_farrowing, 4);
        assert_eq!(first.progress.urgency, Urgency::High);
        assert_eq!(first.view.events.len(), 4);
    }

    #[test]
    fn queue_flags_late_and_imminent() {
        let queue = farrowing_queue(&herd(), date(2024, 4, 24));
        let rows: Vec<(u32, i64, QueueFlag)> = queue
            .iter()
            .map(|e| (e.animal_number, e.days_until_farrowing, e.flag))
            .collect();
        assert_eq!(
            rows,
            vec![
                (2, 0, QueueFlag::Late),
                (5, 2, QueueFlag::Imminent),
                (1, 9, QueueFlag::Scheduled),
            ]
        );
    }

    #[test]
    fn flag_boundaries() {
        assert_eq!(QueueFlag::from_days_until_farrowing(-5), QueueFlag::Late);
        assert_eq!(QueueFlag::from_days_until_farrowing(0), QueueFlag::Late);
        assert_eq!(QueueFlag::from_days_until_farrowing(1), QueueFlag::Imminent);
        assert_eq!(QueueFlag::from_days_until_farrowing(3), QueueFlag::Imminent);
        assert_eq!(QueueFlag::from_days_until_farrowing(4), QueueFlag::Scheduled);
    }
}
