//! Per-animal history and the option lists used to build report filters.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use farrowline_breeding::{BreedingCycle, CycleStatus, FarrowingOutcome, classify};
use farrowline_core::CycleId;

use crate::performance::Tally;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub cycle_id: CycleId,
    pub batch_label: String,
    pub first_insemination_date: NaiveDate,
    pub expected_farrowing_date: NaiveDate,
    pub status: CycleStatus,
    pub outcome: Option<FarrowingOutcome>,
}

/// Every cycle of one animal, newest insemination first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimalHistory {
    pub animal_number: u32,
    /// Insemination year the history was restricted to, if any.
    pub year: Option<i32>,
    pub summary: Tally,
    pub entries: Vec<HistoryEntry>,
}

impl AnimalHistory {
    pub fn build<'a, I>(cycles: I, animal_number: u32, year: Option<i32>, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = &'a BreedingCycle>,
    {
        let mut selected: Vec<&BreedingCycle> = cycles
            .into_iter()
            .filter(|c| c.animal_number() == animal_number)
            .filter(|c| year.is_none_or(|y| c.first_insemination_date().year() == y))
            .collect();
        selected.sort_by(|a, b| b.first_insemination_date().cmp(&a.first_insemination_date()));

        let mut summary = Tally::default();
        let entries = selected
            .into_iter()
            .map(|cycle| {
                summary.add(cycle);
                HistoryEntry {
                    cycle_id: cycle.id_typed(),
                    batch_label: cycle.batch_label().to_string(),
                    first_insemination_date: cycle.first_insemination_date(),
                    expected_farrowing_date: cycle.expected_farrowing_date(),
                    status: classify(cycle, today),
                    outcome: cycle.farrowing_outcome().cloned(),
                }
            })
            .collect();

        Self {
            animal_number,
            year,
            summary,
            entries,
        }
    }
}

/// Distinct first-insemination years, newest first.
pub fn distinct_years<'a, I>(cycles: I) -> Vec<i32>
where
    I: IntoIterator<Item = &'a BreedingCycle>,
{
    let years: BTreeSet<i32> = cycles
        .into_iter()
        .map(|c| c.first_insemination_date().year())
        .collect();
    years.into_iter().rev().collect()
}

/// Distinct animal numbers, ascending.
pub fn distinct_animals<'a, I>(cycles: I) -> Vec<u32>
where
    I: IntoIterator<Item = &'a BreedingCycle>,
{
    let animals: BTreeSet<u32> = cycles.into_iter().map(|c| c.animal_number()).collect();
    animals.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{date, farrowed, registered};
    use farrowline_breeding::Pregnancy;

    fn herd() -> Vec<BreedingCycle> {
        vec![
            farrowed(7, date(2023, 2, 1), date(2023, 5, 26), 9, 1, 0),
            registered(3, date(2024, 9, 1), Pregnancy::Confirmed),
            farrowed(7, date(2024, 1, 1), date(2024, 4, 24), 12, 0, 1),
            registered(7, date(2024, 8, 1), Pregnancy::NotConfirmed),
        ]
    }

    #[test]
    fn history_is_newest_first_with_summary() {
        let history = AnimalHistory::build(&herd(), 7, None, date(2024, 9, 1));
        let firsts: Vec<NaiveDate> = history
            .entries
            .iter()
            .map(|e| e.first_insemination_date)
            .collect();
        assert_eq!(firsts, vec![date(2024, 8, 1), date(2024, 1, 1), date(2023, 2, 1)]);
        assert_eq!(history.entries[0].status, CycleStatus::NotPregnant);
        assert_eq!(history.entries[1].status, CycleStatus::Empty);

        assert_eq!(history.summary.cycles, 3);
        assert_eq!(history.summary.births, 2);
        assert_eq!(history.summary.born_alive, 21);
        assert_eq!(history.summary.losses(), 2);
        assert_eq!(history.summary.average_born_alive(), 10.5);
    }

    #[test]
    fn history_can_be_restricted_to_a_year() {
        let history = AnimalHistory::build(&herd(), 7, Some(2023), date(2024, 9, 1));
        assert_eq!(history.entries.len(), 1);
        assert_eq!(history.summary.farrowing_rate(), 100.0);
    }

    #[test]
    fn unknown_animal_yields_empty_history() {
        let history = AnimalHistory::build(&herd(), 99, None, date(2024, 9, 1));
        assert!(history.entries.is_empty());
        assert_eq!(history.summary.average_born_alive(), 0.0);
    }

    #[test]
    fn option_lists() {
        let cycles = herd();
        assert_eq!(distinct_years(&cycles), vec![2024, 2023]);
        assert_eq!(distinct_animals(&cycles), vec![3, 7]);
    }
}
