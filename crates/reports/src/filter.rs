use chrono::Datelike;
use serde::{Deserialize, Serialize};

use farrowline_breeding::BreedingCycle;

/// Report filter. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFilter {
    pub year: Option<i32>,
    /// Month of farrowing (1-12). Cycles without an outcome never match.
    pub month: Option<u32>,
    pub animal_number: Option<u32>,
}

impl ReportFilter {
    pub fn for_year(year: i32) -> Self {
        Self {
            year: Some(year),
            ..Self::default()
        }
    }

    pub fn matches(&self, cycle: &BreedingCycle) -> bool {
        if let Some(animal) = self.animal_number {
            if cycle.animal_number() != animal {
                return false;
            }
        }
        if let Some(year) = self.year {
            if reference_year(cycle) != year {
                return false;
            }
        }
        if let Some(month) = self.month {
            match cycle.farrowing_outcome() {
                Some(outcome) if outcome.actual_date.month() == month => {}
                _ => return false,
            }
        }
        true
    }
}

/// Year a cycle is reported under: the farrowing year once farrowed,
/// otherwise the first insemination year.
pub fn reference_year(cycle: &BreedingCycle) -> i32 {
    cycle
        .farrowing_outcome()
        .map(|outcome| outcome.actual_date.year())
        .unwrap_or_else(|| cycle.first_insemination_date().year())
}
