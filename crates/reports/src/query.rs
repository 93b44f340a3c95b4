use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use farrowline_breeding::{BreedingCycle, CycleStatus, classify};

/// Record list filters. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleQuery {
    /// Substring of the animal number.
    pub animal: Option<String>,
    /// Case-insensitive substring of the sire identifier.
    pub sire: Option<String>,
    pub status: Option<CycleStatus>,
    /// Month (1-12) of the first insemination.
    pub first_insemination_month: Option<u32>,
    /// Month (1-12) of the last insemination; cycles without one never match.
    pub last_insemination_month: Option<u32>,
}

impl CycleQuery {
    pub fn matches(&self, cycle: &BreedingCycle, today: NaiveDate) -> bool {
        if let Some(needle) = non_blank(&self.animal) {
            if !cycle.animal_number().to_string().contains(needle) {
                return false;
            }
        }
        if let Some(needle) = non_blank(&self.sire) {
            let needle = needle.to_lowercase();
            match cycle.sire_id() {
                Some(sire) if sire.to_lowercase().contains(&needle) => {}
                _ => return false,
            }
        }
        if let Some(status) = self.status {
            if classify(cycle, today) != status {
                return false;
            }
        }
        if let Some(month) = self.first_insemination_month {
            if cycle.first_insemination_date().month() != month {
                return false;
            }
        }
        if let Some(month) = self.last_insemination_month {
            match cycle.last_insemination_date() {
                Some(last) if last.month() == month => {}
                _ => return false,
            }
        }
        true
    }

    /// Matching cycles, input order preserved.
    pub fn apply<'a, I>(&self, cycles: I, today: NaiveDate) -> Vec<&'a BreedingCycle>
    where
        I: IntoIterator<Item = &'a BreedingCycle>,
    {
        cycles
            .into_iter()
            .filter(|c| self.matches(c, today))
            .collect()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
