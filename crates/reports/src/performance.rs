//! Herd report: per-animal reproductive performance, ranking and monthly totals.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use farrowline_breeding::BreedingCycle;

use crate::filter::ReportFilter;

/// Counters accumulated over a set of cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub cycles: u64,
    /// Cycles with a recorded farrowing.
    pub births: u64,
    pub born_alive: u64,
    pub stillborn: u64,
    pub mummified: u64,
}

impl Tally {
    pub fn add(&mut self, cycle: &BreedingCycle) {
        self.cycles += 1;
        if let Some(outcome) = cycle.farrowing_outcome() {
            self.births += 1;
            self.born_alive += u64::from(outcome.born_alive);
            self.stillborn += u64::from(outcome.stillborn);
            self.mummified += u64::from(outcome.mummified);
        }
    }

    /// Stillborn plus mummified.
    pub fn losses(&self) -> u64 {
        self.stillborn + self.mummified
    }

    pub fn total_piglets(&self) -> u64 {
        self.born_alive + self.losses()
    }

    /// Born alive per birth; 0 when nothing farrowed.
    pub fn average_born_alive(&self) -> f64 {
        ratio(self.born_alive, self.births)
    }

    /// Births per cycle, in percent; 0 when there are no cycles.
    pub fn farrowing_rate(&self) -> f64 {
        ratio(self.births, self.cycles) * 100.0
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Productivity tier by average born alive per birth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductivityTier {
    Excellent,
    Good,
    Fair,
    BelowExpectation,
}

impl ProductivityTier {
    pub fn from_average(average_born_alive: f64) -> Self {
        if average_born_alive >= 12.0 {
            ProductivityTier::Excellent
        } else if average_born_alive >= 10.0 {
            ProductivityTier::Good
        } else if average_born_alive >= 8.0 {
            ProductivityTier::Fair
        } else {
            ProductivityTier::BelowExpectation
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProductivityTier::Excellent => "EXCELLENT",
            ProductivityTier::Good => "GOOD",
            ProductivityTier::Fair => "FAIR",
            ProductivityTier::BelowExpectation => "BELOW_EXPECTATION",
        }
    }
}

impl core::fmt::Display for ProductivityTier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnimalPerformance {
    pub animal_number: u32,
    #[serde(flatten)]
    pub tally: Tally,
}

impl AnimalPerformance {
    pub fn tier(&self) -> ProductivityTier {
        ProductivityTier::from_average(self.tally.average_born_alive())
    }
}

/// Sort by total born alive descending, then animal number ascending.
pub fn rank(animals: &mut [AnimalPerformance]) {
    animals.sort_by(|a, b| {
        b.tally
            .born_alive
            .cmp(&a.tally.born_alive)
            .then(a.animal_number.cmp(&b.animal_number))
    });
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HerdReport {
    pub filter: ReportFilter,
    pub totals: Tally,
    /// Ranked (see [`rank`]).
    pub animals: Vec<AnimalPerformance>,
    /// Born alive per farrowing month, January first.
    pub monthly_born_alive: [u64; 12],
}

impl HerdReport {
    pub fn build<'a, I>(cycles: I, filter: ReportFilter) -> Self
    where
        I: IntoIterator<Item = &'a BreedingCycle>,
    {
        let mut totals = Tally::default();
        let mut per_animal: BTreeMap<u32, Tally> = BTreeMap::new();
        let mut monthly_born_alive = [0u64; 12];

        for cycle in cycles.into_iter().filter(|c| filter.matches(c)) {
            totals.add(cycle);
            per_animal.entry(cycle.animal_number()).or_default().add(cycle);
            if let Some(outcome) = cycle.farrowing_outcome() {
                monthly_born_alive[outcome.actual_date.month0() as usize] += u64::from(outcome.born_alive);
            }
        }

        let mut animals: Vec<AnimalPerformance> = per_animal
            .into_iter()
            .map(|(animal_number, tally)| AnimalPerformance {
                animal_number,
                tally,
            })
            .collect();
        rank(&mut animals);

        Self {
            filter,
            totals,
            animals,
            monthly_born_alive,
        }
    }

    pub fn animal(&self, animal_number: u32) -> Option<&AnimalPerformance> {
        self.animals
            .iter()
            .find(|a| a.animal_number == animal_number)
    }

    /// The `n` animals with the most piglets (all outcomes), ties by animal number.
    pub fn top_by_total_piglets(&self, n: usize) -> Vec<AnimalPerformance> {
        let mut animals = self.animals.clone();
        animals.sort_by(|a, b| {
            b.tally
                .total_piglets()
                .cmp(&a.tally.total_piglets())
                .then(a.animal_number.cmp(&b.animal_number))
        });
        animals.truncate(n);
        animals
    }
}
