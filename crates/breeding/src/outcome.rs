use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use farrowline_core::{DomainError, DomainResult, ValueObject};

/// Largest accepted value for any single litter count.
pub const MAX_PIGLETS_PER_COUNT: u32 = 99;

/// Farrowing (birth) outcome of a cycle.
///
/// The litter total is never stored: [`FarrowingOutcome::total_piglets`] always
/// sums the three counts, so it cannot drift from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarrowingOutcome {
    pub actual_date: NaiveDate,
    pub born_alive: u32,
    pub stillborn: u32,
    pub mummified: u32,
    /// Average piglet weight in kg, when weighed.
    pub average_weight: Option<f64>,
}

impl ValueObject for FarrowingOutcome {}

impl FarrowingOutcome {
    pub fn new(actual_date: NaiveDate, born_alive: u32, stillborn: u32, mummified: u32) -> Self {
        Self {
            actual_date,
            born_alive,
            stillborn,
            mummified,
            average_weight: None,
        }
    }

    pub fn with_average_weight(mut self, kg: f64) -> Self {
        self.average_weight = Some(kg);
        self
    }

    pub fn total_piglets(&self) -> u32 {
        self.born_alive.saturating_add(self.losses())
    }

    /// Stillborn plus mummified.
    pub fn losses(&self) -> u32 {
        self.stillborn.saturating_add(self.mummified)
    }

    pub(crate) fn validate(&self) -> DomainResult<()> {
        for (label, count) in [
            ("born alive", self.born_alive),
            ("stillborn", self.stillborn),
            ("mummified", self.mummified),
        ] {
            if count > MAX_PIGLETS_PER_COUNT {
                return Err(DomainError::validation(format!(
                    "{label} count {count} exceeds {MAX_PIGLETS_PER_COUNT}"
                )));
            }
        }
        if let Some(weight) = self.average_weight {
            if !weight.is_finite() || weight < 0.0 {
                return Err(DomainError::validation(
                    "average weight must be a non-negative number",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_tracks_the_three_counts() {
        let mut outcome =
            FarrowingOutcome::new(NaiveDate::from_ymd_opt(2024, 4, 24).unwrap(), 12, 1, 2);
        assert_eq!(outcome.total_piglets(), 15);
        assert_eq!(outcome.losses(), 3);

        outcome.born_alive = 10;
        assert_eq!(outcome.total_piglets(), 13);
    }

    #[test]
    fn implausible_counts_are_rejected() {
        let date = NaiveDate::from_ymd_opt(2024, 4, 24).unwrap();
        assert!(FarrowingOutcome::new(date, 99, 99, 99).validate().is_ok());
        assert!(FarrowingOutcome::new(date, u32::MAX, 1, 0).validate().is_err());
        assert!(FarrowingOutcome::new(date, 10, 100, 0).validate().is_err());
        assert!(FarrowingOutcome::new(date, 10, 0, 3_000_000_000).validate().is_err());
    }

    #[test]
    fn sums_saturate_on_unvalidated_counts() {
        let date = NaiveDate::from_ymd_opt(2024, 4, 24).unwrap();
        let outcome = FarrowingOutcome::new(date, u32::MAX, 1, u32::MAX);
        assert_eq!(outcome.losses(), u32::MAX);
        assert_eq!(outcome.total_piglets(), u32::MAX);
    }

    #[test]
    fn negative_or_nan_weight_is_rejected() {
        let date = NaiveDate::from_ymd_opt(2024, 4, 24).unwrap();
        assert!(FarrowingOutcome::new(date, 10, 0, 0).with_average_weight(-1.0).validate().is_err());
        assert!(FarrowingOutcome::new(date, 10, 0, 0).with_average_weight(f64::NAN).validate().is_err());
        assert!(FarrowingOutcome::new(date, 10, 0, 0).with_average_weight(1.4).validate().is_ok());
        assert!(FarrowingOutcome::new(date, 10, 0, 0).validate().is_ok());
    }
}
