//! Matrix registry: the breeding sows themselves.
//!
//! Registry data only enriches what is displayed next to a cycle (name, breed,
//! genealogy). No timeline computation reads it.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use farrowline_core::{DomainError, DomainResult, Entity, MatrixId};

/// Herd membership of a matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixStatus {
    Active,
    Inactive,
    Culled,
}

impl core::str::FromStr for MatrixStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(MatrixStatus::Active),
            "inactive" => Ok(MatrixStatus::Inactive),
            "culled" => Ok(MatrixStatus::Culled),
            other => Err(DomainError::validation(format!(
                "unknown matrix status '{other}' (expected active, inactive or culled)"
            ))),
        }
    }
}

/// Editable registry fields, as entered on the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixProfile {
    pub number: u32,
    pub name: String,
    pub breed: String,
    pub weight_kg: Option<f64>,
    /// Sire (genealogy, free text).
    pub sire: String,
    /// Dam (genealogy, free text).
    pub dam: String,
    pub birth_date: Option<NaiveDate>,
    pub entry_date: Option<NaiveDate>,
    pub status: MatrixStatus,
    pub notes: String,
}

impl MatrixProfile {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            name: String::new(),
            breed: String::new(),
            weight_kg: None,
            sire: String::new(),
            dam: String::new(),
            birth_date: None,
            entry_date: None,
            status: MatrixStatus::Active,
            notes: String::new(),
        }
    }

    fn validate(&self) -> DomainResult<()> {
        if self.number == 0 {
            return Err(DomainError::validation("matrix number is required"));
        }
        if let Some(weight) = self.weight_kg {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(DomainError::validation("weight must be a positive number"));
            }
        }
        if let (Some(born), Some(entered)) = (self.birth_date, self.entry_date) {
            if entered < born {
                return Err(DomainError::validation("entry date cannot precede birth date"));
            }
        }
        Ok(())
    }
}

/// A registered breeding sow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    id: MatrixId,
    profile: MatrixProfile,
}

impl Matrix {
    pub fn register(id: MatrixId, profile: MatrixProfile) -> DomainResult<Self> {
        profile.validate()?;
        Ok(Self { id, profile })
    }

    /// Replace the profile; identity is kept.
    pub fn update(&mut self, profile: MatrixProfile) -> DomainResult<()> {
        profile.validate()?;
        self.profile = profile;
        Ok(())
    }

    pub fn profile(&self) -> &MatrixProfile {
        &self.profile
    }

    pub fn number(&self) -> u32 {
        self.profile.number
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }

    pub fn status(&self) -> MatrixStatus {
        self.profile.status
    }

    pub fn age_on(&self, today: NaiveDate) -> Option<AnimalAge> {
        self.profile
            .birth_date
            .and_then(|born| AnimalAge::between(born, today))
    }
}

impl Entity for Matrix {
    type Id = MatrixId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Age in whole years and months.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimalAge {
    pub years: u32,
    pub months: u32,
}

impl AnimalAge {
    /// `None` when `today` precedes the birth date.
    pub fn between(born: NaiveDate, today: NaiveDate) -> Option<Self> {
        let mut months = (today.year() - born.year()) * 12 + today.month() as i32
            - born.month() as i32;
        if today.day() < born.day() {
            months -= 1;
        }
        let months = u32::try_from(months).ok()?;
        Some(Self {
            years: months / 12,
            months: months % 12,
        })
    }
}

impl core::fmt::Display for AnimalAge {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match (self.years, self.months) {
            (0, m) => write!(f, "{m}m"),
            (y, 0) => write!(f, "{y}y"),
            (y, m) => write!(f, "{y}y {m}m"),
        }
    }
}
