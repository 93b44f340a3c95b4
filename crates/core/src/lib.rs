//! `farrowline-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the error model, aggregate/entity traits and calendar-date
//! arithmetic with an injectable clock.

pub mod aggregate;
pub mod calendar;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot};
pub use calendar::{Clock, FixedClock, SystemClock, add_days, days_between};
pub use entity::{Entity, find_by_id, position_of};
pub use error::{DomainError, DomainResult};
pub use id::{CycleId, MatrixId};
pub use value_object::ValueObject;
