//! Reporting reducers over breeding cycles.
//!
//! Every function here is a pure fold over a borrowed cycle collection plus an
//! explicit `today` where status matters. Nothing is cached: reports are cheap
//! to rebuild and always reflect the current records.

pub mod board;
pub mod filter;
pub mod history;
pub mod performance;
pub mod query;

#[cfg(test)]
mod fixtures;

pub use board::{GestationEntry, QueueEntry, QueueFlag, farrowing_queue, gestation_board};
pub use filter::{ReportFilter, reference_year};
pub use history::{AnimalHistory, HistoryEntry, distinct_animals, distinct_years};
pub use performance::{AnimalPerformance, HerdReport, ProductivityTier, Tally, rank};
pub use query::CycleQuery;
