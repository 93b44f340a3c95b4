//! Infrastructure layer: record stores, the herd service, CSV interchange, config.

pub mod config;
pub mod herd;
pub mod interchange;
pub mod store;


pub use config::{Config, ConfigError};
pub use herd::{Herd, HerdError};
pub use interchange::{ImportReport, InterchangeError, RowError};
pub use store::{InMemoryRecordStore, JsonFileStore, RecordStore, StoreError};
