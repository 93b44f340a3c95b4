//! Record persistence: the whole collection is loaded and saved at once.

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::InMemoryRecordStore;

use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The backing medium refused the write (quota, read-only, simulated failure).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Load/save of a full record collection.
pub trait RecordStore<T>: Send + Sync {
    /// An absent collection loads as empty.
    fn load(&self) -> Result<Vec<T>, StoreError>;
    /// Replace the stored collection.
    fn save(&self, records: &[T]) -> Result<(), StoreError>;
}

impl<T, S> RecordStore<T> for Arc<S>
where
    S: RecordStore<T> + ?Sized,
{
    fn load(&self) -> Result<Vec<T>, StoreError> {
        (**self).load()
    }

    fn save(&self, records: &[T]) -> Result<(), StoreError> {
        (**self).save(records)
    }
}
