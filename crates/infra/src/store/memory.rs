use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{RecordStore, StoreError};

/// In-memory store for tests/dev.
///
/// `fail_writes(true)` makes every subsequent `save` fail without touching the
/// stored records.
#[derive(Debug)]
pub struct InMemoryRecordStore<T> {
    inner: RwLock<Vec<T>>,
    failing: AtomicBool,
}

impl<T> InMemoryRecordStore<T> {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub fn with_records(records: Vec<T>) -> Self {
        Self {
            inner: RwLock::new(records),
            failing: AtomicBool::new(false),
        }
    }

    pub fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl<T> Default for InMemoryRecordStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RecordStore<T> for InMemoryRecordStore<T>
where
    T: Clone + Send + Sync,
{
    fn load(&self) -> Result<Vec<T>, StoreError> {
        let records = self
            .inner
            .read()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        Ok(records.clone())
    }

    fn save(&self, records: &[T]) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("simulated write failure".to_string()));
        }
        let mut stored = self
            .inner
            .write()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        *stored = records.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load() {
        let store = InMemoryRecordStore::new();
        assert!(store.load().unwrap().is_empty());
        store.save(&[1u32, 2, 3]).unwrap();
        assert_eq!(store.load().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn failing_writes_keep_previous_records() {
        let store = InMemoryRecordStore::with_records(vec![7u32]);
        store.fail_writes(true);
        let err = store.save(&[8]).unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert_eq!(store.load().unwrap(), vec![7]);

        store.fail_writes(false);
        store.save(&[8]).unwrap();
        assert_eq!(store.load().unwrap(), vec![8]);
    }
}
