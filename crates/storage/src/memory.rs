//! In-memory ordered backend
//!
//! Reference [`Backend`] implementation over a `BTreeMap` guarded by a
//! `parking_lot::RwLock`. The write lock scope is the batch atomicity
//! boundary; scans copy matching records out under the read lock, so readers
//! never observe a half-applied batch. No background threads.

use crate::backend::{Backend, Batch};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use strand_core::error::{Result, StoreError};
use strand_core::record::{JsonRecord, LeafValue};
use tracing::debug;

/// In-memory ordered record store.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: RwLock<BTreeMap<String, LeafValue>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        MemoryBackend::default()
    }

    /// Total number of records, for tests and diagnostics.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// True if the backend holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl Backend for MemoryBackend {
    fn get(&self, path: &str) -> Result<Option<JsonRecord>> {
        let records = self.records.read();
        Ok(records
            .get(path)
            .map(|value| JsonRecord::new(path, value.clone())))
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<JsonRecord>> {
        let records = self.records.read();
        Ok(records
            .range(prefix.to_string()..)
            .take_while(|(path, _)| path.starts_with(prefix))
            .map(|(path, value)| JsonRecord::new(path.clone(), value.clone()))
            .collect())
    }

    fn count_prefix(&self, prefix: &str) -> Result<usize> {
        let records = self.records.read();
        Ok(records
            .range(prefix.to_string()..)
            .take_while(|(path, _)| path.starts_with(prefix))
            .count())
    }

    fn apply(&self, batch: Batch) -> Result<usize> {
        let mut records = self.records.write();

        // Guards are checked before any mutation so a conflict leaves the
        // store untouched.
        for guard in &batch.expect_absent {
            let occupied = records
                .range(guard.clone()..)
                .take_while(|(path, _)| path.starts_with(guard.as_str()))
                .next()
                .is_some();
            if occupied {
                debug!(prefix = %guard, "batch guard violated");
                return Err(StoreError::Conflict(guard.clone()));
            }
        }

        let mut removed = 0usize;
        for prefix in &batch.delete_prefixes {
            let doomed: Vec<String> = records
                .range(prefix.clone()..)
                .take_while(|(path, _)| path.starts_with(prefix.as_str()))
                .map(|(path, _)| path.clone())
                .collect();
            for path in doomed {
                records.remove(&path);
                removed += 1;
            }
        }

        for path in &batch.delete_paths {
            if records.remove(path).is_some() {
                removed += 1;
            }
        }

        for record in batch.inserts {
            records.insert(record.path, record.value);
        }

        Ok(removed)
    }
}
