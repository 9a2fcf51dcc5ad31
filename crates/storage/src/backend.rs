//! Ordered key-value backend contract
//!
//! The store core needs exactly three things from its environment: point
//! lookup by path, sorted prefix scans with snapshot consistency, and atomic
//! application of a write batch. Anything providing those (an embedded
//! ordered map, an SQL table with a `C`-collated primary key, a remote range
//! store) can back the document store.

use strand_core::error::Result;
use strand_core::record::JsonRecord;

/// A unit of atomic write work: deletions first, then insertions.
///
/// `expect_absent` lists prefixes that must hold no records when the batch
/// is applied; a violated guard fails the whole batch with
/// [`StoreError::Conflict`](strand_core::StoreError::Conflict) and nothing
/// is applied. Used for compare-and-retry index allocation.
#[derive(Debug, Default, Clone)]
pub struct Batch {
    /// Prefixes whose every record is deleted
    pub delete_prefixes: Vec<String>,
    /// Exact record paths to delete
    pub delete_paths: Vec<String>,
    /// Records to insert after the deletions
    pub inserts: Vec<JsonRecord>,
    /// Prefixes that must be empty for the batch to apply
    pub expect_absent: Vec<String>,
}

impl Batch {
    /// An empty batch.
    pub fn new() -> Self {
        Batch::default()
    }

    /// Delete every record under `prefix` (including the prefix itself).
    pub fn delete_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.delete_prefixes.push(prefix.into());
        self
    }

    /// Delete the record at exactly `path`.
    pub fn delete_path(mut self, path: impl Into<String>) -> Self {
        self.delete_paths.push(path.into());
        self
    }

    /// Insert a record.
    pub fn insert(mut self, record: JsonRecord) -> Self {
        self.inserts.push(record);
        self
    }

    /// Insert many records.
    pub fn insert_all(mut self, records: impl IntoIterator<Item = JsonRecord>) -> Self {
        self.inserts.extend(records);
        self
    }

    /// Require `prefix` to hold no records when the batch applies.
    pub fn expect_absent(mut self, prefix: impl Into<String>) -> Self {
        self.expect_absent.push(prefix.into());
        self
    }

    /// True if the batch performs no work and carries no guards.
    pub fn is_empty(&self) -> bool {
        self.delete_prefixes.is_empty()
            && self.delete_paths.is_empty()
            && self.inserts.is_empty()
            && self.expect_absent.is_empty()
    }
}

/// Ordered record storage.
///
/// Implementations must keep records sorted by path under byte-wise
/// comparison, return snapshot-consistent scans (no torn reads), and apply
/// batches atomically (all or nothing). All methods must be safe to call
/// concurrently.
pub trait Backend: Send + Sync {
    /// Point lookup of the record at exactly `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend operation fails.
    fn get(&self, path: &str) -> Result<Option<JsonRecord>>;

    /// All records whose path starts with `prefix`, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend operation fails.
    fn scan_prefix(&self, prefix: &str) -> Result<Vec<JsonRecord>>;

    /// Number of records whose path starts with `prefix`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend operation fails.
    fn count_prefix(&self, prefix: &str) -> Result<usize> {
        Ok(self.scan_prefix(prefix)?.len())
    }

    /// Apply a batch atomically.
    ///
    /// Returns the number of records removed by the batch's deletions.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`](strand_core::StoreError::Conflict)
    /// if an `expect_absent` guard is violated (nothing is applied), or a
    /// storage error if the backend operation fails.
    fn apply(&self, batch: Batch) -> Result<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_core::record::LeafValue;

    #[test]
    fn test_batch_builder() {
        let batch = Batch::new()
            .delete_prefix("/a/")
            .delete_path("/b/")
            .insert(JsonRecord::new("/a/x/", LeafValue::Null))
            .expect_absent("/c/");
        assert_eq!(batch.delete_prefixes, vec!["/a/"]);
        assert_eq!(batch.delete_paths, vec!["/b/"]);
        assert_eq!(batch.inserts.len(), 1);
        assert_eq!(batch.expect_absent, vec!["/c/"]);
        assert!(!batch.is_empty());
    }

    #[test]
    fn test_empty_batch() {
        assert!(Batch::new().is_empty());
    }

    #[test]
    fn backend_is_object_safe_and_send_sync() {
        fn accepts_backend(_: &dyn Backend) {}
        fn assert_send<T: Send + ?Sized>() {}
        fn assert_sync<T: Sync + ?Sized>() {}
        let _ = accepts_backend as fn(&dyn Backend);
        assert_send::<Box<dyn Backend>>();
        assert_sync::<Box<dyn Backend>>();
    }
}
