//! JsonDb: the document store facade
//!
//! ## Design: STATELESS FACADE
//!
//! `JsonDb` holds only an `Arc<dyn Backend>` plus the configured limits. No
//! caches, no locks of its own. Every operation is one scoped acquisition of
//! backend read or write access; atomicity comes entirely from the backend's
//! batch apply, and snapshot-consistent scans keep reads untorn.
//!
//! Writes resolve to delete-then-insert batches over the flattened record
//! space; reads resolve to a prefix scan followed by reconstruction.

use crate::query;
use serde_json::Value;
use std::sync::Arc;
use strand_core::codec;
use strand_core::error::{Result, StoreError};
use strand_core::filter::Filter;
use strand_core::flatten::{flatten_with_limits, reconstruct};
use strand_core::limits::Limits;
use strand_core::options::GetOptions;
use strand_core::path::{first_segment, is_index_segment, validate_key_with_limits, DbPath};
use strand_core::record::{JsonRecord, LeafValue};
use strand_storage::{Backend, Batch, MemoryBackend};
use tracing::debug;

/// Retry budget for `push` index allocation under contention.
const MAX_PUSH_RETRIES: usize = 16;

/// Embedded JSON document store over an ordered key-value backend.
#[derive(Clone)]
pub struct JsonDb {
    backend: Arc<dyn Backend>,
    limits: Limits,
}

impl JsonDb {
    /// Create a store over the given backend with default limits.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        JsonDb {
            backend,
            limits: Limits::default(),
        }
    }

    /// Create a store over a fresh in-memory backend.
    pub fn in_memory() -> Self {
        JsonDb::new(Arc::new(MemoryBackend::new()))
    }

    /// Create a store with custom limits.
    pub fn with_limits(backend: Arc<dyn Backend>, limits: Limits) -> Self {
        JsonDb { backend, limits }
    }

    /// Read the JSON value at `path`.
    ///
    /// Returns `Ok(None)` when nothing exists at or under `path`. `options`
    /// control depth-limited reconstruction, filtering, and child limits;
    /// presentation options are ignored here.
    pub fn get(&self, path: &str, options: &GetOptions) -> Result<Option<Value>> {
        let base = DbPath::parse_with_limits(path, &self.limits)?;
        let mut records = self.backend.scan_prefix(base.as_str())?;

        if let Some(filter) = &options.filter {
            records = self.filter_children(&base, records, filter)?;
        }
        if let Some(limit) = options.limit_to_first {
            records = limit_children(&base, records, limit);
        }

        reconstruct(&base, &records, options.depth)
    }

    /// Read and serialize the JSON value at `path`.
    ///
    /// Honors `pretty_print` and wraps the output in `callback(...)` when a
    /// callback is configured.
    pub fn get_as_string(&self, path: &str, options: &GetOptions) -> Result<Option<String>> {
        let value = match self.get(path, options)? {
            Some(value) => value,
            None => return Ok(None),
        };
        let mut text = if options.pretty_print {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        if let Some(callback) = &options.callback {
            text = format!("{}({})", callback, text);
        }
        Ok(Some(text))
    }

    /// Atomically replace the entire subtree at `path` with `value`.
    ///
    /// Writing an object over a scalar (or vice versa) is never an error;
    /// the old subtree and any scalar ancestors are deleted in the same
    /// batch.
    pub fn set(&self, path: &str, value: &Value) -> Result<()> {
        let base = DbPath::parse_with_limits(path, &self.limits)?;
        let records = flatten_with_limits(&base, value, &self.limits)?;

        let mut batch = Batch::new().delete_prefix(base.as_str());
        for parent in base.parent_paths() {
            batch = batch.delete_path(parent);
        }
        batch = batch.insert_all(records);

        debug!(path = %base, "set");
        self.backend.apply(batch)?;
        Ok(())
    }

    /// Merge `value` into the subtree at `path` at leaf granularity.
    ///
    /// Objects merge field by field and arrays index by index; scalars
    /// replace the subtree at their own path; a `null` leaf deletes its
    /// path. An empty `{}` or `[]` in the payload is itself a leaf (the
    /// structural marker), so it replaces the existing subtree at that path
    /// rather than merging nothing into it. Re-applying an identical patch
    /// is a no-op.
    pub fn patch(&self, path: &str, value: &Value) -> Result<()> {
        let base = DbPath::parse_with_limits(path, &self.limits)?;

        let mut batch = Batch::new();
        for parent in base.parent_paths() {
            batch = batch.delete_path(parent);
        }
        batch = self.patch_into(batch, base.as_str(), value, 0)?;

        debug!(path = %base, "patch");
        self.backend.apply(batch)?;
        Ok(())
    }

    /// Remove every record under `path`.
    ///
    /// Returns whether anything was removed; absent paths are a no-op.
    pub fn delete(&self, path: &str) -> Result<bool> {
        let base = DbPath::parse_with_limits(path, &self.limits)?;
        let removed = self
            .backend
            .apply(Batch::new().delete_prefix(base.as_str()))?;
        debug!(path = %base, removed, "delete");
        Ok(removed > 0)
    }

    /// True if any record exists at or under `path`.
    pub fn exists(&self, path: &str) -> Result<bool> {
        let base = DbPath::parse_with_limits(path, &self.limits)?;
        Ok(self.backend.count_prefix(base.as_str())? > 0)
    }

    /// Append `value` to the collection at `path`.
    ///
    /// Allocates the smallest array index greater than every existing
    /// immediate-child index (0 for an empty collection) and writes the
    /// value there. Allocation is guarded by an `expect_absent` batch guard
    /// and retried on conflict, so concurrent pushes never share an index.
    /// Returns the allocated index in decimal form.
    pub fn push(&self, path: &str, value: &Value) -> Result<String> {
        let base = DbPath::parse_with_limits(path, &self.limits)?;

        let mut last_conflict = None;
        for _ in 0..MAX_PUSH_RETRIES {
            let next = self.next_push_index(&base)?;
            let segment = codec::to_lex_sortable(next);
            let child = base.child(&segment);
            let records = flatten_with_limits(&child, value, &self.limits)?;

            let mut batch = Batch::new().expect_absent(child.as_str());
            for parent in child.parent_paths() {
                batch = batch.delete_path(parent);
            }
            batch = batch.insert_all(records);

            match self.backend.apply(batch) {
                Ok(_) => {
                    debug!(path = %base, index = next, "push");
                    return Ok(next.to_string());
                }
                Err(err) if err.is_conflict() => {
                    debug!(path = %base, index = next, "push conflict, retrying");
                    last_conflict = Some(err);
                }
                Err(err) => return Err(err),
            }
        }
        Err(last_conflict.unwrap_or_else(|| StoreError::Conflict(base.as_str().to_string())))
    }

    /// The next free array index under `base`.
    fn next_push_index(&self, base: &DbPath) -> Result<i64> {
        let records = self.backend.scan_prefix(base.as_str())?;
        let mut max: Option<i64> = None;
        for record in records {
            let rel = &record.path[base.as_str().len()..];
            if rel.is_empty() {
                continue;
            }
            let segment = first_segment(rel);
            if is_index_segment(segment) {
                let idx = codec::from_lex_sortable(segment)?;
                max = Some(max.map_or(idx, |m| m.max(idx)));
            }
        }
        Ok(max.map_or(0, |m| m + 1))
    }

    /// Recursively turn a patch value into batch operations.
    fn patch_into(&self, batch: Batch, path: &str, value: &Value, depth: usize) -> Result<Batch> {
        if depth > self.limits.max_nesting_depth {
            return Err(StoreError::Limit(format!(
                "nesting depth exceeds maximum of {} levels",
                self.limits.max_nesting_depth
            )));
        }

        match value {
            // A null leaf deletes the path, containers and all.
            Value::Null => Ok(batch.delete_prefix(path)),
            Value::Object(map) if !map.is_empty() => {
                // Clear any scalar or marker occupying the container's path.
                let mut batch = batch.delete_path(path);
                for (key, child) in map {
                    validate_key_with_limits(key, &self.limits)?;
                    let child_path = format!("{}{}/", path, key);
                    batch = self.patch_into(batch, &child_path, child, depth + 1)?;
                }
                Ok(batch)
            }
            Value::Array(items) if !items.is_empty() => {
                let mut batch = batch.delete_path(path);
                for (idx, child) in items.iter().enumerate() {
                    let segment = codec::to_lex_sortable(idx as i64);
                    let child_path = format!("{}{}/", path, segment);
                    batch = self.patch_into(batch, &child_path, child, depth + 1)?;
                }
                Ok(batch)
            }
            scalar => match LeafValue::from_scalar(scalar) {
                Some(leaf) => Ok(batch
                    .delete_prefix(path)
                    .insert(JsonRecord::new(path, leaf))),
                None => unreachable!("non-empty containers handled above"),
            },
        }
    }

    /// Keep only records belonging to immediate children matching `filter`.
    ///
    /// Records are grouped by immediate-child segment; each distinct child
    /// root is evaluated once with point lookups.
    fn filter_children(
        &self,
        base: &DbPath,
        records: Vec<JsonRecord>,
        filter: &Filter,
    ) -> Result<Vec<JsonRecord>> {
        let mut kept = Vec::with_capacity(records.len());
        let mut current: Option<(String, bool)> = None;

        for record in records {
            let rel = &record.path[base.as_str().len()..];
            if rel.is_empty() {
                // A scalar at the collection path has no children to match.
                continue;
            }
            let segment = first_segment(rel).to_string();
            let verdict = match &current {
                Some((s, verdict)) if *s == segment => *verdict,
                _ => {
                    let candidate = base.child(&segment);
                    let verdict = query::evaluate(self.backend.as_ref(), &candidate, filter)?;
                    current = Some((segment, verdict));
                    verdict
                }
            };
            if verdict {
                kept.push(record);
            }
        }
        Ok(kept)
    }
}

/// Keep only records belonging to the first `limit` immediate children.
fn limit_children(base: &DbPath, records: Vec<JsonRecord>, limit: usize) -> Vec<JsonRecord> {
    let mut kept = Vec::with_capacity(records.len());
    let mut seen = 0usize;
    let mut current: Option<String> = None;

    for record in records {
        let rel = &record.path[base.as_str().len()..];
        if rel.is_empty() {
            kept.push(record);
            continue;
        }
        let segment = first_segment(rel).to_string();
        if current.as_deref() != Some(segment.as_str()) {
            seen += 1;
            current = Some(segment);
        }
        if seen > limit {
            break;
        }
        kept.push(record);
    }
    kept
}
