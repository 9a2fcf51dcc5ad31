//! Flatten / reconstruct engine
//!
//! Converts tree-shaped JSON to and from a flat record set keyed by
//! normalized paths. Flattening descends objects (segment = field name) and
//! arrays (segment = lex-sortable encoded index); scalar leaves become single
//! records and empty containers become structural-marker records.
//! Reconstruction is the exact inverse and additionally supports
//! depth-limited (shallow) reads, where content below the requested depth
//! collapses to `true` existence markers.
//!
//! Round-trip invariant: `reconstruct(base, flatten(base, doc)) == doc` for
//! any JSON value built from objects, arrays, and scalars.

use crate::codec;
use crate::error::{Result, StoreError};
use crate::limits::Limits;
use crate::path::{is_index_segment, validate_key_with_limits, DbPath};
use crate::record::{JsonRecord, LeafValue};
use serde_json::{Map, Value};

/// Flatten a JSON value rooted at `base` into records, default limits.
pub fn flatten(base: &DbPath, value: &Value) -> Result<Vec<JsonRecord>> {
    flatten_with_limits(base, value, &Limits::default())
}

/// Flatten a JSON value rooted at `base` into records.
pub fn flatten_with_limits(
    base: &DbPath,
    value: &Value,
    limits: &Limits,
) -> Result<Vec<JsonRecord>> {
    let mut records = Vec::new();
    flatten_into(base.as_str(), value, 0, limits, &mut records)?;
    Ok(records)
}

fn flatten_into(
    path: &str,
    value: &Value,
    depth: usize,
    limits: &Limits,
    out: &mut Vec<JsonRecord>,
) -> Result<()> {
    if depth > limits.max_nesting_depth {
        return Err(StoreError::Limit(format!(
            "nesting depth exceeds maximum of {} levels",
            limits.max_nesting_depth
        )));
    }

    if let Some(leaf) = LeafValue::from_scalar(value) {
        out.push(JsonRecord::new(path, leaf));
        return Ok(());
    }

    match value {
        Value::Object(map) => {
            for (key, child) in map {
                validate_key_with_limits(key, limits)?;
                let child_path = format!("{}{}/", path, key);
                flatten_into(&child_path, child, depth + 1, limits, out)?;
            }
        }
        Value::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                let segment = codec::to_lex_sortable(idx as i64);
                let child_path = format!("{}{}/", path, segment);
                flatten_into(&child_path, child, depth + 1, limits, out)?;
            }
        }
        // Scalars and empty containers were handled by from_scalar.
        _ => unreachable!("scalar handled above"),
    }
    Ok(())
}

/// Rebuild a JSON value from the records under `base`.
///
/// Records may arrive in any order but must all have `base` as a path prefix
/// (the facade's prefix scan guarantees both). Index gaps in arrays read
/// back as `null`. Returns `None` when no records match.
///
/// `depth` limits reconstruction: records deeper than `depth` levels below
/// `base` collapse to a boolean `true` marker at their truncated path.
/// `None` (or zero) means unlimited.
pub fn reconstruct(
    base: &DbPath,
    records: &[JsonRecord],
    depth: Option<usize>,
) -> Result<Option<Value>> {
    let depth = depth.filter(|d| *d > 0);
    let mut root: Option<Value> = None;

    for record in records {
        let rel = record.path.strip_prefix(base.as_str()).ok_or_else(|| {
            StoreError::storage(format!(
                "record {:?} outside of scan prefix {:?}",
                record.path, base
            ))
        })?;
        let rel = rel.strip_suffix('/').unwrap_or(rel);

        if rel.is_empty() {
            // The base path itself holds a scalar or empty container.
            root = Some(record.value.to_json()?);
            continue;
        }

        let segments: Vec<&str> = rel.split('/').collect();
        let (segments, leaf) = match depth {
            Some(d) if segments.len() > d => (&segments[..d], Value::Bool(true)),
            _ => (&segments[..], record.value.to_json()?),
        };

        let node = root.get_or_insert_with(|| new_container(segments[0]));
        insert_at(node, segments, leaf)?;
    }

    Ok(root)
}

/// Insert `leaf` at the relative `segments` below `node`, creating
/// intermediate containers as needed.
fn insert_at(node: &mut Value, segments: &[&str], leaf: Value) -> Result<()> {
    let segment = segments[0];
    let rest = &segments[1..];

    match node {
        Value::Object(map) => {
            if rest.is_empty() {
                map.insert(segment.to_string(), leaf);
                Ok(())
            } else {
                let child = map
                    .entry(segment.to_string())
                    .or_insert_with(|| new_container(rest[0]));
                insert_at(child, rest, leaf)
            }
        }
        Value::Array(items) => {
            let idx = decode_index(segment)?;
            while items.len() <= idx {
                items.push(Value::Null);
            }
            if rest.is_empty() {
                items[idx] = leaf;
                Ok(())
            } else {
                if items[idx].is_null() {
                    items[idx] = new_container(rest[0]);
                }
                insert_at(&mut items[idx], rest, leaf)
            }
        }
        _ => Err(StoreError::storage(format!(
            "record path segment {:?} descends into a scalar",
            segment
        ))),
    }
}

fn new_container(next_segment: &str) -> Value {
    if is_index_segment(next_segment) {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    }
}

fn decode_index(segment: &str) -> Result<usize> {
    let idx = codec::from_lex_sortable(segment)?;
    usize::try_from(idx)
        .map_err(|_| StoreError::storage(format!("negative array index {:?}", segment)))
}
