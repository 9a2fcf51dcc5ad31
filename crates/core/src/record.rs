//! Flattened document records
//!
//! A document is stored as a set of `(path, leaf)` records. Leaves are typed
//! scalars plus two structural markers that keep "exists but empty"
//! distinguishable from "absent". Numbers keep their original literal text so
//! round-trips never lose precision or formatting.

use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A typed scalar leaf or structural marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LeafValue {
    /// JSON `null`
    Null,
    /// JSON boolean
    Bool(bool),
    /// JSON number, original literal text retained
    Number(String),
    /// JSON string
    String(String),
    /// Marker for an object with no fields
    EmptyObject,
    /// Marker for an array with no elements
    EmptyArray,
}

impl LeafValue {
    /// Build a leaf from a scalar `serde_json::Value`.
    ///
    /// Returns `None` for non-empty containers, which flatten into child
    /// records instead of a leaf of their own.
    pub fn from_scalar(value: &Value) -> Option<LeafValue> {
        match value {
            Value::Null => Some(LeafValue::Null),
            Value::Bool(b) => Some(LeafValue::Bool(*b)),
            Value::Number(n) => Some(LeafValue::Number(n.to_string())),
            Value::String(s) => Some(LeafValue::String(s.clone())),
            Value::Object(map) if map.is_empty() => Some(LeafValue::EmptyObject),
            Value::Array(items) if items.is_empty() => Some(LeafValue::EmptyArray),
            _ => None,
        }
    }

    /// Materialize this leaf as a `serde_json::Value`.
    pub fn to_json(&self) -> Result<Value> {
        Ok(match self {
            LeafValue::Null => Value::Null,
            LeafValue::Bool(b) => Value::Bool(*b),
            LeafValue::Number(text) => {
                let number = text.parse::<serde_json::Number>().map_err(|_| {
                    StoreError::Serialization(format!("invalid stored number: {:?}", text))
                })?;
                Value::Number(number)
            }
            LeafValue::String(s) => Value::String(s.clone()),
            LeafValue::EmptyObject => Value::Object(serde_json::Map::new()),
            LeafValue::EmptyArray => Value::Array(Vec::new()),
        })
    }

}

/// A single flattened record: a normalized path and its leaf value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRecord {
    /// Normalized record path, `/`-suffixed
    pub path: String,
    /// Leaf value at that path
    pub value: LeafValue,
}

impl JsonRecord {
    /// Build a record.
    pub fn new(path: impl Into<String>, value: LeafValue) -> Self {
        JsonRecord {
            path: path.into(),
            value,
        }
    }
}
