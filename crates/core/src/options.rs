//! Read options
//!
//! [`GetOptions`] is an immutable configuration bundle for reads. Setters
//! take and return `self`, so option values are built functionally and
//! copied, never mutated in place.

use crate::filter::Filter;
use serde::{Deserialize, Serialize};

/// Options for `get` / `get_as_string`.
///
/// `pretty_print` and `callback` are presentation concerns honored only when
/// serializing; they never change what is read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetOptions {
    /// Pretty-print serialized output
    pub pretty_print: bool,
    /// Limit reconstruction depth; deeper content becomes `true` markers
    pub depth: Option<usize>,
    /// Wrap serialized output in `callback(...)`
    pub callback: Option<String>,
    /// Keep only matching immediate children of the requested path
    pub filter: Option<Filter>,
    /// Keep only the first N immediate children (applied after filtering)
    pub limit_to_first: Option<usize>,
}

impl GetOptions {
    /// Default options: deep read, compact output.
    pub fn new() -> Self {
        GetOptions::default()
    }

    /// Pretty-print serialized output.
    pub fn pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    /// Reconstruct one level only; children summarize to existence markers.
    pub fn shallow(self, shallow: bool) -> Self {
        self.depth(if shallow { Some(1) } else { None })
    }

    /// Limit reconstruction depth. `None` (or zero) means unlimited.
    pub fn depth(mut self, depth: Option<usize>) -> Self {
        self.depth = depth;
        self
    }

    /// Wrap serialized output in `callback(...)`.
    pub fn callback(mut self, callback: impl Into<String>) -> Self {
        self.callback = Some(callback.into());
        self
    }

    /// Keep only immediate children matching `filter`.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Keep only the first `n` immediate children.
    pub fn limit_to_first(mut self, n: usize) -> Self {
        self.limit_to_first = Some(n);
        self
    }
}
