//! Size limits for keys and documents
//!
//! This module defines configurable size limits enforced when paths are
//! parsed and documents are flattened. Violations result in
//! [`StoreError::Limit`](crate::error::StoreError) errors.

/// Size limits for keys and documents
///
/// These limits are enforced by path parsing and the flattener.
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum key (path segment) length in bytes (default: 768)
    pub max_key_bytes: usize,

    /// Maximum nesting depth of a document (default: 100)
    pub max_nesting_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_key_bytes: 768,
            max_nesting_depth: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.max_key_bytes, 768);
        assert_eq!(limits.max_nesting_depth, 100);
    }

    #[test]
    fn test_functional_update() {
        let limits = Limits {
            max_nesting_depth: 8,
            ..Limits::default()
        };
        assert_eq!(limits.max_nesting_depth, 8);
        assert_eq!(limits.max_key_bytes, 768);
    }
}
