//! Path normalization and key validation
//!
//! User-facing paths are `/`-separated sequences of object field names and
//! array indices. Internally every path is normalized to start and end with
//! `/`, and all-digit segments are converted to their lex-sortable encoded
//! form so that array element paths sort numerically under plain byte
//! comparison.
//!
//! ## Contract
//!
//! - Keys must not contain `.` `%` `$` `#` `[` `]` `/`, ASCII control
//!   characters 0-31, or DEL (127)
//! - Keys must not exceed `max_key_bytes` (default: 768)

use crate::codec::{self, POSITIVE_MARKER};
use crate::error::{Result, StoreError};
use crate::limits::Limits;
use std::fmt;

/// A normalized database path: `/`-prefixed, `/`-suffixed, with array index
/// segments in lex-sortable encoded form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DbPath(String);

impl DbPath {
    /// The root path `/`.
    pub fn root() -> Self {
        DbPath("/".to_string())
    }

    /// Parse and normalize a user-facing path.
    ///
    /// Empty segments are dropped (`"//a///b"` equals `"/a/b"`), every
    /// segment is validated, and all-digit segments are encoded as array
    /// indices.
    pub fn parse(path: &str) -> Result<Self> {
        Self::parse_with_limits(path, &Limits::default())
    }

    /// Parse and normalize with custom limits.
    pub fn parse_with_limits(path: &str, limits: &Limits) -> Result<Self> {
        let mut normalized = String::with_capacity(path.len() + 2);
        normalized.push('/');
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            validate_key_with_limits(segment, limits)?;
            match parse_index_segment(segment) {
                Some(idx) => normalized.push_str(&codec::to_lex_sortable(idx)),
                None => normalized.push_str(segment),
            }
            normalized.push('/');
        }
        Ok(DbPath(normalized))
    }

    /// The normalized path string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if this is the root path.
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Append a single already-validated segment, returning a new path.
    pub fn child(&self, segment: &str) -> DbPath {
        DbPath(format!("{}{}/", self.0, segment))
    }

    /// Append another normalized path's segments, returning a new path.
    ///
    /// Unlike [`parse`](DbPath::parse), no validation or encoding happens:
    /// both sides are already normalized, so segments that only occur
    /// internally (encoded array indices) pass through unchanged.
    pub fn join(&self, rel: &DbPath) -> DbPath {
        if rel.is_root() {
            self.clone()
        } else {
            DbPath(format!("{}{}", self.0, &rel.0[1..]))
        }
    }

    /// Every proper ancestor path, shortest first, excluding the root.
    ///
    /// `/a/b/c/` yields `["/a/", "/a/b/"]`.
    pub fn parent_paths(&self) -> Vec<String> {
        let mut parents = Vec::new();
        let trimmed = self.0.trim_end_matches('/');
        let mut end = 0usize;
        for (i, b) in trimmed.bytes().enumerate().skip(1) {
            if b == b'/' {
                end = i;
                parents.push(trimmed[..=end].to_string());
            }
        }
        parents
    }
}

impl fmt::Display for DbPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validate a key (path segment) using default limits.
pub fn validate_key(key: &str) -> Result<()> {
    validate_key_with_limits(key, &Limits::default())
}

/// Validate a key (path segment) with custom limits.
pub fn validate_key_with_limits(key: &str, limits: &Limits) -> Result<()> {
    for c in key.chars() {
        let invalid = matches!(c, '.' | '%' | '$' | '#' | '[' | ']' | '/' | '\u{7f}')
            || ('\u{1}'..='\u{1f}').contains(&c)
            || c == '\u{0}';
        if invalid {
            return Err(StoreError::InvalidKey(format!(
                "cannot contain ., %, $, #, [, ], /, or ASCII control characters: {:?}",
                key
            )));
        }
    }
    if key.len() > limits.max_key_bytes {
        return Err(StoreError::InvalidKey(format!(
            "longer than {} bytes: {:?}",
            limits.max_key_bytes, key
        )));
    }
    Ok(())
}

/// If `segment` is all digits and fits an i64, return it as an array index.
fn parse_index_segment(segment: &str) -> Option<i64> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse::<i64>().ok()
}

/// True if an internal path segment is an encoded array index.
///
/// Only the positive marker counts: array indices are never negative, and
/// `-` is a legal leading character for field names.
pub fn is_index_segment(segment: &str) -> bool {
    segment.starts_with(POSITIVE_MARKER)
}

/// The first segment of `rest`, a path remainder with no leading `/`.
pub fn first_segment(rest: &str) -> &str {
    match rest.find('/') {
        Some(pos) => &rest[..pos],
        None => rest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Normalization ===

    #[test]
    fn test_parse_simple() {
        assert_eq!(DbPath::parse("/a/b").unwrap().as_str(), "/a/b/");
    }

    #[test]
    fn test_parse_drops_empty_segments() {
        assert_eq!(DbPath::parse("//a///b/").unwrap().as_str(), "/a/b/");
        assert_eq!(DbPath::parse("a/b").unwrap().as_str(), "/a/b/");
    }

    #[test]
    fn test_parse_empty_is_root() {
        assert_eq!(DbPath::parse("").unwrap().as_str(), "/");
        assert_eq!(DbPath::parse("/").unwrap().as_str(), "/");
        assert!(DbPath::parse("/").unwrap().is_root());
    }

    #[test]
    fn test_parse_encodes_integer_segments() {
        let path = DbPath::parse("/test/5").unwrap();
        assert_eq!(path.as_str(), "/test/[5/");
        let path = DbPath::parse("/test/10").unwrap();
        assert_eq!(path.as_str(), "/test/[[210/");
    }

    #[test]
    fn test_parse_mixed_segment_not_index() {
        assert_eq!(DbPath::parse("/a/1b").unwrap().as_str(), "/a/1b/");
    }

    // === Validation ===

    #[test]
    fn test_invalid_characters_rejected() {
        for bad in ["a.b", "a%b", "a$b", "a#b", "a[b", "a]b", "a\x01b", "a\x7fb"] {
            assert!(
                matches!(DbPath::parse(bad), Err(StoreError::InvalidKey(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_key_too_long_rejected() {
        let key = "x".repeat(769);
        assert!(matches!(
            validate_key(&key),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(validate_key(&"x".repeat(768)).is_ok());
    }

    #[test]
    fn test_custom_limits() {
        let limits = Limits {
            max_key_bytes: 4,
            ..Limits::default()
        };
        assert!(validate_key_with_limits("abcd", &limits).is_ok());
        assert!(validate_key_with_limits("abcde", &limits).is_err());
    }

    // === Helpers ===

    #[test]
    fn test_parent_paths() {
        let path = DbPath::parse("/a/b/c").unwrap();
        assert_eq!(path.parent_paths(), vec!["/a/", "/a/b/"]);
        assert!(DbPath::root().parent_paths().is_empty());
        assert!(DbPath::parse("/a").unwrap().parent_paths().is_empty());
    }

    #[test]
    fn test_child() {
        let path = DbPath::parse("/a").unwrap();
        assert_eq!(path.child("b").as_str(), "/a/b/");
    }

    #[test]
    fn test_join_keeps_encoded_segments() {
        let base = DbPath::parse("/c").unwrap().child("[0");
        let rel = DbPath::parse("/name").unwrap();
        assert_eq!(base.join(&rel).as_str(), "/c/[0/name/");
        assert_eq!(base.join(&DbPath::root()).as_str(), "/c/[0/");
    }

    #[test]
    fn test_first_segment() {
        assert_eq!(first_segment("a/b/"), "a");
        assert_eq!(first_segment("a"), "a");
    }

    #[test]
    fn test_is_index_segment() {
        assert!(is_index_segment("[5"));
        assert!(is_index_segment("[[210"));
        assert!(!is_index_segment("name"));
        // Dash-prefixed segments are field names, not indices.
        assert!(!is_index_segment("-note"));
        assert!(!is_index_segment("-"));
    }

    // === Ordering ===

    #[test]
    fn test_index_paths_sort_numerically() {
        let mut paths: Vec<String> = (0..15)
            .map(|i| DbPath::parse(&format!("/c/{}", i)).unwrap().as_str().to_string())
            .collect();
        let sorted = paths.clone();
        paths.sort();
        assert_eq!(paths, sorted);
    }
}
