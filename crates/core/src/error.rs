//! Error types for the document store
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use crate::codec::CodecError;
use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Error types for the document store
#[derive(Debug, Error)]
pub enum StoreError {
    /// A path segment failed validation
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// An encoded number did not match the codec grammar
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// A size limit was exceeded
    #[error("Limit exceeded: {0}")]
    Limit(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A conditional batch write found a guard path already present
    #[error("Write conflict at {0}")]
    Conflict(String),

    /// Backend failure (I/O, transaction aborts)
    #[error("Storage error: {0}")]
    Storage(String),
}

impl StoreError {
    /// Build a storage error from any displayable cause
    pub fn storage(cause: impl std::fmt::Display) -> Self {
        StoreError::Storage(cause.to_string())
    }

    /// True if this error is a write conflict (retryable)
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_key() {
        let err = StoreError::InvalidKey("a.b".to_string());
        assert!(err.to_string().contains("Invalid key"));
        assert!(err.to_string().contains("a.b"));
    }

    #[test]
    fn test_error_display_storage() {
        let err = StoreError::storage("disk write failed");
        assert!(err.to_string().contains("Storage error"));
        assert!(err.to_string().contains("disk write failed"));
    }

    #[test]
    fn test_error_from_codec() {
        let codec_err = CodecError::Empty;
        let err: StoreError = codec_err.into();
        assert!(matches!(err, StoreError::Codec(_)));
    }

    #[test]
    fn test_conflict_is_retryable() {
        assert!(StoreError::Conflict("/a/".into()).is_conflict());
        assert!(!StoreError::storage("x").is_conflict());
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(returns_result().unwrap(), 42);
    }
}
