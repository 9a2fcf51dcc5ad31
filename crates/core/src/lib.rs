//! Core types and algorithms for StrandDB
//!
//! This crate defines the pieces that turn nested JSON into a flat, ordered
//! record space and back:
//! - `codec`: lex-sortable numeric encoding for array indices and numbers
//! - `path`: path normalization and key validation
//! - `record`: flattened `(path, leaf)` records
//! - `flatten`: flatten / reconstruct engine, including shallow reads
//! - `filter`: filter expression types and builders
//! - `options`: read options
//! - `error`: error hierarchy
//! - `limits`: configurable size limits

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod error;
pub mod filter;
pub mod flatten;
pub mod limits;
pub mod options;
pub mod path;
pub mod record;

// Re-export commonly used types
pub use codec::{CodecError, NEGATIVE_MARKER, POSITIVE_MARKER};
pub use error::{Result, StoreError};
pub use filter::{Combinator, Filter, Op};
pub use flatten::{flatten, flatten_with_limits, reconstruct};
pub use limits::Limits;
pub use options::GetOptions;
pub use path::{validate_key, DbPath};
pub use record::{JsonRecord, LeafValue};
