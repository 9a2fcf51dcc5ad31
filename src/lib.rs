//! StrandDB: an embedded JSON document store
//!
//! Documents are addressed by `/`-separated paths and stored flattened into
//! an ordered key-value backend: every scalar leaf becomes one record keyed
//! by its full path, array indices are encoded so paths sort numerically,
//! and reads reconstruct subtrees from a single prefix scan.
//!
//! ```
//! use stranddb::{GetOptions, JsonDb};
//! use serde_json::json;
//!
//! let db = JsonDb::in_memory();
//! db.set("/users/u1", &json!({"name": "Joe", "age": 25})).unwrap();
//! let name = db.get("/users/u1/name", &GetOptions::new()).unwrap();
//! assert_eq!(name, Some(json!("Joe")));
//! ```
//!
//! The crate splits into:
//! - `strand-core`: lex-sortable codec, paths, flatten/reconstruct, filters
//! - `strand-storage`: the [`Backend`] contract and the in-memory backend
//! - this crate: the [`JsonDb`] facade and filter evaluation

#![warn(missing_docs)]
#![warn(clippy::all)]

mod db;
mod query;

pub use db::JsonDb;

pub use strand_core::{
    CodecError, Combinator, DbPath, Filter, GetOptions, Limits, Op, Result, StoreError,
};
pub use strand_storage::{Backend, Batch, MemoryBackend};
