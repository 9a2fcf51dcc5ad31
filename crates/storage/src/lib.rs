//! Storage backends for StrandDB
//!
//! Defines the [`Backend`] contract the document store consumes (point
//! lookup, sorted prefix scan, atomic batch apply) and ships the in-memory
//! reference implementation.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod memory;

pub use backend::{Backend, Batch};
pub use memory::MemoryBackend;
