//! Keyed container store
//!
//! A catalog provisions named containers of fixed-width records ordered by
//! a fixed-width key. Two catalogs are provided:
//!
//! - `MemoryCatalog`: process-local, for tests and embedding
//! - `FileCatalog`: one checksummed append-only file per container
//!
//! # Invariants
//!
//! - Every stored record is exactly `record_length` bytes
//! - Keys are unique within a container
//! - Records are visited in unsigned lexicographic key order
//! - A file entry is durable before the mutation becomes visible

mod backend;
mod checksum;
mod cursor;
mod entry;
mod errors;
mod file;
mod memory;

pub use backend::{Catalog, ContainerSpec, EqualityMode, KeyedStream};
pub use errors::{StoreError, StoreResult};
pub use file::{FileCatalog, CONTAINER_EXTENSION};
pub use memory::MemoryCatalog;
