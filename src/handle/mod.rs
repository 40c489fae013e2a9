//! Keyed file handle
//!
//! A `KeyedFile` binds a record layout to one open keyed stream.
//!
//! # Invariants
//!
//! - One handle per open stream; the stream is never shared
//! - Record and key lengths come from the container and match the layout
//! - A closed handle rejects every record operation with `KEYFILE_NOT_OPEN`
//! - Deallocation requires a closed handle

mod keyed_file;

pub use keyed_file::KeyedFile;
