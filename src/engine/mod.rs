//! Keyed operation engine
//!
//! Read, find, write, update, delete and deallocate as discrete units of
//! work over a [`KeyedFile`](crate::handle::KeyedFile).
//!
//! # Outcomes
//!
//! | Operation | Success | Not found | Failure |
//! |-----------|---------|-----------|---------|
//! | read/find | `Record` | `NoRecord` | `KEYFILE_READ_FAILED` |
//! | write | `Done` | - | `KEYFILE_WRITE_FAILED` |
//! | update | `Done` | - | `KEYFILE_UPDATE_FAILED` |
//! | delete | `Done` | - | `KEYFILE_DELETE_FAILED` |
//!
//! The sync surface is `KeyedFile::execute` and its per-operation methods;
//! `AsyncKeyedFile` runs the same requests on the blocking pool with one
//! completion per request.

mod dispatch;
mod operations;
mod request;
mod session;

pub use request::{Completion, Request};
pub use session::AsyncKeyedFile;
