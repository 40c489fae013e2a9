//! Record layout subsystem
//!
//! Turns a schema description into a fixed-width byte layout and
//! marshals whole records and keys through the field codec.
//!
//! # Invariants
//!
//! - `record_length` is the sum of all field widths
//! - Field order is storage order
//! - The key field is `key` if present, else the first field
//! - Record buffers are zero-initialized before any field is written

mod key;
mod loader;
mod record_layout;
mod types;

pub use key::KeyArgument;
pub use loader::SchemaLoader;
pub use record_layout::{RecordLayout, KEY_FIELD_NAME};
pub use types::{FieldDescriptor, FieldEncoding};

/// A decoded record: field name to value, in layout order
pub type Record = serde_json::Map<String, serde_json::Value>;
