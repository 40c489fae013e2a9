//! keyfile - keyed fixed-width record datasets
//!
//! A schema describes a fixed-width record; the crate marshals field values
//! to and from that layout and performs keyed operations (locate, read,
//! write, update, delete) against a keyed container.
//!
//! ```ignore
//! use std::sync::Arc;
//! use keyfile::{Catalog, EqualityMode, FieldDescriptor, KeyArgument, KeyedFile, MemoryCatalog, RecordLayout};
//!
//! let catalog: Arc<dyn Catalog> = Arc::new(MemoryCatalog::new());
//! let layout = RecordLayout::build(vec![
//!     FieldDescriptor::text("key", 8),
//!     FieldDescriptor::text("value", 32),
//! ])?;
//! let mut file = KeyedFile::create_new(catalog, "HLQ.DATA", layout)?;
//! file.write(&record)?;
//! let found = file.find(Some(&KeyArgument::text("K1")), EqualityMode::Equal)?;
//! file.close()?;
//! ```

pub mod cli;
pub mod codec;
pub mod engine;
pub mod error;
pub mod handle;
pub mod layout;
pub mod observability;
pub mod store;

pub use codec::{Charset, FieldCodec, Ibm1047, Latin1};
pub use engine::{AsyncKeyedFile, Completion, Request};
pub use error::{DatasetError, DatasetResult, ErrorCode, Severity};
pub use handle::KeyedFile;
pub use layout::{FieldDescriptor, FieldEncoding, KeyArgument, Record, RecordLayout, SchemaLoader};
pub use store::{Catalog, ContainerSpec, EqualityMode, FileCatalog, KeyedStream, MemoryCatalog};
