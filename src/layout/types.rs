//! Field descriptor types
//!
//! Supported encodings:
//! - string: transliterated, NUL-padded text
//! - hexadecimal: packed hex digits

use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage encoding of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FieldEncoding {
    /// Transliterated text
    #[default]
    #[serde(rename = "string")]
    Text,
    /// Packed hex digits
    #[serde(rename = "hexadecimal")]
    Hex,
}

impl FieldEncoding {
    /// Returns the schema name of the encoding
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldEncoding::Text => "string",
            FieldEncoding::Hex => "hexadecimal",
        }
    }

    /// Parses a schema encoding name
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(FieldEncoding::Text),
            "hexadecimal" => Some(FieldEncoding::Hex),
            _ => None,
        }
    }
}

impl fmt::Display for FieldEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// One fixed-width field of a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name, unique within a layout
    pub name: String,
    /// Width in bytes
    #[serde(rename = "maxLength")]
    pub max_length: usize,
    /// Storage encoding
    #[serde(rename = "type", default)]
    pub encoding: FieldEncoding,
}

impl FieldDescriptor {
    /// Create a field descriptor
    pub fn new(name: impl Into<String>, max_length: usize, encoding: FieldEncoding) -> Self {
        Self {
            name: name.into(),
            max_length,
            encoding,
        }
    }

    /// Create a text field
    pub fn text(name: impl Into<String>, max_length: usize) -> Self {
        Self::new(name, max_length, FieldEncoding::Text)
    }

    /// Create a hex field
    pub fn hex(name: impl Into<String>, max_length: usize) -> Self {
        Self::new(name, max_length, FieldEncoding::Hex)
    }
}
