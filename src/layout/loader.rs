//! Schema loader
//!
//! Accepts the schema document in two shapes:
//!
//! ```text
//! {"key": {"maxLength": 8}, "value": {"maxLength": 20, "type": "string"}}
//! [{"name": "key", "maxLength": 8, "type": "hexadecimal"}, ...]
//! ```
//!
//! Property order of the object form is the storage order. `type` defaults
//! to `"string"`; any value other than `"string"` or `"hexadecimal"` is
//! rejected.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use super::record_layout::RecordLayout;
use super::types::{FieldDescriptor, FieldEncoding};
use crate::codec::FieldCodec;
use crate::error::{DatasetError, DatasetResult};

/// Decodes schema documents into field descriptors and layouts.
pub struct SchemaLoader;

impl SchemaLoader {
    /// Parses a schema document into ordered field descriptors.
    pub fn parse_fields(schema: &Value) -> DatasetResult<Vec<FieldDescriptor>> {
        match schema {
            Value::Object(properties) => properties
                .iter()
                .map(|(name, item)| Self::parse_field(name, item))
                .collect(),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    let name = item
                        .get("name")
                        .and_then(Value::as_str)
                        .ok_or_else(|| DatasetError::schema("Field entry must have a string 'name'"))?;
                    Self::parse_field(name, item)
                })
                .collect(),
            _ => Err(DatasetError::schema(
                "Schema must be an object or an array of field descriptors",
            )),
        }
    }

    fn parse_field(name: &str, item: &Value) -> DatasetResult<FieldDescriptor> {
        let item: &Map<String, Value> = item.as_object().ok_or_else(|| {
            DatasetError::schema(format!("Field '{}' must be an object", name))
        })?;

        let max_length = item
            .get("maxLength")
            .and_then(Value::as_i64)
            .ok_or_else(|| {
                DatasetError::schema(format!("Field '{}' must have an integer maxLength", name))
            })?;
        if max_length <= 0 {
            return Err(DatasetError::schema(format!(
                "Field '{}' must have a positive maxLength, got {}",
                name, max_length
            )));
        }

        let encoding = match item.get("type") {
            None => FieldEncoding::Text,
            Some(Value::String(t)) => FieldEncoding::from_type_name(t).ok_or_else(|| {
                DatasetError::schema(format!("Field '{}' has unknown type '{}'", name, t))
            })?,
            Some(_) => {
                return Err(DatasetError::schema(format!(
                    "Field '{}' type must be a string",
                    name
                )))
            }
        };

        Ok(FieldDescriptor::new(name, max_length as usize, encoding))
    }

    /// Parses a schema document and builds its layout.
    pub fn layout_from_value(schema: &Value, codec: FieldCodec) -> DatasetResult<RecordLayout> {
        RecordLayout::with_codec(Self::parse_fields(schema)?, codec)
    }

    /// Parses a JSON schema string and builds its layout.
    pub fn layout_from_str(schema: &str, codec: FieldCodec) -> DatasetResult<RecordLayout> {
        let value: Value = serde_json::from_str(schema)
            .map_err(|e| DatasetError::schema("Invalid schema JSON").with_source(e))?;
        Self::layout_from_value(&value, codec)
    }

    /// Loads a JSON schema file and builds its layout.
    pub fn load_file(path: &Path, codec: FieldCodec) -> DatasetResult<RecordLayout> {
        let content = fs::read_to_string(path).map_err(|e| {
            DatasetError::schema("Failed to read schema file")
                .with_details(format!("path: {}", path.display()))
                .with_source(e)
        })?;
        Self::layout_from_str(&content, codec)
    }
}
