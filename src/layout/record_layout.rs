//! Record layout: field order, widths and the key field
//!
//! A record is the concatenation of its fields in layout order:
//!
//! ```text
//! +-----------+-----------+-----+-----------+
//! | field 0   | field 1   | ... | field n-1 |
//! +-----------+-----------+-----+-----------+
//! |<------------- record_length ----------->|
//! ```
//!
//! The key field is the field named `key`, or field 0 when there is none.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::key::KeyArgument;
use super::types::{FieldDescriptor, FieldEncoding};
use super::Record;
use crate::codec::FieldCodec;
use crate::error::{DatasetError, DatasetResult};
use crate::store::ContainerSpec;

/// Name that designates the key field explicitly
pub const KEY_FIELD_NAME: &str = "key";

/// Fixed-width record layout computed once per dataset.
#[derive(Debug, Clone)]
pub struct RecordLayout {
    fields: Vec<FieldDescriptor>,
    /// Byte offset of each field
    offsets: Vec<usize>,
    record_length: usize,
    key_index: usize,
    codec: FieldCodec,
}

impl RecordLayout {
    /// Builds a layout using the default codec.
    pub fn build(fields: Vec<FieldDescriptor>) -> DatasetResult<Self> {
        Self::with_codec(fields, FieldCodec::default())
    }

    /// Builds a layout whose text fields use the given codec.
    ///
    /// # Errors
    ///
    /// Returns `KEYFILE_SCHEMA_INVALID` for an empty field list, an empty or
    /// duplicate field name, or a zero width.
    pub fn with_codec(fields: Vec<FieldDescriptor>, codec: FieldCodec) -> DatasetResult<Self> {
        if fields.is_empty() {
            return Err(DatasetError::schema("Schema must define at least one field"));
        }

        let mut names = HashSet::new();
        let mut offsets = Vec::with_capacity(fields.len());
        let mut record_length = 0usize;

        for field in &fields {
            if field.name.is_empty() {
                return Err(DatasetError::schema("Field name must not be empty"));
            }
            if !names.insert(field.name.as_str()) {
                return Err(DatasetError::schema(format!(
                    "Duplicate field name: {}",
                    field.name
                )));
            }
            if field.max_length == 0 {
                return Err(DatasetError::schema(format!(
                    "Field '{}' must have a positive maxLength",
                    field.name
                )));
            }
            offsets.push(record_length);
            record_length += field.max_length;
        }

        let key_index = fields
            .iter()
            .position(|f| f.name == KEY_FIELD_NAME)
            .unwrap_or(0);

        Ok(Self {
            fields,
            offsets,
            record_length,
            key_index,
            codec,
        })
    }

    /// Fields in storage order
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Total record width in bytes
    pub fn record_length(&self) -> usize {
        self.record_length
    }

    /// The key field
    pub fn key_field(&self) -> &FieldDescriptor {
        &self.fields[self.key_index]
    }

    /// Key width in bytes
    pub fn key_length(&self) -> usize {
        self.key_field().max_length
    }

    /// Byte offset of the key inside a record
    pub fn key_offset(&self) -> usize {
        self.offsets[self.key_index]
    }

    /// Codec used for field values
    pub fn codec(&self) -> &FieldCodec {
        &self.codec
    }

    /// Container geometry implied by this layout
    pub fn container_spec(&self) -> ContainerSpec {
        ContainerSpec {
            record_length: self.record_length,
            key_length: self.key_length(),
            key_offset: self.key_offset(),
        }
    }

    /// Encodes a field-value map into a fresh record buffer.
    ///
    /// Every layout field must be present as a string. Extra entries are ignored.
    pub fn encode_record(&self, values: &Map<String, Value>) -> DatasetResult<Vec<u8>> {
        let mut buffer = vec![0u8; self.record_length];

        for (field, &offset) in self.fields.iter().zip(&self.offsets) {
            let value = match values.get(&field.name) {
                Some(Value::String(s)) => s,
                Some(other) => {
                    return Err(DatasetError::field_type(
                        &field.name,
                        format!("Expected a string value, got {}", json_type_name(other)),
                    ))
                }
                None => {
                    return Err(DatasetError::field_type(&field.name, "Missing field value"))
                }
            };

            let encoded = match field.encoding {
                FieldEncoding::Text => self.codec.encode_text(value, field.max_length),
                FieldEncoding::Hex => self
                    .codec
                    .encode_hex(value, field.max_length)
                    .map_err(|e| DatasetError::field_type(&field.name, e.to_string()))?,
            };
            buffer[offset..offset + field.max_length].copy_from_slice(&encoded);
        }

        Ok(buffer)
    }

    /// Decodes a record buffer into a field-value map in layout order.
    pub fn decode_record(&self, buffer: &[u8]) -> DatasetResult<Record> {
        if buffer.len() != self.record_length {
            return Err(DatasetError::format(format!(
                "Record is {} bytes, layout expects {}",
                buffer.len(),
                self.record_length
            )));
        }

        let mut record = Map::with_capacity(self.fields.len());
        for (field, &offset) in self.fields.iter().zip(&self.offsets) {
            let window = &buffer[offset..offset + field.max_length];
            let decoded = match field.encoding {
                FieldEncoding::Text => self.codec.decode_text(window),
                FieldEncoding::Hex => self.codec.decode_hex(window),
            };
            record.insert(field.name.clone(), Value::String(decoded));
        }
        Ok(record)
    }

    /// Extracts the key bytes of an encoded record.
    pub fn key_of<'a>(&self, buffer: &'a [u8]) -> &'a [u8] {
        let start = self.key_offset();
        &buffer[start..start + self.key_length()]
    }

    /// Encodes a locate key.
    ///
    /// Text keys get the stored text encoding (at most `key_length - 1`
    /// bytes, then zeros), so a key finds the record written with the same
    /// value. Raw keys pass through and may be a prefix.
    pub fn encode_key(&self, key: &KeyArgument) -> DatasetResult<Vec<u8>> {
        let key_length = self.key_length();
        match key {
            KeyArgument::Raw(bytes) => {
                if bytes.len() > key_length {
                    return Err(DatasetError::field_type(
                        &self.key_field().name,
                        format!(
                            "Raw key is {} bytes, key length is {}",
                            bytes.len(),
                            key_length
                        ),
                    ));
                }
                Ok(bytes.clone())
            }
            KeyArgument::Text(text) => Ok(self.codec.encode_text(text, key_length)),
            KeyArgument::Hex(digits) => self
                .codec
                .encode_hex(digits, key_length)
                .map_err(|e| DatasetError::field_type(&self.key_field().name, e.to_string())),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
