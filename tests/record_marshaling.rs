//! Record Marshaling Tests
//!
//! Tests for invariants:
//! - Text decodes to the original value followed by NUL padding to full width
//! - Text longer than width - 1 bytes is truncated, never overflows
//! - Hex decodes with trailing zero bytes trimmed, keeping at least one byte
//! - Record length is the sum of field widths; fields occupy consecutive windows
//! - Schema documents load in object and array form

use std::sync::Arc;

use keyfile::codec::trim_padding;
use keyfile::{FieldCodec, FieldDescriptor, Latin1, RecordLayout, SchemaLoader};
use serde_json::json;

fn codecs() -> Vec<FieldCodec> {
    vec![FieldCodec::default(), FieldCodec::new(Arc::new(Latin1))]
}

/// Every printable ASCII value shorter than the field decodes to itself
/// plus exactly width - len NUL characters.
#[test]
fn test_text_round_trip_with_padding() {
    let printable: String = (0x20u8..0x7F).map(char::from).collect();
    let width = 12;

    for codec in codecs() {
        for chunk in printable.as_bytes().chunks(width - 1) {
            let value = std::str::from_utf8(chunk).unwrap();
            let decoded = codec.decode_text(&codec.encode_text(value, width));
            let expected = format!("{}{}", value, "\0".repeat(width - value.len()));
            assert_eq!(decoded, expected);
        }
    }
}

/// Values of width bytes or more keep width - 1 bytes plus the terminator.
#[test]
fn test_text_truncation() {
    for codec in codecs() {
        let field = codec.encode_text("ABCDEFGHIJ", 4);
        assert_eq!(field.len(), 4);
        assert_eq!(field[3], 0);
        assert_eq!(trim_padding(&codec.decode_text(&field)), "ABC");
    }
}

/// Hex decoding trims trailing zero bytes but never to an empty string.
#[test]
fn test_hex_trimming() {
    let codec = FieldCodec::default();
    assert_eq!(codec.decode_hex(&[0x1F, 0x00, 0x00]), "1f");
    assert_eq!(codec.decode_hex(&[0x00, 0x00, 0x00]), "00");
    assert_eq!(codec.decode_hex(&[0x00, 0x01]), "0001");
    assert_eq!(codec.decode_hex(&[0xAB, 0x00, 0xCD]), "ab00cd");

    for digits in ["01", "0a0b", "ff00ee", "1"] {
        let field = codec.encode_hex(digits, 4).unwrap();
        let decoded = codec.decode_hex(&field);
        let padded = if digits.len() % 2 == 1 {
            format!("{}0", digits)
        } else {
            digits.to_string()
        };
        assert_eq!(decoded, padded);
    }
}

/// A layout's fields occupy consecutive windows of the record buffer.
#[test]
fn test_record_windows() {
    let layout = RecordLayout::with_codec(
        vec![
            FieldDescriptor::text("key", 3),
            FieldDescriptor::hex("bits", 2),
            FieldDescriptor::text("tail", 4),
        ],
        FieldCodec::new(Arc::new(Latin1)),
    )
    .unwrap();
    assert_eq!(layout.record_length(), 9);

    let buffer = layout
        .encode_record(json!({"key": "ab", "bits": "c0de", "tail": "xyz"}).as_object().unwrap())
        .unwrap();
    assert_eq!(buffer, b"ab\0\xc0\xdexyz\0".to_vec());

    let record = layout.decode_record(&buffer).unwrap();
    assert_eq!(record["key"], "ab\0");
    assert_eq!(record["bits"], "c0de");
    assert_eq!(record["tail"], "xyz\0");
}

/// Object and array schema forms produce the same layout.
#[test]
fn test_schema_forms_agree() {
    let object = SchemaLoader::layout_from_value(
        &json!({"key": {"maxLength": 8}, "data": {"maxLength": 4, "type": "hexadecimal"}}),
        FieldCodec::default(),
    )
    .unwrap();
    let array = SchemaLoader::layout_from_value(
        &json!([
            {"name": "key", "maxLength": 8, "type": "string"},
            {"name": "data", "maxLength": 4, "type": "hexadecimal"}
        ]),
        FieldCodec::default(),
    )
    .unwrap();

    assert_eq!(object.fields(), array.fields());
    assert_eq!(object.container_spec(), array.container_spec());
}
