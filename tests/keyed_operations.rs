//! Keyed Operation Tests
//!
//! Tests for invariants:
//! - Records are visited in ascending internal key byte order
//! - A written record is found by its key; a deleted one is not
//! - Update never changes the key bytes of the current record
//! - First/Last/Equal/GreaterOrEqual position as documented
//! - A per-record failure leaves the handle open and usable
//!
//! Every scenario runs against both the in-memory and the file catalog.

use std::sync::Arc;

use keyfile::codec::trim_padding;
use keyfile::{
    Catalog, EqualityMode, ErrorCode, FieldCodec, FieldDescriptor, FileCatalog, KeyArgument,
    KeyedFile, Latin1, MemoryCatalog, Record, RecordLayout,
};
use serde_json::json;
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn for_each_catalog(scenario: impl Fn(Arc<dyn Catalog>)) {
    scenario(Arc::new(MemoryCatalog::new()));

    let dir = TempDir::new().expect("Failed to create temp dir");
    scenario(Arc::new(FileCatalog::new(dir.path(), false)));
}

fn text_layout() -> RecordLayout {
    RecordLayout::build(vec![
        FieldDescriptor::text("key", 8),
        FieldDescriptor::text("value", 16),
    ])
    .unwrap()
}

fn rec(key: &str, value: &str) -> Record {
    json!({"key": key, "value": value}).as_object().cloned().unwrap()
}

fn key_of(record: &Record) -> String {
    trim_padding(record["key"].as_str().unwrap()).to_string()
}

fn value_of(record: &Record) -> String {
    trim_padding(record["value"].as_str().unwrap()).to_string()
}

fn scan_keys(file: &mut KeyedFile) -> Vec<String> {
    let mut keys = Vec::new();
    while let Some(record) = file.read().unwrap() {
        keys.push(key_of(&record));
    }
    keys
}

// =============================================================================
// Key Ordering
// =============================================================================

/// Sequential reads return records in ascending key order regardless of
/// insertion order.
#[test]
fn test_sequential_read_is_key_ordered() {
    for_each_catalog(|catalog| {
        let mut file = KeyedFile::create_new(catalog, "HLQ.ORDER", text_layout()).unwrap();
        for k in ["K5", "K1", "K4", "K2", "K3"] {
            file.write(&rec(k, "v")).unwrap();
        }
        assert_eq!(scan_keys(&mut file), vec!["K1", "K2", "K3", "K4", "K5"]);
    });
}

/// Ordering follows internal bytes: in EBCDIC lowercase sorts before
/// uppercase and digits sort last.
#[test]
fn test_order_follows_internal_charset() {
    for_each_catalog(|catalog| {
        let mut file = KeyedFile::create_new(catalog, "HLQ.EBCDIC", text_layout()).unwrap();
        for k in ["11", "B1", "a1"] {
            file.write(&rec(k, "v")).unwrap();
        }
        assert_eq!(scan_keys(&mut file), vec!["a1", "B1", "11"]);
    });

    let catalog: Arc<dyn Catalog> = Arc::new(MemoryCatalog::new());
    let latin1 = RecordLayout::with_codec(
        vec![FieldDescriptor::text("key", 8), FieldDescriptor::text("value", 16)],
        FieldCodec::new(Arc::new(Latin1)),
    )
    .unwrap();
    let mut file = KeyedFile::create_new(catalog, "HLQ.LATIN1", latin1).unwrap();
    for k in ["11", "B1", "a1"] {
        file.write(&rec(k, "v")).unwrap();
    }
    assert_eq!(scan_keys(&mut file), vec!["11", "B1", "a1"]);
}

/// First and Last position at the extreme keys; Equal at the exact key;
/// GreaterOrEqual at the next key when the exact one is absent.
#[test]
fn test_locate_modes() {
    for_each_catalog(|catalog| {
        let mut file = KeyedFile::create_new(catalog, "HLQ.MODES", text_layout()).unwrap();
        for k in ["K1", "K2", "K3"] {
            file.write(&rec(k, &format!("value-{}", k))).unwrap();
        }

        let first = file.find_first().unwrap().unwrap();
        assert_eq!(key_of(&first), "K1");

        let last = file.find_last().unwrap().unwrap();
        assert_eq!(key_of(&last), "K3");
        assert!(file.read().unwrap().is_none());

        let equal = file
            .find(Some(&KeyArgument::text("K2")), EqualityMode::Equal)
            .unwrap()
            .unwrap();
        assert_eq!(value_of(&equal), "value-K2");

        let next = file.read().unwrap().unwrap();
        assert_eq!(key_of(&next), "K3");

        let ge = file
            .find(Some(&KeyArgument::text("K25")), EqualityMode::GreaterOrEqual)
            .unwrap()
            .unwrap();
        assert_eq!(key_of(&ge), "K3");

        assert!(file
            .find(Some(&KeyArgument::text("K9")), EqualityMode::GreaterOrEqual)
            .unwrap()
            .is_none());
    });
}

/// First and Last on an empty dataset report no record.
#[test]
fn test_locate_on_empty_dataset() {
    for_each_catalog(|catalog| {
        let mut file = KeyedFile::create_new(catalog, "HLQ.EMPTY", text_layout()).unwrap();
        assert!(file.find_first().unwrap().is_none());
        assert!(file.find_last().unwrap().is_none());
        assert!(file.read().unwrap().is_none());
    });
}

/// A raw key shorter than the key field matches as a prefix.
#[test]
fn test_raw_prefix_key() {
    for_each_catalog(|catalog| {
        let mut file = KeyedFile::create_new(catalog, "HLQ.PREFIX", text_layout()).unwrap();
        file.write(&rec("ABC1", "first")).unwrap();
        file.write(&rec("XYZ1", "second")).unwrap();

        let prefix = FieldCodec::default().encode_text("XY", 3)[..2].to_vec();
        let found = file
            .find(Some(&KeyArgument::Raw(prefix)), EqualityMode::Equal)
            .unwrap()
            .unwrap();
        assert_eq!(value_of(&found), "second");
    });
}

// =============================================================================
// Write / Delete
// =============================================================================

/// Write then find Equal returns the same record.
#[test]
fn test_write_then_find() {
    for_each_catalog(|catalog| {
        let mut file = KeyedFile::create_new(catalog, "HLQ.WRITE", text_layout()).unwrap();
        file.write(&rec("K1", "hello")).unwrap();

        let found = file
            .find(Some(&KeyArgument::text("K1")), EqualityMode::Equal)
            .unwrap()
            .unwrap();
        assert_eq!(key_of(&found), "K1");
        assert_eq!(value_of(&found), "hello");
        // Padding is kept on decode
        assert_eq!(found["value"].as_str().unwrap().len(), 16);
    });
}

/// A key value filling the whole key field is stored truncated; finding
/// with the same value still locates it.
#[test]
fn test_find_key_filling_key_field() {
    for_each_catalog(|catalog| {
        let layout = RecordLayout::build(vec![
            FieldDescriptor::text("key", 4),
            FieldDescriptor::text("value", 8),
        ])
        .unwrap();
        let mut file = KeyedFile::create_new(catalog, "HLQ.FULLKEY", layout).unwrap();
        file.write(&rec("ABCD", "full")).unwrap();
        // Same stored key once truncated
        let err = file.write(&rec("ABCX", "other")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::WriteFailed);

        let found = file
            .find(Some(&KeyArgument::text("ABCD")), EqualityMode::Equal)
            .unwrap()
            .unwrap();
        assert_eq!(key_of(&found), "ABC");
        assert_eq!(value_of(&found), "full");
    });
}

/// A second write with an existing key fails and changes nothing.
#[test]
fn test_duplicate_key_rejected() {
    for_each_catalog(|catalog| {
        let mut file = KeyedFile::create_new(catalog, "HLQ.DUP", text_layout()).unwrap();
        file.write(&rec("K1", "original")).unwrap();

        let err = file.write(&rec("K1", "replacement")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::WriteFailed);

        let found = file.find_first().unwrap().unwrap();
        assert_eq!(value_of(&found), "original");
    });
}

/// Delete then find Equal reports no record; the next read returns the
/// following key.
#[test]
fn test_delete_then_find() {
    for_each_catalog(|catalog| {
        let mut file = KeyedFile::create_new(catalog, "HLQ.DELETE", text_layout()).unwrap();
        for k in ["K1", "K2", "K3"] {
            file.write(&rec(k, "v")).unwrap();
        }

        file.find(Some(&KeyArgument::text("K2")), EqualityMode::Equal)
            .unwrap()
            .unwrap();
        file.delete().unwrap();

        let next = file.read().unwrap().unwrap();
        assert_eq!(key_of(&next), "K3");
        assert!(file
            .find(Some(&KeyArgument::text("K2")), EqualityMode::Equal)
            .unwrap()
            .is_none());
        file.find_first().unwrap();
        assert_eq!(scan_keys(&mut file), vec!["K3"]);
    });
}

/// Delete with no current record fails and leaves the handle open.
#[test]
fn test_delete_without_current_record() {
    for_each_catalog(|catalog| {
        let mut file = KeyedFile::create_new(catalog, "HLQ.NOCUR", text_layout()).unwrap();
        file.write(&rec("K1", "v")).unwrap();

        let err = file.delete().unwrap_err();
        assert_eq!(err.code(), ErrorCode::DeleteFailed);
        assert!(file.is_open());

        // A failed find leaves no current record either
        file.find(Some(&KeyArgument::text("K9")), EqualityMode::Equal)
            .unwrap();
        assert_eq!(file.delete().unwrap_err().code(), ErrorCode::DeleteFailed);
    });
}

// =============================================================================
// Update
// =============================================================================

/// Update rewrites the record in place; key bytes are unchanged.
#[test]
fn test_update_preserves_key_bytes() {
    for_each_catalog(|catalog| {
        let layout = RecordLayout::build(vec![
            FieldDescriptor::hex("key", 4),
            FieldDescriptor::text("value", 8),
        ])
        .unwrap();
        let mut file =
            KeyedFile::create_new(Arc::clone(&catalog), "HLQ.UPDATE", layout.clone()).unwrap();

        let original = json!({"key": "0a0b0c0d", "value": "before"});
        file.write(original.as_object().unwrap()).unwrap();

        let key = KeyArgument::raw(&[0x0A, 0x0B, 0x0C, 0x0D], 4).unwrap();
        file.find(Some(&key), EqualityMode::Equal).unwrap().unwrap();

        let updated = json!({"key": "0a0b0c0d", "value": "after"});
        file.update(updated.as_object().unwrap()).unwrap();
        file.close().unwrap();

        let mut stream = catalog.open("HLQ.UPDATE").unwrap();
        let bytes = stream.read_next().unwrap().unwrap();
        assert_eq!(&bytes[..4], &[0x0A, 0x0B, 0x0C, 0x0D]);
        let decoded = layout.decode_record(&bytes).unwrap();
        assert_eq!(decoded["key"], "0a0b0c0d");
        assert_eq!(trim_padding(decoded["value"].as_str().unwrap()), "after");
        assert!(stream.read_next().unwrap().is_none());
    });
}

/// Update that would change the key fails; the stored record is untouched.
#[test]
fn test_update_rejects_key_change() {
    for_each_catalog(|catalog| {
        let mut file = KeyedFile::create_new(catalog, "HLQ.KEYCHG", text_layout()).unwrap();
        file.write(&rec("K1", "v1")).unwrap();
        file.find_first().unwrap();

        let err = file.update(&rec("K2", "v2")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::UpdateFailed);

        assert_eq!(scan_keys(&mut file), Vec::<String>::new());
        file.find_first().unwrap();
        let found = file
            .find(Some(&KeyArgument::text("K1")), EqualityMode::Equal)
            .unwrap()
            .unwrap();
        assert_eq!(value_of(&found), "v1");
    });
}

/// Update keeps the current record, so a second update applies too.
#[test]
fn test_repeated_update_of_current_record() {
    for_each_catalog(|catalog| {
        let mut file = KeyedFile::create_new(catalog, "HLQ.REUPD", text_layout()).unwrap();
        file.write(&rec("K1", "v1")).unwrap();
        file.find_first().unwrap();
        file.update(&rec("K1", "v2")).unwrap();
        file.update(&rec("K1", "v3")).unwrap();

        let found = file.find_first().unwrap().unwrap();
        assert_eq!(value_of(&found), "v3");
    });
}

// =============================================================================
// Field Types
// =============================================================================

/// Missing and non-string values are rejected before storage is touched.
#[test]
fn test_field_type_errors() {
    for_each_catalog(|catalog| {
        let mut file = KeyedFile::create_new(catalog, "HLQ.TYPES", text_layout()).unwrap();

        let missing = json!({"key": "K1"});
        let err = file.write(missing.as_object().unwrap()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::FieldType);

        let wrong = json!({"key": "K1", "value": true});
        let err = file.write(wrong.as_object().unwrap()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::FieldType);

        let err = file
            .find(None, EqualityMode::GreaterOrEqual)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::FieldType);

        assert!(file.find_first().unwrap().is_none());
        let snapshot = file.metrics().snapshot();
        assert_eq!(snapshot.failures, 3);
        assert_eq!(snapshot.writes, 0);
    });
}
