//! On-disk container format
//!
//! ```text
//! +------------------+
//! | Magic "KSDS"     | 4 bytes
//! +------------------+
//! | Format Version   | (u16 LE)
//! +------------------+
//! | Reserved         | (u16, zero)
//! +------------------+
//! | Record Length    | (u32 LE)
//! +------------------+
//! | Key Length       | (u32 LE)
//! +------------------+
//! | Key Offset       | (u32 LE)
//! +------------------+
//! | Header Checksum  | (u32 LE)
//! +------------------+
//! | Entry ...        |
//! +------------------+
//! ```
//!
//! Each entry is `[op u8][payload][checksum u32 LE]` where op 1 (put) carries
//! a full record and op 2 (erase) carries a key. The checksum covers the op
//! byte and payload. Later entries supersede earlier ones.

use super::backend::ContainerSpec;
use super::checksum::{compute_checksum, verify_checksum};
use super::errors::{StoreError, StoreResult};

/// File magic
pub const MAGIC: &[u8; 4] = b"KSDS";
/// Current format version
pub const FORMAT_VERSION: u16 = 1;
/// Header size in bytes
pub const HEADER_LEN: usize = 24;

const OP_PUT: u8 = 1;
const OP_ERASE: u8 = 2;

/// One log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Store a full record under its key
    Put(Vec<u8>),
    /// Remove the record with this key
    Erase(Vec<u8>),
}

impl Entry {
    /// Serializes the entry with its checksum
    pub fn serialize(&self) -> Vec<u8> {
        let (op, payload) = match self {
            Entry::Put(record) => (OP_PUT, record),
            Entry::Erase(key) => (OP_ERASE, key),
        };
        let mut buf = Vec::with_capacity(1 + payload.len() + 4);
        buf.push(op);
        buf.extend_from_slice(payload);
        let checksum = compute_checksum(&buf);
        buf.extend_from_slice(&checksum.to_le_bytes());
        buf
    }

    /// Deserializes one entry starting at `data[0]`, located at `offset` in the file.
    ///
    /// Returns the entry and the number of bytes consumed.
    pub fn deserialize(data: &[u8], spec: &ContainerSpec, offset: u64) -> StoreResult<(Self, usize)> {
        let corrupt = |reason: String| StoreError::Corrupt { offset, reason };

        let op = *data
            .first()
            .ok_or_else(|| corrupt("Missing entry type".into()))?;
        let payload_len = match op {
            OP_PUT => spec.record_length,
            OP_ERASE => spec.key_length,
            other => return Err(corrupt(format!("Unknown entry type {}", other))),
        };

        let total = 1 + payload_len + 4;
        if data.len() < total {
            return Err(corrupt(format!(
                "Truncated entry: expected {} bytes, got {}",
                total,
                data.len()
            )));
        }

        let body = &data[..1 + payload_len];
        let stored = read_u32(&data[1 + payload_len..total]);
        if !verify_checksum(body, stored) {
            return Err(corrupt(format!(
                "Checksum mismatch: computed {:08x}, stored {:08x}",
                compute_checksum(body),
                stored
            )));
        }

        let payload = body[1..].to_vec();
        let entry = if op == OP_PUT {
            Entry::Put(payload)
        } else {
            Entry::Erase(payload)
        };
        Ok((entry, total))
    }
}

/// Serializes the container header
pub fn serialize_header(spec: &ContainerSpec) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN);
    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf.extend_from_slice(&0u16.to_le_bytes());
    buf.extend_from_slice(&(spec.record_length as u32).to_le_bytes());
    buf.extend_from_slice(&(spec.key_length as u32).to_le_bytes());
    buf.extend_from_slice(&(spec.key_offset as u32).to_le_bytes());
    let checksum = compute_checksum(&buf);
    buf.extend_from_slice(&checksum.to_le_bytes());
    buf
}

/// Parses and verifies the container header
pub fn deserialize_header(data: &[u8]) -> StoreResult<ContainerSpec> {
    let corrupt = |reason: String| StoreError::Corrupt { offset: 0, reason };

    if data.len() < HEADER_LEN {
        return Err(corrupt(format!(
            "Header too short: {} bytes",
            data.len()
        )));
    }
    if &data[..4] != MAGIC {
        return Err(corrupt("Bad magic".into()));
    }

    let stored = read_u32(&data[20..24]);
    if !verify_checksum(&data[..20], stored) {
        return Err(corrupt(format!(
            "Header checksum mismatch: computed {:08x}, stored {:08x}",
            compute_checksum(&data[..20]),
            stored
        )));
    }

    let version = u16::from_le_bytes([data[4], data[5]]);
    if version != FORMAT_VERSION {
        return Err(corrupt(format!("Unsupported format version {}", version)));
    }

    let spec = ContainerSpec {
        record_length: read_u32(&data[8..12]) as usize,
        key_length: read_u32(&data[12..16]) as usize,
        key_offset: read_u32(&data[16..20]) as usize,
    };
    if !spec.is_valid() {
        return Err(corrupt(format!("Invalid geometry {:?}", spec)));
    }
    Ok(spec)
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
