//! Keyed container store errors

use std::io;

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors reported by a catalog or an open stream
#[derive(Debug, Error)]
pub enum StoreError {
    // Catalog errors
    #[error("Container not found: {0}")]
    NotFound(String),

    #[error("Container already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid container name: {0}")]
    InvalidName(String),

    #[error("Invalid container geometry: {0}")]
    InvalidSpec(String),

    // Record errors
    #[error("Duplicate key")]
    DuplicateKey,

    #[error("No current record")]
    NoCurrentRecord,

    #[error("Record is {actual} bytes, container holds {expected}")]
    RecordLength { expected: usize, actual: usize },

    #[error("Key may not change on update")]
    KeyChanged,

    // Integrity
    #[error("Corrupt container at byte {offset}: {reason}")]
    Corrupt { offset: u64, reason: String },

    #[error("Internal error: {0}")]
    Internal(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            StoreError::NotFound("HLQ.A".into()).to_string(),
            "Container not found: HLQ.A"
        );
        assert_eq!(
            StoreError::RecordLength { expected: 10, actual: 4 }.to_string(),
            "Record is 4 bytes, container holds 10"
        );
    }

    #[test]
    fn test_from_io() {
        let err: StoreError = io::Error::new(io::ErrorKind::Other, "boom").into();
        assert!(matches!(err, StoreError::Io(_)));
    }
}
