//! Field codec errors

use thiserror::Error;

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Field codec errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Value is not a sequence of hex digits
    #[error("invalid hex value: {0}")]
    InvalidHex(String),
}
