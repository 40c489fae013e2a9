//! Dataset error types
//!
//! Error codes:
//! - KEYFILE_SCHEMA_INVALID (REJECT)
//! - KEYFILE_DATASET_NOT_FOUND (REJECT)
//! - KEYFILE_DATASET_EXISTS (REJECT)
//! - KEYFILE_FORMAT_MISMATCH (REJECT)
//! - KEYFILE_PROVISIONING_FAILED (ERROR)
//! - KEYFILE_NOT_OPEN / KEYFILE_STILL_OPEN (REJECT)
//! - KEYFILE_FIELD_TYPE (REJECT)
//! - KEYFILE_READ_FAILED / WRITE_FAILED / UPDATE_FAILED / DELETE_FAILED (ERROR)
//! - KEYFILE_OPEN_FAILED / CLOSE_FAILED / DEALLOCATE_FAILED (ERROR)
//! - KEYFILE_CANCELLED (ERROR)

use std::error::Error as StdError;
use std::fmt;

/// Severity levels for dataset errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Caller misuse; the request is rejected and nothing changed
    Reject,
    /// The underlying storage failed the operation
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Dataset error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Malformed field descriptor or schema document
    SchemaInvalid,
    /// Open of a dataset that does not exist
    DatasetNotFound,
    /// Create of a dataset that already exists
    DatasetExists,
    /// Container metadata disagrees with the declared layout
    FormatMismatch,
    /// Container allocation failed
    ProvisioningFailed,
    /// Operation on a closed handle
    NotOpen,
    /// Deallocate on an open handle
    StillOpen,
    /// Record value missing or of the wrong shape
    FieldType,
    /// Storage failure while reading or locating
    ReadFailed,
    /// Storage did not accept the full record
    WriteFailed,
    /// Storage rejected the rewrite of the current record
    UpdateFailed,
    /// Storage rejected the delete of the current record
    DeleteFailed,
    /// Dataset could not be opened (bad name, corruption, I/O)
    OpenFailed,
    /// Stream could not be released cleanly
    CloseFailed,
    /// Container could not be removed
    DeallocateFailed,
    /// Unit of work dropped before it ran
    Cancelled,
}

impl ErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::SchemaInvalid => "KEYFILE_SCHEMA_INVALID",
            ErrorCode::DatasetNotFound => "KEYFILE_DATASET_NOT_FOUND",
            ErrorCode::DatasetExists => "KEYFILE_DATASET_EXISTS",
            ErrorCode::FormatMismatch => "KEYFILE_FORMAT_MISMATCH",
            ErrorCode::ProvisioningFailed => "KEYFILE_PROVISIONING_FAILED",
            ErrorCode::NotOpen => "KEYFILE_NOT_OPEN",
            ErrorCode::StillOpen => "KEYFILE_STILL_OPEN",
            ErrorCode::FieldType => "KEYFILE_FIELD_TYPE",
            ErrorCode::ReadFailed => "KEYFILE_READ_FAILED",
            ErrorCode::WriteFailed => "KEYFILE_WRITE_FAILED",
            ErrorCode::UpdateFailed => "KEYFILE_UPDATE_FAILED",
            ErrorCode::DeleteFailed => "KEYFILE_DELETE_FAILED",
            ErrorCode::OpenFailed => "KEYFILE_OPEN_FAILED",
            ErrorCode::CloseFailed => "KEYFILE_CLOSE_FAILED",
            ErrorCode::DeallocateFailed => "KEYFILE_DEALLOCATE_FAILED",
            ErrorCode::Cancelled => "KEYFILE_CANCELLED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            ErrorCode::SchemaInvalid
            | ErrorCode::DatasetNotFound
            | ErrorCode::DatasetExists
            | ErrorCode::FormatMismatch
            | ErrorCode::NotOpen
            | ErrorCode::StillOpen
            | ErrorCode::FieldType => Severity::Reject,
            ErrorCode::ProvisioningFailed
            | ErrorCode::ReadFailed
            | ErrorCode::WriteFailed
            | ErrorCode::UpdateFailed
            | ErrorCode::DeleteFailed
            | ErrorCode::OpenFailed
            | ErrorCode::CloseFailed
            | ErrorCode::DeallocateFailed
            | ErrorCode::Cancelled => Severity::Error,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

type BoxedSource = Box<dyn StdError + Send + Sync + 'static>;

/// Dataset error with code, message, optional details and underlying cause
#[derive(Debug)]
pub struct DatasetError {
    /// Error code
    code: ErrorCode,
    /// Human-readable message
    message: String,
    /// Optional details about the error context
    details: Option<String>,
    /// Underlying storage error if applicable
    source: Option<BoxedSource>,
}

impl DatasetError {
    /// Create an error with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Attach context details
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Attach the underlying cause
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Malformed schema or field descriptor
    pub fn schema(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SchemaInvalid, message)
    }

    /// Dataset absent on open
    pub fn not_found(path: &str) -> Self {
        Self::new(ErrorCode::DatasetNotFound, "Dataset does not exist")
            .with_details(format!("dataset: {}", path))
    }

    /// Dataset present on create
    pub fn already_exists(path: &str) -> Self {
        Self::new(ErrorCode::DatasetExists, "Dataset already exists")
            .with_details(format!("dataset: {}", path))
    }

    /// Container metadata disagrees with the layout
    pub fn format(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::FormatMismatch, message)
    }

    /// Container allocation failure
    pub fn provisioning(path: &str) -> Self {
        Self::new(ErrorCode::ProvisioningFailed, "Failed to allocate dataset")
            .with_details(format!("dataset: {}", path))
    }

    /// Operation on a closed handle
    pub fn not_open() -> Self {
        Self::new(ErrorCode::NotOpen, "Dataset is not open")
    }

    /// Deallocate on an open handle
    pub fn still_open() -> Self {
        Self::new(ErrorCode::StillOpen, "Cannot deallocate an open dataset")
    }

    /// Record value missing or wrongly shaped
    pub fn field_type(field: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::FieldType, message).with_details(format!("field: {}", field))
    }

    /// Read or locate failed in storage
    pub fn read_failed() -> Self {
        Self::new(ErrorCode::ReadFailed, "Failed to read")
    }

    /// Write not accepted in full
    pub fn write_failed() -> Self {
        Self::new(ErrorCode::WriteFailed, "Failed to write")
    }

    /// Update rejected
    pub fn update_failed() -> Self {
        Self::new(ErrorCode::UpdateFailed, "Failed to update")
    }

    /// Delete rejected
    pub fn delete_failed() -> Self {
        Self::new(ErrorCode::DeleteFailed, "Failed to delete")
    }

    /// Open failed for a reason other than absence or format
    pub fn open_failed(path: &str) -> Self {
        Self::new(ErrorCode::OpenFailed, "Failed to open dataset")
            .with_details(format!("dataset: {}", path))
    }

    /// Stream release failed
    pub fn close_failed() -> Self {
        Self::new(ErrorCode::CloseFailed, "Error closing dataset")
    }

    /// Container removal failed
    pub fn deallocate_failed(path: &str) -> Self {
        Self::new(ErrorCode::DeallocateFailed, "Couldn't deallocate dataset")
            .with_details(format!("dataset: {}", path))
    }

    /// Unit of work dropped before it produced a completion
    pub fn cancelled() -> Self {
        Self::new(ErrorCode::Cancelled, "Operation cancelled before it ran")
    }

    /// Returns the error code
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        if let Some(ref source) = self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl StdError for DatasetError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

/// Result type for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;
