//! Observable dataset events
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events in the dataset lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,
    /// Schema loaded and layout computed
    SchemaLoaded,

    // Lifecycle
    /// Existing dataset opened
    DatasetOpened,
    /// New dataset allocated and opened
    DatasetCreated,
    /// Stream released
    DatasetClosed,
    /// Container removed
    DatasetDeallocated,
    /// Open rejected or failed
    OpenFailed,

    // Records
    /// A per-record operation completed
    OperationCompleted,
    /// A per-record operation failed
    OperationFailed,

    // Integrity
    /// Checksum or framing failure while replaying a container
    CorruptionDetected,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemaLoaded => "SCHEMA_LOADED",
            Event::DatasetOpened => "DATASET_OPENED",
            Event::DatasetCreated => "DATASET_CREATED",
            Event::DatasetClosed => "DATASET_CLOSED",
            Event::DatasetDeallocated => "DATASET_DEALLOCATED",
            Event::OpenFailed => "DATASET_OPEN_FAILED",
            Event::OperationCompleted => "OPERATION_COMPLETE",
            Event::OperationFailed => "OPERATION_FAILED",
            Event::CorruptionDetected => "CORRUPTION_DETECTED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::OperationCompleted => Severity::Trace,
            Event::OpenFailed | Event::OperationFailed => Severity::Warn,
            Event::CorruptionDetected => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::SchemaLoaded,
            Event::DatasetOpened,
            Event::DatasetCreated,
            Event::DatasetClosed,
            Event::DatasetDeallocated,
            Event::OpenFailed,
            Event::OperationCompleted,
            Event::OperationFailed,
            Event::CorruptionDetected,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_event_severity() {
        assert_eq!(Event::CorruptionDetected.severity(), Severity::Error);
        assert_eq!(Event::OperationFailed.severity(), Severity::Warn);
        assert_eq!(Event::DatasetOpened.severity(), Severity::Info);
        assert_eq!(Event::OperationCompleted.severity(), Severity::Trace);
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::DatasetClosed), "DATASET_CLOSED");
    }
}
