//! Observability subsystem
//!
//! - Structured logging (JSON lines on stderr)
//! - Typed lifecycle events
//! - Per-handle operation counters
//!
//! Observability is read-only: it never changes the outcome of an
//! operation and never fails the caller.
//!
//! ```ignore
//! use keyfile::observability::{log_event_with_fields, Event, Logger, Severity};
//!
//! Logger::set_min_severity(Severity::Warn);
//! log_event_with_fields(Event::DatasetOpened, &[("dataset", "HLQ.DATA")]);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log a lifecycle event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
