//! JSON-lines logger for dataset events
//!
//! A line is an object: `event`, then `severity`, then the caller's fields
//! sorted by key. Lines go to stderr; stdout belongs to CLI responses.
//! Events below the configured minimum severity are dropped.

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU8, Ordering};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Completed record operations
    Trace = 0,
    /// Dataset opened, created, closed or removed
    Info = 1,
    /// A record operation failed; the handle stays usable
    Warn = 2,
    /// Stored data could not be trusted
    Error = 3,
    /// The process cannot continue
    Fatal = 4,
}

impl Severity {
    /// Upper-case name written to the `severity` key
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }

    /// Parses a configured level name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "trace" => Some(Severity::Trace),
            "info" => Some(Severity::Info),
            "warn" | "warning" => Some(Severity::Warn),
            "error" => Some(Severity::Error),
            "fatal" => Some(Severity::Fatal),
            _ => None,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Severity::Trace,
            1 => Severity::Info,
            2 => Severity::Warn,
            3 => Severity::Error,
            _ => Severity::Fatal,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

static MIN_SEVERITY: AtomicU8 = AtomicU8::new(Severity::Info as u8);

/// Process-wide event logger
pub struct Logger;

impl Logger {
    /// Sets the process-wide minimum severity. Lower events are dropped.
    pub fn set_min_severity(severity: Severity) {
        MIN_SEVERITY.store(severity as u8, Ordering::Relaxed);
    }

    /// Current minimum severity
    pub fn min_severity() -> Severity {
        Severity::from_u8(MIN_SEVERITY.load(Ordering::Relaxed))
    }

    /// Whether events of this severity are emitted
    pub fn enabled(severity: Severity) -> bool {
        severity >= Self::min_severity()
    }

    /// Writes one event line to stderr if its severity is enabled.
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if Self::enabled(severity) {
            Self::emit(severity, event, fields, &mut io::stderr());
        }
    }

    fn emit<W: Write>(severity: Severity, event: &str, fields: &[(&str, &str)], out: &mut W) {
        let line = render_line(severity, event, fields);
        // Write errors are ignored: an unwritable stderr must not fail a dataset operation.
        let _ = out.write_all(line.as_bytes());
        let _ = out.flush();
    }
}

fn render_line(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    let mut pairs: Vec<(&str, &str)> = Vec::with_capacity(fields.len() + 2);
    pairs.push(("event", event));
    pairs.push(("severity", severity.as_str()));

    let mut sorted = fields.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    pairs.extend(sorted);

    let body: Vec<String> = pairs
        .iter()
        .map(|(key, value)| format!("{}:{}", quoted(key), quoted(value)))
        .collect();
    format!("{{{}}}\n", body.join(","))
}

fn quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Capture a log line for testing
#[cfg(test)]
pub fn capture_log(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    let mut buffer = Vec::new();
    Logger::emit(severity, event, fields, &mut buffer);
    String::from_utf8(buffer).unwrap()
}
