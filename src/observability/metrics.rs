//! Operation counters
//!
//! - Counters only, monotonic
//! - Thread-safe, lock-free

use std::sync::atomic::{AtomicU64, Ordering};

/// Per-handle operation counters
///
/// All counters use `Relaxed` atomics; values are exact once the
/// operations being counted have completed.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Sequential reads
    reads: AtomicU64,
    /// Locate-then-read operations
    finds: AtomicU64,
    /// Reads or finds that returned a record
    hits: AtomicU64,
    /// Reads or finds that returned no record
    misses: AtomicU64,
    /// Records inserted
    writes: AtomicU64,
    /// Records rewritten
    updates: AtomicU64,
    /// Records deleted
    deletes: AtomicU64,
    /// Per-record operations that failed
    failures: AtomicU64,
    /// Bytes accepted by the container
    bytes_written: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment sequential reads
    pub fn increment_reads(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment finds
    pub fn increment_finds(&self) {
        self.finds.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of a read or find
    pub fn record_lookup(&self, found: bool) {
        if found {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Increment writes and add the accepted bytes
    pub fn record_write(&self, bytes: u64) {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Increment updates and add the rewritten bytes
    pub fn record_update(&self, bytes: u64) {
        self.updates.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Increment deletes
    pub fn increment_deletes(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment failures
    pub fn increment_failures(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all counters as JSON
    pub fn to_json(&self) -> String {
        let s = self.snapshot();
        format!(
            r#"{{"reads":{},"finds":{},"hits":{},"misses":{},"writes":{},"updates":{},"deletes":{},"failures":{},"bytes_written":{}}}"#,
            s.reads, s.finds, s.hits, s.misses, s.writes, s.updates, s.deletes, s.failures, s.bytes_written,
        )
    }

    /// Get all counters as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            reads: self.reads.load(Ordering::Relaxed),
            finds: self.finds.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub reads: u64,
    pub finds: u64,
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
    pub updates: u64,
    pub deletes: u64,
    pub failures: u64,
    pub bytes_written: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_zero_values() {
        assert_eq!(MetricsRegistry::new().snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_lookup_outcomes() {
        let registry = MetricsRegistry::new();
        registry.increment_reads();
        registry.increment_finds();
        registry.record_lookup(true);
        registry.record_lookup(false);
        registry.record_lookup(false);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.reads, 1);
        assert_eq!(snapshot.finds, 1);
        assert_eq!(snapshot.hits, 1);
        assert_eq!(snapshot.misses, 2);
    }

    #[test]
    fn test_bytes_written() {
        let registry = MetricsRegistry::new();
        registry.record_write(20);
        registry.record_update(20);
        assert_eq!(registry.snapshot().bytes_written, 40);
        assert_eq!(registry.snapshot().writes, 1);
        assert_eq!(registry.snapshot().updates, 1);
    }

    #[test]
    fn test_to_json() {
        let registry = MetricsRegistry::new();
        registry.increment_deletes();
        registry.increment_failures();

        let parsed: serde_json::Value = serde_json::from_str(&registry.to_json()).unwrap();
        assert_eq!(parsed["deletes"], 1);
        assert_eq!(parsed["failures"], 1);
        assert_eq!(parsed["writes"], 0);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..100 {
                        reg.increment_reads();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.snapshot().reads, 800);
    }
}
