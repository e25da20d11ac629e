// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Statistics-collecting wrapper for storage backends.
//
// Wraps any `Backend` and transparently counts operations, byte transfer
// totals, and cumulative latencies. Because it is itself a `Backend`, it
// sits anywhere in a candidate list and is invisible to the liveness probe
// and the facade alike.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;

use crate::backend::Backend;
use crate::error::BackendError;

/// Accumulated statistics for a storage backend.
///
/// All counters are monotonically increasing for the lifetime of the
/// [`ObservedBackend`] that owns them (until [`ObservedBackend::reset_stats`]).
#[derive(Debug, Clone, Default)]
pub struct BackendStats {
    /// Number of `read` operations performed.
    pub read_count: u64,
    /// Number of `write` operations performed (one per call, not per entry).
    pub write_count: u64,
    /// Number of entries written across all `write` calls.
    pub entries_written: u64,
    /// Number of `remove` operations performed.
    pub remove_count: u64,
    /// Number of `each` iterations performed.
    pub each_count: u64,
    /// Number of `clear_all` operations performed.
    pub clear_count: u64,
    /// Cumulative wall-clock latency of all `read` calls, in milliseconds.
    pub read_latency_sum_ms: f64,
    /// Cumulative wall-clock latency of all `write` calls, in milliseconds.
    pub write_latency_sum_ms: f64,
    /// Total bytes of values read back across `read` and `each`.
    pub total_bytes_read: u64,
    /// Total bytes of values written across all `write` calls.
    pub total_bytes_written: u64,
}

/// A storage backend wrapper that collects operation metrics.
///
/// Delegates every operation to an inner backend while measuring wall-clock
/// latency and counting invocations. Statistics are available via
/// [`ObservedBackend::stats`].
///
/// # Example
///
/// ```rust
/// use strata_store::memory::MemoryBackend;
/// use strata_store::observe::ObservedBackend;
/// use strata_store::backend::Backend;
///
/// let observed = ObservedBackend::new(MemoryBackend::new());
/// observed.write(&[("key", "value")]).unwrap();
/// observed.read("key").unwrap();
///
/// let stats = observed.stats();
/// assert_eq!(stats.write_count, 1);
/// assert_eq!(stats.read_count, 1);
/// ```
pub struct ObservedBackend<B: Backend> {
    /// The wrapped backend that performs the actual storage operations.
    inner: B,
    /// Shared, mutable statistics accumulator.
    stats: Arc<RwLock<BackendStats>>,
}

impl<B: Backend> ObservedBackend<B> {
    /// Wrap `inner` with statistics collection.
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            stats: Arc::new(RwLock::new(BackendStats::default())),
        }
    }

    /// Return a snapshot of the current statistics.
    pub fn stats(&self) -> BackendStats {
        self.stats.read().clone()
    }

    /// Reset all statistics to zero.
    pub fn reset_stats(&self) {
        *self.stats.write() = BackendStats::default();
    }

    /// Return a reference to the inner backend.
    pub fn inner(&self) -> &B {
        &self.inner
    }
}

impl<B: Backend> Backend for ObservedBackend<B> {
    fn write(&self, entries: &[(&str, &str)]) -> Result<(), BackendError> {
        let start = Instant::now();
        let result = self.inner.write(entries);
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        let mut s = self.stats.write();
        s.write_count += 1;
        s.entries_written += entries.len() as u64;
        s.write_latency_sum_ms += elapsed_ms;
        if result.is_ok() {
            s.total_bytes_written += entries.iter().map(|(_, v)| v.len() as u64).sum::<u64>();
        }

        result
    }

    fn read(&self, key: &str) -> Result<Option<String>, BackendError> {
        let start = Instant::now();
        let result = self.inner.read(key);
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        let mut s = self.stats.write();
        s.read_count += 1;
        s.read_latency_sum_ms += elapsed_ms;
        if let Ok(Some(ref val)) = result {
            s.total_bytes_read += val.len() as u64;
        }

        result
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        self.stats.write().remove_count += 1;
        self.inner.remove(key)
    }

    fn each(&self, visit: &mut dyn FnMut(&str, &str)) -> Result<(), BackendError> {
        let mut bytes = 0u64;
        let result = self.inner.each(&mut |k, v| {
            bytes += (k.len() + v.len()) as u64;
            visit(k, v);
        });

        let mut s = self.stats.write();
        s.each_count += 1;
        s.total_bytes_read += bytes;

        result
    }

    fn clear_all(&self) -> Result<(), BackendError> {
        self.stats.write().clear_count += 1;
        self.inner.clear_all()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;

    #[test]
    fn test_read_increments_count() {
        let observed = ObservedBackend::new(MemoryBackend::new());

        observed.write(&[("k", "v")]).unwrap();
        observed.read("k").unwrap();
        observed.read("k").unwrap();
        observed.read("missing").unwrap();

        let stats = observed.stats();
        assert_eq!(stats.read_count, 3);
        assert_eq!(stats.write_count, 1);
        // Only found values count toward bytes read: 2 * "v".
        assert_eq!(stats.total_bytes_read, 2);
    }

    #[test]
    fn test_write_counts_entries_and_bytes() {
        let observed = ObservedBackend::new(MemoryBackend::new());

        observed.write(&[("a", "hello"), ("b", "world!")]).unwrap();

        let stats = observed.stats();
        assert_eq!(stats.write_count, 1);
        assert_eq!(stats.entries_written, 2);
        // 5 + 6 value bytes.
        assert_eq!(stats.total_bytes_written, 11);
    }

    #[test]
    fn test_remove_and_clear_increment_counts() {
        let observed = ObservedBackend::new(MemoryBackend::new());

        observed.write(&[("k", "v")]).unwrap();
        observed.remove("k").unwrap();
        observed.remove("nope").unwrap();
        observed.clear_all().unwrap();

        let stats = observed.stats();
        assert_eq!(stats.remove_count, 2);
        assert_eq!(stats.clear_count, 1);
    }

    #[test]
    fn test_each_counts_bytes() {
        let observed = ObservedBackend::new(MemoryBackend::new());

        observed.write(&[("pfx:a", "11"), ("pfx:b", "22")]).unwrap();

        let mut visited = 0;
        observed.each(&mut |_, _| visited += 1).unwrap();
        assert_eq!(visited, 2);

        let stats = observed.stats();
        assert_eq!(stats.each_count, 1);
        // 2 * (5 key bytes + 2 value bytes).
        assert_eq!(stats.total_bytes_read, 14);
    }

    #[test]
    fn test_latency_is_recorded() {
        let observed = ObservedBackend::new(MemoryBackend::new());

        observed.write(&[("k", "v")]).unwrap();
        observed.read("k").unwrap();

        let stats = observed.stats();
        assert!(stats.read_latency_sum_ms >= 0.0);
        assert!(stats.write_latency_sum_ms >= 0.0);
    }

    #[test]
    fn test_reset_stats() {
        let observed = ObservedBackend::new(MemoryBackend::new());

        observed.write(&[("a", "1")]).unwrap();
        observed.read("a").unwrap();
        assert_eq!(observed.stats().read_count, 1);

        observed.reset_stats();

        let after = observed.stats();
        assert_eq!(after.read_count, 0);
        assert_eq!(after.write_count, 0);
        assert_eq!(after.total_bytes_read, 0);
        assert_eq!(after.total_bytes_written, 0);
    }

    #[test]
    fn test_name_delegates_to_inner() {
        let observed = ObservedBackend::new(MemoryBackend::new());
        assert_eq!(observed.name(), "memory");
    }
}
