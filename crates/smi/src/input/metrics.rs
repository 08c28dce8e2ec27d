//! Extraction metrics sink.
//!
//! The extractor reports what it did through an [`ExtractionMetrics`] handed to
//! it by the caller. There is no process-wide metric registry.

use std::sync::Mutex;
use std::time::Duration;

/// Receives extraction counters and timings.
pub trait ExtractionMetrics: Send + Sync {
    /// An extraction finished and produced `rows` data rows.
    fn record_success(&self, rows: usize);

    /// An extraction failed.
    fn record_failure(&self);

    /// Wall-clock time spent in one extraction attempt.
    fn record_duration(&self, elapsed: Duration);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl ExtractionMetrics for NoopMetrics {
    fn record_success(&self, _rows: usize) {}

    fn record_failure(&self) {}

    fn record_duration(&self, _elapsed: Duration) {}
}

/// Snapshot of the counters held by [`InMemoryMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub successes: u64,
    pub failures: u64,
    pub records_extracted: u64,
    pub durations: Vec<Duration>,
}

/// Keeps counters in memory; used by tests and by the CLI summary.
#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    inner: Mutex<MetricsSnapshot>,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        match self.inner.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn update(&self, f: impl FnOnce(&mut MetricsSnapshot)) {
        match self.inner.lock() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

impl ExtractionMetrics for InMemoryMetrics {
    fn record_success(&self, rows: usize) {
        self.update(|m| {
            m.successes += 1;
            m.records_extracted += rows as u64;
        });
    }

    fn record_failure(&self) {
        self.update(|m| m.failures += 1);
    }

    fn record_duration(&self, elapsed: Duration) {
        self.update(|m| m.durations.push(elapsed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_metrics_accumulate() {
        let metrics = InMemoryMetrics::new();
        metrics.record_success(10);
        metrics.record_success(5);
        metrics.record_failure();
        metrics.record_duration(Duration::from_millis(3));

        let snap = metrics.snapshot();
        assert_eq!(snap.successes, 2);
        assert_eq!(snap.failures, 1);
        assert_eq!(snap.records_extracted, 15);
        assert_eq!(snap.durations.len(), 1);
    }
}
