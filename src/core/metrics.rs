//! Dispatch metrics for observability
//!
//! Failures inside adapters and filter predicates never reach the caller;
//! these counters are where they remain visible.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one logging session
///
/// # Example
///
/// ```
/// use context_event_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
/// metrics.record_logged();
/// metrics.record_delivered();
/// metrics.record_adapter_failure();
///
/// assert_eq!(metrics.events_logged(), 1);
/// assert_eq!(metrics.failure_rate(), 50.0);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Events accepted by `log_event`
    events_logged: AtomicU64,

    /// Adapter invocations that returned `Ok`
    events_delivered: AtomicU64,

    /// Adapter invocations that returned an error or panicked
    adapter_failures: AtomicU64,

    /// Filter predicates that panicked
    filter_failures: AtomicU64,

    /// Events appended while a flush was already running
    reentrant_events: AtomicU64,

    /// Events forwarded to an external logger
    bypassed_events: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            events_logged: AtomicU64::new(0),
            events_delivered: AtomicU64::new(0),
            adapter_failures: AtomicU64::new(0),
            filter_failures: AtomicU64::new(0),
            reentrant_events: AtomicU64::new(0),
            bypassed_events: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn events_logged(&self) -> u64 {
        self.events_logged.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn events_delivered(&self) -> u64 {
        self.events_delivered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn adapter_failures(&self) -> u64 {
        self.adapter_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn filter_failures(&self) -> u64 {
        self.filter_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn reentrant_events(&self) -> u64 {
        self.reentrant_events.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn bypassed_events(&self) -> u64 {
        self.bypassed_events.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_logged(&self) -> u64 {
        self.events_logged.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_delivered(&self) -> u64 {
        self.events_delivered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_adapter_failure(&self) -> u64 {
        self.adapter_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_filter_failures(&self, count: u64) -> u64 {
        self.filter_failures.fetch_add(count, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_reentrant(&self) -> u64 {
        self.reentrant_events.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_bypassed(&self) -> u64 {
        self.bypassed_events.fetch_add(1, Ordering::Relaxed)
    }

    /// Share of adapter invocations that failed, as a percentage
    ///
    /// Returns 0.0 if no adapter has been invoked.
    pub fn failure_rate(&self) -> f64 {
        let failed = self.adapter_failures() as f64;
        let total = self.events_delivered() as f64 + failed;
        if total == 0.0 {
            0.0
        } else {
            (failed / total) * 100.0
        }
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.events_logged.store(0, Ordering::Relaxed);
        self.events_delivered.store(0, Ordering::Relaxed);
        self.adapter_failures.store(0, Ordering::Relaxed);
        self.filter_failures.store(0, Ordering::Relaxed);
        self.reentrant_events.store(0, Ordering::Relaxed);
        self.bypassed_events.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current values
    fn clone(&self) -> Self {
        Self {
            events_logged: AtomicU64::new(self.events_logged()),
            events_delivered: AtomicU64::new(self.events_delivered()),
            adapter_failures: AtomicU64::new(self.adapter_failures()),
            filter_failures: AtomicU64::new(self.filter_failures()),
            reentrant_events: AtomicU64::new(self.reentrant_events()),
            bypassed_events: AtomicU64::new(self.bypassed_events()),
        }
    }
}
