//! Metrics collection for observability
//!
//! Each engine owns its own Prometheus registry, so several engines can
//! live in one process (tests do this constantly).
//!
//! # Metrics
//!
//! - `stay_ledger_records_submitted_total` - Records accepted into the pending queue
//! - `stay_ledger_records_mined_total` - Records appended to the chain
//! - `stay_ledger_pending_records` - Current pending queue depth
//! - `stay_ledger_validation_failures_total` - Validation passes that found tampering
//! - `stay_ledger_mining_latency_seconds` - Submission-to-append latency

use prometheus::{Histogram, HistogramOpts, IntCounter, IntGauge, Registry};
use std::fmt;
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Records submitted
    pub records_submitted: IntCounter,

    /// Records mined
    pub records_mined: IntCounter,

    /// Pending queue depth
    pub pending_records: IntGauge,

    /// Failed validation passes
    pub validation_failures: IntCounter,

    /// Mining latency histogram
    pub mining_latency: Histogram,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let records_submitted = IntCounter::new(
            "stay_ledger_records_submitted_total",
            "Records accepted into the pending queue",
        )?;
        registry.register(Box::new(records_submitted.clone()))?;

        let records_mined = IntCounter::new(
            "stay_ledger_records_mined_total",
            "Records appended to the chain",
        )?;
        registry.register(Box::new(records_mined.clone()))?;

        let pending_records =
            IntGauge::new("stay_ledger_pending_records", "Current pending queue depth")?;
        registry.register(Box::new(pending_records.clone()))?;

        let validation_failures = IntCounter::new(
            "stay_ledger_validation_failures_total",
            "Validation passes that found a broken link or hash",
        )?;
        registry.register(Box::new(validation_failures.clone()))?;

        let mining_latency = Histogram::with_opts(
            HistogramOpts::new(
                "stay_ledger_mining_latency_seconds",
                "Submission-to-append latency",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0]),
        )?;
        registry.register(Box::new(mining_latency.clone()))?;

        Ok(Self {
            records_submitted,
            records_mined,
            pending_records,
            validation_failures,
            mining_latency,
            registry,
        })
    }

    /// Record a submission
    pub fn record_submitted(&self) {
        self.records_submitted.inc();
        self.pending_records.inc();
    }

    /// Record a mined record and its latency
    pub fn record_mined(&self, latency_seconds: f64) {
        self.records_mined.inc();
        self.pending_records.dec();
        self.mining_latency.observe(latency_seconds);
    }

    /// Record a validation pass
    pub fn record_validation(&self, valid: bool) {
        if !valid {
            self.validation_failures.inc();
        }
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl fmt::Debug for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metrics")
            .field("records_submitted", &self.records_submitted.get())
            .field("records_mined", &self.records_mined.get())
            .field("pending_records", &self.pending_records.get())
            .finish()
    }
}
