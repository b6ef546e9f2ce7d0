//! Prometheus metrics for the aggregation store
//!
//! Each aggregator owns its own `Registry` so independent instances (one per
//! test, say) never collide on metric names.

use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};

/// Counters maintained by a `WindowedAggregator`
#[derive(Clone)]
pub struct AggregatorMetrics {
    registry: Registry,
    accepted: IntCounter,
    rejected: IntCounter,
    purged: IntCounter,
    buckets: IntGauge,
}

impl AggregatorMetrics {
    /// Create and register all metrics on a fresh registry
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let accepted = IntCounter::new(
            "tx_stats_records_accepted_total",
            "Transactions merged into the window",
        )?;
        let rejected = IntCounter::new(
            "tx_stats_records_rejected_total",
            "Transactions dropped by the acceptance policy",
        )?;
        let purged = IntCounter::new(
            "tx_stats_buckets_purged_total",
            "Buckets removed after the retention horizon",
        )?;
        let buckets = IntGauge::new("tx_stats_buckets", "Live millisecond buckets")?;

        registry.register(Box::new(accepted.clone()))?;
        registry.register(Box::new(rejected.clone()))?;
        registry.register(Box::new(purged.clone()))?;
        registry.register(Box::new(buckets.clone()))?;

        Ok(Self {
            registry,
            accepted,
            rejected,
            purged,
            buckets,
        })
    }

    pub(crate) fn record_accepted(&self) {
        self.accepted.inc();
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.inc();
    }

    pub(crate) fn record_purged(&self, removed: usize) {
        self.purged.inc_by(u64::try_from(removed).unwrap_or(u64::MAX));
    }

    pub(crate) fn set_buckets(&self, live: usize) {
        self.buckets.set(i64::try_from(live).unwrap_or(i64::MAX));
    }

    /// Accepted transactions so far
    #[must_use]
    pub fn accepted(&self) -> u64 {
        self.accepted.get()
    }

    /// Rejected transactions so far
    #[must_use]
    pub fn rejected(&self) -> u64 {
        self.rejected.get()
    }

    /// Buckets purged so far
    #[must_use]
    pub fn purged(&self) -> u64 {
        self.purged.get()
    }

    /// Registry backing these metrics
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render in the Prometheus text exposition format
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
