//! Windowed aggregation store
//!
//! Buckets are keyed by epoch milliseconds in a lock-free skip list. Every
//! bucket carries its own mutex, so merges into one millisecond serialize
//! while different milliseconds never contend. Range scans walk the skip list
//! without blocking writers and observe a weakly consistent snapshot.
//!
//! Cleanup retires a bucket under its lock before unlinking it. A merge that
//! lands on a retired bucket retries, which recreates the key instead of
//! writing into a node that is about to disappear.

use crate::aggregators::bucket::Bucket;
use crate::clock::{Clock, SystemClock};
use crate::config::WindowConfig;
use crate::error::TxStatsError;
use crate::metrics::AggregatorMetrics;
use crate::statistics::Statistics;
use chrono::{DateTime, Utc};
use crossbeam_skiplist::SkipMap;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use services_common::{ServiceError, money};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Why a transaction was kept out of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Observed after the current clock reading
    Future,
    /// Observed before the start of the acceptance window
    Stale,
    /// Below zero
    NegativeAmount,
    /// Does not fit in `i64` minor units
    Overflow,
}

/// Result of a `record` call
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Merged into its bucket
    Accepted,
    /// Dropped and logged
    Rejected(RejectReason),
}

impl RecordOutcome {
    /// Whether the transaction was merged
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

#[derive(Debug)]
struct Slot {
    bucket: Bucket,
    retired: bool,
}

impl Slot {
    const fn vacant(timestamp_ms: i64) -> Self {
        Self {
            bucket: Bucket::empty(timestamp_ms),
            retired: false,
        }
    }
}

/// Concurrent rolling aggregate over a trailing time window
pub struct WindowedAggregator {
    buckets: SkipMap<i64, Mutex<Slot>>,
    config: WindowConfig,
    clock: Arc<dyn Clock>,
    metrics: AggregatorMetrics,
}

impl WindowedAggregator {
    /// Create an aggregator driven by the wall clock
    pub fn new(config: WindowConfig) -> Result<Self, TxStatsError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create an aggregator with an injected clock
    pub fn with_clock(config: WindowConfig, clock: Arc<dyn Clock>) -> Result<Self, TxStatsError> {
        config.validate()?;
        Ok(Self {
            buckets: SkipMap::new(),
            config,
            clock,
            metrics: AggregatorMetrics::new()?,
        })
    }

    /// Record a transaction observed at `observed_at`
    ///
    /// Transactions outside `[now - seconds_to_buffer, now]` are dropped and
    /// logged. Every call ends with an opportunistic cleanup.
    pub fn record(&self, observed_at: DateTime<Utc>, amount: Decimal) -> RecordOutcome {
        self.record_at(observed_at, amount, self.clock.now())
    }

    /// Record a transaction observed at the current clock reading
    pub fn record_now(&self, amount: Decimal) -> RecordOutcome {
        let now = self.clock.now();
        self.record_at(now, amount, now)
    }

    fn record_at(
        &self,
        observed_at: DateTime<Utc>,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> RecordOutcome {
        let outcome = match self.admit(observed_at, amount, now) {
            Ok(incoming) => {
                self.merge(incoming);
                self.metrics.record_accepted();
                RecordOutcome::Accepted
            }
            Err(reason) => {
                warn!(
                    observed_at = %observed_at,
                    now = %now,
                    %amount,
                    ?reason,
                    "Skipped transaction"
                );
                self.metrics.record_rejected();
                RecordOutcome::Rejected(reason)
            }
        };

        self.cleanup(now);
        self.metrics.set_buckets(self.buckets.len());
        outcome
    }

    fn admit(
        &self,
        observed_at: DateTime<Utc>,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Bucket, RejectReason> {
        if observed_at > now {
            return Err(RejectReason::Future);
        }
        if observed_at < now - self.config.buffer() {
            return Err(RejectReason::Stale);
        }

        let amount_minor = money::to_minor_units(amount).map_err(|err| match err {
            ServiceError::NegativeAmount(_) => RejectReason::NegativeAmount,
            _ => RejectReason::Overflow,
        })?;

        Ok(Bucket::single(observed_at.timestamp_millis(), amount_minor))
    }

    fn merge(&self, incoming: Bucket) {
        let key = incoming.timestamp_ms;
        loop {
            let entry = self
                .buckets
                .get_or_insert_with(key, || Mutex::new(Slot::vacant(key)));
            let mut slot = entry.value().lock();
            if slot.retired {
                // Cleanup owns this node; wait for it to be unlinked
                drop(slot);
                std::thread::yield_now();
                continue;
            }
            slot.bucket = slot.bucket.combine(incoming);
            return;
        }
    }

    /// Aggregate over the default window ending now
    #[must_use]
    pub fn query(&self) -> Statistics {
        self.query_since(self.clock.now() - self.config.buffer())
    }

    /// Aggregate over every bucket at or after `since`
    #[must_use]
    pub fn query_since(&self, since: DateTime<Utc>) -> Statistics {
        let since_ms = since.timestamp_millis();

        let has_recent = self
            .buckets
            .back()
            .is_some_and(|newest| *newest.key() >= since_ms);
        if !has_recent {
            return Statistics::empty(since);
        }

        let total = self
            .buckets
            .range(since_ms..)
            .filter_map(|entry| {
                let slot = entry.value().lock();
                (!slot.retired).then_some(slot.bucket)
            })
            .fold(Bucket::empty(since_ms), Bucket::combine);

        Statistics::new(
            since,
            money::from_minor_units(total.amount_minor),
            total.order_count,
        )
    }

    /// Remove buckets older than the retention horizon
    ///
    /// O(1) while the oldest bucket is fresh; otherwise sweeps the stale prefix.
    fn cleanup(&self, now: DateTime<Utc>) -> usize {
        let cutoff_ms = (now - self.config.retention()).timestamp_millis();

        let has_stale = self
            .buckets
            .front()
            .is_some_and(|oldest| *oldest.key() < cutoff_ms);
        if !has_stale {
            return 0;
        }

        let mut removed = 0;
        for entry in self.buckets.range(..cutoff_ms) {
            entry.value().lock().retired = true;
            if entry.remove() {
                removed += 1;
            }
        }

        debug!(cutoff_ms, removed, "Purged buckets past retention horizon");
        self.metrics.record_purged(removed);
        removed
    }

    /// Bucket stored at the millisecond of `at`, if any
    #[must_use]
    pub fn bucket_at(&self, at: DateTime<Utc>) -> Option<Bucket> {
        self.buckets.get(&at.timestamp_millis()).and_then(|entry| {
            let slot = entry.value().lock();
            (!slot.retired).then_some(slot.bucket)
        })
    }

    /// Number of live buckets
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether the store holds no buckets
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Drop every bucket
    pub fn clear(&self) {
        self.buckets.clear();
        self.metrics.set_buckets(0);
    }

    /// Validated window configuration
    #[must_use]
    pub const fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Metrics owned by this instance
    #[must_use]
    pub const fn metrics(&self) -> &AggregatorMetrics {
        &self.metrics
    }
}

impl fmt::Debug for WindowedAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowedAggregator")
            .field("buckets", &self.buckets.len())
            .field("config", &self.config)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
