//! Per-millisecond aggregation bucket

use serde::{Deserialize, Serialize};

/// All transactions recorded at one millisecond tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bucket {
    /// Epoch milliseconds
    pub timestamp_ms: i64,
    /// Summed amount in minor units (cents)
    pub amount_minor: i64,
    /// Number of orders folded into the bucket
    pub order_count: u64,
}

impl Bucket {
    /// Bucket holding a single order
    #[must_use]
    pub const fn single(timestamp_ms: i64, amount_minor: i64) -> Self {
        Self {
            timestamp_ms,
            amount_minor,
            order_count: 1,
        }
    }

    /// Identity element for `combine`
    #[must_use]
    pub const fn empty(timestamp_ms: i64) -> Self {
        Self {
            timestamp_ms,
            amount_minor: 0,
            order_count: 0,
        }
    }

    /// Pointwise sum of amount and count, keeping `self`'s timestamp
    #[must_use]
    pub const fn combine(self, other: Self) -> Self {
        Self {
            timestamp_ms: self.timestamp_ms,
            amount_minor: self.amount_minor.saturating_add(other.amount_minor),
            order_count: self.order_count.saturating_add(other.order_count),
        }
    }
}
