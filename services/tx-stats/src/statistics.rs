//! Rolling window statistics

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use services_common::money;

/// Aggregate over every bucket at or after `since`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statistics {
    /// Start of the aggregated range
    pub since: DateTime<Utc>,
    /// Summed amount
    pub total_amount: Decimal,
    /// Number of orders
    pub order_count: u64,
}

impl Statistics {
    /// Statistics over a range
    #[must_use]
    pub const fn new(since: DateTime<Utc>, total_amount: Decimal, order_count: u64) -> Self {
        Self {
            since,
            total_amount,
            order_count,
        }
    }

    /// Defined zero value for an empty or stale range
    #[must_use]
    pub const fn empty(since: DateTime<Utc>) -> Self {
        Self::new(since, Decimal::ZERO, 0)
    }

    /// Average amount per order, rounded half-up; zero without orders
    #[must_use]
    pub fn average_per_order(&self) -> Decimal {
        money::average(self.total_amount, self.order_count)
    }
}
