//! REST API models and request/response types

use crate::statistics::Statistics;
use serde::{Deserialize, Serialize};
use services_common::money::format_fixed_2;

/// `POST /sales` form body
#[derive(Debug, Serialize, Deserialize)]
pub struct SalesForm {
    /// Decimal amount as a string
    pub sales_amount: String,
}

/// `GET /statistics` query parameters
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StatisticsQuery {
    /// Explicit range start in epoch milliseconds; defaults to the window start
    pub since_ms: Option<i64>,
}

/// `GET /statistics` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsResponse {
    /// Total in the window, 2-decimal fixed string
    pub total_sales_amount: String,
    /// Average per order, 2-decimal fixed string
    pub average_amount_per_order: String,
}

impl From<&Statistics> for StatisticsResponse {
    fn from(stats: &Statistics) -> Self {
        Self {
            total_sales_amount: format_fixed_2(stats.total_amount),
            average_amount_per_order: format_fixed_2(stats.average_per_order()),
        }
    }
}

/// `GET /health` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall status
    pub status: String,
    /// Crate version
    pub version: String,
    /// Seconds since the server was built
    pub uptime_seconds: u64,
    /// Live millisecond buckets
    pub buckets: usize,
}
