//! Transaction Statistics Service
//!
//! Ingests a high-rate stream of sales and serves a rolling aggregate over the
//! trailing window:
//! - Millisecond buckets in a concurrent ordered map
//! - Bounded out-of-order acceptance
//! - Range folds over an arbitrary start time
//! - Amortized cleanup past the retention horizon

pub mod aggregators;
pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod server;
pub mod statistics;

pub use aggregators::{Bucket, RecordOutcome, RejectReason, WindowedAggregator};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ServerConfig, TxStatsConfig, WindowConfig};
pub use error::TxStatsError;
pub use server::TxStatsServer;
pub use statistics::Statistics;

use anyhow::Result;

/// Start the server with the given configuration
pub async fn start_server(config: TxStatsConfig) -> Result<()> {
    let server = TxStatsServer::new(config)?;
    server.start().await
}
