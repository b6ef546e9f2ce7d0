//! Aggregator implementations

pub mod bucket;
pub mod window;

pub use bucket::Bucket;
pub use window::{RecordOutcome, RejectReason, WindowedAggregator};
