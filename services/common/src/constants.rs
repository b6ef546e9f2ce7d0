//! Common constants used across all services
//!
//! COMPLIANCE: Single source of truth for all magic numbers

/// Fixed-point arithmetic constants
pub mod fixed_point {
    /// 2-decimal fixed-point scale factor (minor units per major unit)
    pub const SCALE_2: i64 = 100;

    /// Number of fractional digits carried by a money amount
    pub const MONEY_DP: u32 = 2;

    /// Integer digits a 96-bit decimal can carry
    pub const MAX_INTEGER_DIGITS: i64 = 28;

    /// Fractional digits kept when parsing; finer digits round away
    pub const MAX_FRACTION_DIGITS: i64 = 30;
}

/// Time-related constants
pub mod time {
    /// Seconds per minute
    pub const SECS_PER_MINUTE: u64 = 60;

    /// Seconds per day
    pub const SECS_PER_DAY: u64 = 86400;
}

/// Rolling window defaults
pub mod window {
    use super::time::{SECS_PER_DAY, SECS_PER_MINUTE};

    /// Width of the query and acceptance window in seconds
    pub const DEFAULT_SECONDS_TO_BUFFER: u64 = SECS_PER_MINUTE;

    /// Age in seconds after which buckets become eligible for removal
    pub const DEFAULT_CLEANUP_AFTER_SECS: u64 = 2 * SECS_PER_MINUTE;

    /// Upper bound for either span; keeps retained memory bounded
    pub const MAX_RETENTION_SECS: u64 = SECS_PER_DAY;
}

/// Input validation limits
pub mod limits {
    /// Maximum length of a decimal amount string accepted at the edge
    pub const MAX_AMOUNT_LEN: usize = 512;
}
