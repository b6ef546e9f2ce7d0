//! Common error types for services

use thiserror::Error;

/// Service error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Amount string is not a decimal number
    #[error("Invalid amount: '{0}'")]
    InvalidAmount(String),

    /// Amount is below zero
    #[error("Negative amount: {0}")]
    NegativeAmount(String),

    /// Amount string exceeds the accepted length
    #[error("Amount too long: {len} chars (max {max})")]
    AmountTooLong {
        /// Length of the rejected input
        len: usize,
        /// Configured maximum
        max: usize,
    },

    /// Amount does not fit in 64-bit minor units
    #[error("Amount overflow: {0}")]
    AmountOverflow(String),

    /// Configuration violates an invariant
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ServiceError {
    /// Whether the error was caused by caller input
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::InvalidConfig(_))
    }
}
