//! Shared primitives for the transaction statistics services
//!
//! - Fixed-point money helpers (decimal parsing, minor units, formatting)
//! - Centralized constants
//! - Common error type

pub mod constants;
pub mod errors;
pub mod money;

pub use errors::*;
