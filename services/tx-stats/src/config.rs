//! Transaction statistics service configuration

use crate::error::TxStatsError;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use services_common::ServiceError;
use services_common::constants::limits::MAX_AMOUNT_LEN;
use services_common::constants::window::{
    DEFAULT_CLEANUP_AFTER_SECS, DEFAULT_SECONDS_TO_BUFFER, MAX_RETENTION_SECS,
};

/// Environment variable prefix (`TX_STATS__WINDOW__SECONDS_TO_BUFFER=30`)
pub const ENV_PREFIX: &str = "TX_STATS";

/// Service configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TxStatsConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Rolling window configuration
    pub window: WindowConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
    /// Maximum length of the `sales_amount` field
    pub max_amount_len: usize,
}

/// Rolling window configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Width of the query and acceptance window in seconds
    pub seconds_to_buffer: u64,
    /// Retention horizon in seconds; must exceed `seconds_to_buffer`
    pub cleanup_after_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            timeout_seconds: 30,
            max_body_size: 1024,
            max_amount_len: MAX_AMOUNT_LEN,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            seconds_to_buffer: DEFAULT_SECONDS_TO_BUFFER,
            cleanup_after_secs: DEFAULT_CLEANUP_AFTER_SECS,
        }
    }
}

impl WindowConfig {
    /// Create a window configuration
    #[must_use]
    pub const fn new(seconds_to_buffer: u64, cleanup_after_secs: u64) -> Self {
        Self {
            seconds_to_buffer,
            cleanup_after_secs,
        }
    }

    /// Check the window invariants
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.seconds_to_buffer == 0 {
            return Err(ServiceError::InvalidConfig(
                "seconds_to_buffer must be positive".to_string(),
            ));
        }
        if self.cleanup_after_secs <= self.seconds_to_buffer {
            return Err(ServiceError::InvalidConfig(format!(
                "cleanup_after_secs ({}) must exceed seconds_to_buffer ({})",
                self.cleanup_after_secs, self.seconds_to_buffer
            )));
        }
        if self.cleanup_after_secs > MAX_RETENTION_SECS {
            return Err(ServiceError::InvalidConfig(format!(
                "cleanup_after_secs ({}) exceeds maximum of {MAX_RETENTION_SECS}",
                self.cleanup_after_secs
            )));
        }
        Ok(())
    }

    /// Query and acceptance window
    #[must_use]
    pub fn buffer(&self) -> Duration {
        span(self.seconds_to_buffer)
    }

    /// Retention horizon
    #[must_use]
    pub fn retention(&self) -> Duration {
        span(self.cleanup_after_secs)
    }
}

fn span(secs: u64) -> Duration {
    let capped = secs.min(MAX_RETENTION_SECS);
    Duration::seconds(i64::try_from(capped).unwrap_or_default())
}

impl TxStatsConfig {
    /// Load configuration from an optional file layered with environment overrides
    pub fn from_file(path: &str) -> Result<Self, TxStatsError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let loaded: Self = settings.try_deserialize()?;
        loaded.window.validate()?;
        Ok(loaded)
    }

    /// Get server address
    #[must_use]
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
