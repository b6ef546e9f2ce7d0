//! Service error type and its HTTP mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use services_common::ServiceError;
use thiserror::Error;

/// Transaction statistics service errors
#[derive(Debug, Error)]
pub enum TxStatsError {
    /// Amount or configuration validation failure
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Malformed request outside the amount itself
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Configuration loading failure
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Metrics registration or encoding failure
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl TxStatsError {
    /// HTTP status reported to the caller
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Service(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TxStatsError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}
