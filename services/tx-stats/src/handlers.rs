//! HTTP handlers for ingestion, statistics, health and metrics

use crate::aggregators::WindowedAggregator;
use crate::error::TxStatsError;
use crate::models::{HealthCheckResponse, SalesForm, StatisticsQuery, StatisticsResponse};
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::DateTime;
use services_common::money;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

/// Shared state handed to every handler
#[derive(Clone, Debug)]
pub struct AppState {
    /// The aggregation store
    pub aggregator: Arc<WindowedAggregator>,
    /// Maximum accepted length of `sales_amount`
    pub max_amount_len: usize,
    /// Server construction time
    pub start_time: Instant,
}

/// `POST /sales`: parse the amount and record it at the current time
pub async fn record_sale(
    State(state): State<AppState>,
    form: Result<Form<SalesForm>, FormRejection>,
) -> Result<StatusCode, TxStatsError> {
    let Form(form) = form.map_err(|rejection| {
        error!("Rejected sales form: {}", rejection);
        TxStatsError::BadRequest(rejection.body_text())
    })?;

    let amount = money::parse_amount_with_limit(&form.sales_amount, state.max_amount_len)
        .map_err(|e| {
            error!("Cannot parse param 'sales_amount': {}", e);
            e
        })?;

    let outcome = state.aggregator.record_now(amount);
    debug!(%amount, ?outcome, "Recorded sale");
    Ok(StatusCode::ACCEPTED)
}

/// `GET /statistics`: totals over the window, or since `since_ms`
pub async fn statistics(
    State(state): State<AppState>,
    Query(query): Query<StatisticsQuery>,
) -> Result<Json<StatisticsResponse>, TxStatsError> {
    let stats = match query.since_ms {
        Some(since_ms) => {
            let since = DateTime::from_timestamp_millis(since_ms).ok_or_else(|| {
                TxStatsError::BadRequest(format!("since_ms out of range: {since_ms}"))
            })?;
            state.aggregator.query_since(since)
        }
        None => state.aggregator.query(),
    };

    Ok(Json(StatisticsResponse::from(&stats)))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        buckets: state.aggregator.len(),
    })
}

/// `GET /metrics`: Prometheus text exposition
pub async fn metrics(State(state): State<AppState>) -> Result<String, TxStatsError> {
    Ok(state.aggregator.metrics().encode()?)
}
