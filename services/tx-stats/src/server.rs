//! HTTP server for the transaction statistics service

use crate::aggregators::WindowedAggregator;
use crate::config::TxStatsConfig;
use crate::error::TxStatsError;
use crate::handlers::{self, AppState};
use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Transaction statistics HTTP server
#[derive(Debug)]
pub struct TxStatsServer {
    config: TxStatsConfig,
    aggregator: Arc<WindowedAggregator>,
    start_time: Instant,
}

impl TxStatsServer {
    /// Create a server with a wall-clock aggregator
    pub fn new(config: TxStatsConfig) -> Result<Self, TxStatsError> {
        let aggregator = Arc::new(WindowedAggregator::new(config.window)?);
        Ok(Self::with_aggregator(config, aggregator))
    }

    /// Create a server around an existing aggregator
    #[must_use]
    pub fn with_aggregator(config: TxStatsConfig, aggregator: Arc<WindowedAggregator>) -> Self {
        Self {
            config,
            aggregator,
            start_time: Instant::now(),
        }
    }

    /// Shared handle to the aggregation store
    #[must_use]
    pub fn aggregator(&self) -> Arc<WindowedAggregator> {
        Arc::clone(&self.aggregator)
    }

    /// Build the router with all routes and middleware
    pub fn router(&self) -> Router {
        let state = AppState {
            aggregator: Arc::clone(&self.aggregator),
            max_amount_len: self.config.server.max_amount_len,
            start_time: self.start_time,
        };

        Router::new()
            .route("/sales", post(handlers::record_sale))
            .route("/statistics", get(handlers::statistics))
            .route("/health", get(handlers::health))
            .route("/metrics", get(handlers::metrics))
            .with_state(state)
            .layer(DefaultBodyLimit::max(self.config.server.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(
                self.config.server.timeout_seconds,
            )))
            .layer(TraceLayer::new_for_http())
    }

    /// Bind and serve until Ctrl-C
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self.config.server_address().parse().map_err(|e| {
            error!(
                "Invalid server address '{}': {}",
                self.config.server_address(),
                e
            );
            anyhow::anyhow!("Invalid server address: {}", e)
        })?;

        let app = self.router();

        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
            error!("Failed to bind TCP listener to {}: {}", addr, e);
            anyhow::anyhow!("Failed to bind to address {}: {}", addr, e)
        })?;

        info!("Transaction statistics server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                error!("Server encountered a fatal error: {}", e);
                anyhow::anyhow!("Server error: {}", e)
            })?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install Ctrl-C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
