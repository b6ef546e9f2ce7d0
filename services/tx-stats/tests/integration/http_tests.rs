//! HTTP surface tests driven through the router without a socket

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use chrono::{DateTime, Duration, Utc};
use rstest::*;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use tx_stats::{Clock, ManualClock, TxStatsConfig, TxStatsServer, WindowedAggregator};

struct TestApp {
    router: Router,
    clock: Arc<ManualClock>,
    aggregator: Arc<WindowedAggregator>,
}

#[fixture]
fn app() -> TestApp {
    super::super::init_test_env();
    let start = DateTime::parse_from_rfc3339("2024-01-01T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc);
    let clock = Arc::new(ManualClock::new(start));
    let config = TxStatsConfig::default();
    let aggregator =
        Arc::new(WindowedAggregator::with_clock(config.window, clock.clone()).unwrap());
    let server = TxStatsServer::with_aggregator(config, Arc::clone(&aggregator));

    TestApp {
        router: server.router(),
        clock,
        aggregator,
    }
}

fn post_sale(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/sales")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn statistics(router: &Router, uri: &str) -> Value {
    let (status, body) = send(router, get(uri)).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&body).unwrap()
}

#[rstest]
#[tokio::test]
async fn test_post_then_statistics(app: TestApp) {
    let (status, body) = send(&app.router, post_sale("sales_amount=10.01")).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(body.is_empty());

    let stats = statistics(&app.router, "/statistics").await;
    assert_eq!(stats["total_sales_amount"], "10.01");
    assert_eq!(stats["average_amount_per_order"], "10.01");
}

#[rstest]
#[tokio::test]
async fn test_statistics_average_rounds_half_up(app: TestApp) {
    let _ = send(&app.router, post_sale("sales_amount=10.01")).await;
    app.clock.advance(Duration::milliseconds(5));
    let _ = send(&app.router, post_sale("sales_amount=5")).await;

    let stats = statistics(&app.router, "/statistics").await;
    assert_eq!(stats["total_sales_amount"], "15.01");
    assert_eq!(stats["average_amount_per_order"], "7.51");
}

#[rstest]
#[tokio::test]
async fn test_empty_store_reports_zero(app: TestApp) {
    let stats = statistics(&app.router, "/statistics").await;
    assert_eq!(stats["total_sales_amount"], "0.00");
    assert_eq!(stats["average_amount_per_order"], "0.00");
}

#[rstest]
#[case("sales_amount=10_02")]
#[case("sales_amount=abc")]
#[case("sales_amount=")]
#[case("sales_amount=-5.00")]
#[case("amount=10.00")]
#[tokio::test]
async fn test_rejects_bad_amount(app: TestApp, #[case] body: &str) {
    let (status, _) = send(&app.router, post_sale(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.aggregator.is_empty());
}

#[rstest]
#[case("sales_amount=100000000000000000")]
#[case("sales_amount=1e20")]
#[case("sales_amount=92233720368547758.08")]
#[tokio::test]
async fn test_rejects_amount_beyond_minor_unit_range(app: TestApp, #[case] body: &str) {
    let (status, _) = send(&app.router, post_sale(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.aggregator.is_empty());
    // Never reaches the store, so nothing is counted as dropped
    assert_eq!(app.aggregator.metrics().rejected(), 0);
}

#[rstest]
#[tokio::test]
async fn test_accepts_largest_representable_amount(app: TestApp) {
    let (status, _) = send(&app.router, post_sale("sales_amount=92233720368547758.07")).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let stats = statistics(&app.router, "/statistics").await;
    assert_eq!(stats["total_sales_amount"], "92233720368547758.07");
}

#[rstest]
#[tokio::test]
async fn test_rejects_overlong_amount(app: TestApp) {
    let body = format!("sales_amount={}", "9".repeat(600));
    let (status, _) = send(&app.router, post_sale(&body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[rstest]
#[tokio::test]
async fn test_rejects_oversized_body(app: TestApp) {
    let body = format!("sales_amount=1&padding={}", "x".repeat(4096));
    let (status, _) = send(&app.router, post_sale(&body)).await;
    assert!(status.is_client_error());
    assert!(app.aggregator.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_sales_leave_window(app: TestApp) {
    let _ = send(&app.router, post_sale("sales_amount=42.00")).await;

    app.clock.advance(Duration::seconds(61));

    let stats = statistics(&app.router, "/statistics").await;
    assert_eq!(stats["total_sales_amount"], "0.00");
}

#[rstest]
#[tokio::test]
async fn test_statistics_since_ms(app: TestApp) {
    let _ = send(&app.router, post_sale("sales_amount=1.00")).await;
    app.clock.advance(Duration::seconds(30));
    let _ = send(&app.router, post_sale("sales_amount=2.00")).await;

    let since = (app.clock.now() - Duration::seconds(10)).timestamp_millis();
    let stats = statistics(&app.router, &format!("/statistics?since_ms={since}")).await;
    assert_eq!(stats["total_sales_amount"], "2.00");

    let since = (app.clock.now() - Duration::seconds(60)).timestamp_millis();
    let stats = statistics(&app.router, &format!("/statistics?since_ms={since}")).await;
    assert_eq!(stats["total_sales_amount"], "3.00");
    assert_eq!(stats["average_amount_per_order"], "1.50");
}

#[rstest]
#[tokio::test]
async fn test_statistics_since_ms_out_of_range(app: TestApp) {
    let uri = format!("/statistics?since_ms={}", i64::MAX);
    let (status, _) = send(&app.router, get(&uri)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[rstest]
#[tokio::test]
async fn test_health(app: TestApp) {
    let _ = send(&app.router, post_sale("sales_amount=1.00")).await;

    let (status, body) = send(&app.router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);

    let health: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["buckets"], 1);
}

#[rstest]
#[tokio::test]
async fn test_metrics_exposition(app: TestApp) {
    let _ = send(&app.router, post_sale("sales_amount=1.00")).await;
    let _ = send(&app.router, post_sale("sales_amount=2.00")).await;

    let (status, body) = send(&app.router, get("/metrics")).await;
    assert_eq!(status, StatusCode::OK);

    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("tx_stats_records_accepted_total 2"));
    assert!(text.contains("tx_stats_buckets 1"));
}
