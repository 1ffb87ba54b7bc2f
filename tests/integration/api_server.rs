//! Integration tests for the API Server
//!
//! Tests HTTP endpoints, health checks, metrics and the analysis trigger.


use std::sync::Arc;
use std::time::Duration;

use equiscan::metrics::Metrics;
use serde_json::Value;

use crate::test_utils::{sample_provider, Workspace};
use test_utils::TestApiServer;

#[tokio::test]
async fn health_endpoint_reports_healthy_status() {
    let app = TestApiServer::new().await;
    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["uptime_seconds"].as_u64().is_some());
    assert_eq!(body["service"], "equiscan-api");
    assert_eq!(body["analysis_running"], false);
}

#[tokio::test]
async fn metrics_endpoint_exposes_prometheus_metrics() {
    let app = TestApiServer::new().await;
    let _ = app.server.get("/health").await;

    let response = app.server.get("/metrics").await;
    assert_eq!(response.status_code(), 200);

    let body = response.text();
    for name in [
        "http_requests_total",
        "http_request_duration_seconds",
        "http_requests_in_flight",
        "analysis_runs_total",
        "tickers_evaluated_total",
    ] {
        assert!(body.contains(name), "Expected {name} metric");
    }
    assert!(app.metrics.http_requests_total.get() >= 1);
}

#[tokio::test]
async fn run_without_pipeline_is_unavailable() {
    let app = TestApiServer::new().await;
    let response = app.server.post("/analyze/run").expect_failure().await;
    assert_eq!(response.status_code(), 503);
}

#[tokio::test]
async fn stock_queries_without_store_are_unavailable() {
    let app = TestApiServer::new().await;

    let summary = app.server.get("/stocks/summary").expect_failure().await;
    assert_eq!(summary.status_code(), 503);

    let search = app
        .server
        .get("/stocks/search")
        .add_query_param("min_buy_score", 3)
        .expect_failure()
        .await;
    assert_eq!(search.status_code(), 503);
}

#[tokio::test]
async fn search_rejects_unknown_signal_labels() {
    let app = TestApiServer::new().await;
    let response = app
        .server
        .get("/stocks/search")
        .add_query_param("rsi", "strong buy,very strong buy")
        .expect_failure()
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn search_rejects_unknown_sort_field() {
    let app = TestApiServer::new().await;
    let response = app
        .server
        .get("/stocks/search")
        .add_query_param("sort_by", "volume")
        .expect_failure()
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn run_starts_background_analysis() {
    let workspace = Workspace::new(&["7203", "6758"]);
    let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
    let pipeline = workspace.pipeline(sample_provider(), metrics.clone());
    let app = TestApiServer::with_pipeline(metrics.clone(), pipeline.clone()).await;

    let response = app.server.post("/analyze/run").await;
    assert_eq!(response.status_code(), 202);
    let body: Value = response.json();
    assert_eq!(body["message"], "Analysis task started in the background.");

    for _ in 0..50 {
        if metrics.analysis_runs_total.get() == 1 && !pipeline.is_running() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(metrics.analysis_runs_total.get(), 1);
    assert_eq!(metrics.tickers_evaluated_total.get(), 2);
    assert!(!pipeline.is_running());
}
