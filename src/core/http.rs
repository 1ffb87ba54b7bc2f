//! HTTP API using Axum.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, warn, Level};

use crate::db::AnalysisStore;
use crate::jobs::analysis::{AnalysisError, AnalysisPipeline};
use crate::metrics::Metrics;
use crate::models::signal::{ResultSet, UnknownLabel};
use crate::signals::ranking::{rank, summary, RankOptions, ScoreField, SignalFilter, SortOrder};

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub store: Option<Arc<AnalysisStore>>,
    pub pipeline: Option<Arc<AnalysisPipeline>>,
}

impl AppState {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self {
            health: Arc::new(RwLock::new(HealthStatus::default())),
            metrics,
            start_time: Arc::new(Instant::now()),
            store: None,
            pipeline: None,
        }
    }

    pub fn with_store(mut self, store: Arc<AnalysisStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_pipeline(mut self, pipeline: Arc<AnalysisPipeline>) -> Self {
        self.pipeline = Some(pipeline);
        self
    }
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": state.start_time.elapsed().as_secs(),
        "service": "equiscan-api",
        "analysis_running": state.pipeline.as_ref().is_some_and(|p| p.is_running()),
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    state.metrics.http_requests_in_flight.dec();

    let status = response.status();
    let duration = start.elapsed();
    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis() as u64,
            "HTTP request error"
        );
    }

    response
}

/// Start an analysis run in the background.
async fn run_analysis(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let pipeline = state
        .pipeline
        .clone()
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    if pipeline.is_running() {
        return Err(StatusCode::CONFLICT);
    }

    tokio::spawn(async move {
        match pipeline.run().await {
            Ok(report) => info!(run_id = ?report.run_id, "background analysis completed"),
            Err(AnalysisError::AlreadyRunning) => warn!("analysis already in progress"),
            Err(e) => error!(error = %e, "background analysis failed"),
        }
    });
    info!("analysis task started in the background");

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "message": "Analysis task started in the background." })),
    ))
}

/// Results of the most recent stored run. `analyzed_at` is `None` before the
/// first run.
#[derive(Debug, Default)]
struct LatestRun {
    analyzed_at: Option<DateTime<Utc>>,
    results: ResultSet,
}

impl LatestRun {
    fn summary_body(&self, top_n: usize) -> Value {
        let mut body = json!(summary(&self.results, top_n));
        body["analyzed_at"] = json!(self.analyzed_at);
        body
    }

    fn search_body(&self, options: &RankOptions) -> Value {
        let ranked = rank(&self.results, options);
        json!({
            "message": format!("Found {} stocks.", ranked.len()),
            "analyzed_at": self.analyzed_at,
            "analysis_results": ranked,
        })
    }
}

async fn latest_results(state: &AppState) -> Result<LatestRun, StatusCode> {
    let store = state.store.as_ref().ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    match store.latest_results().await {
        Ok(Some((run, results))) => Ok(LatestRun {
            analyzed_at: Some(run.analyzed_at),
            results,
        }),
        Ok(None) => {
            warn!("no analysis runs recorded yet");
            Ok(LatestRun::default())
        }
        Err(e) => {
            error!(error = %e, "failed to load latest analysis results");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[derive(Debug, Deserialize)]
struct SummaryQuery {
    #[serde(default = "default_top_n")]
    top_n: usize,
}

fn default_top_n() -> usize {
    5
}

async fn stocks_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<Value>, StatusCode> {
    let latest = latest_results(&state).await?;
    Ok(Json(latest.summary_body(query.top_n)))
}

/// Search parameters. Signal filters are comma-separated label lists.
#[derive(Debug, Default, Deserialize)]
struct SearchQuery {
    min_buy_score: Option<u32>,
    min_short_score: Option<u32>,
    sort_by: Option<ScoreField>,
    sort_order: Option<SortOrder>,
    limit: Option<usize>,
    rsi: Option<String>,
    deviation: Option<String>,
    trend: Option<String>,
    macd: Option<String>,
    dmi: Option<String>,
    adx: Option<String>,
}

const DEFAULT_SEARCH_LIMIT: usize = 100;

fn parse_labels<T>(raw: Option<&str>) -> Result<Option<Vec<T>>, UnknownLabel>
where
    T: FromStr<Err = UnknownLabel>,
{
    raw.map(|list| {
        list.split(',')
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(T::from_str)
            .collect()
    })
    .transpose()
}

impl SearchQuery {
    fn filter(&self) -> Result<SignalFilter, UnknownLabel> {
        Ok(SignalFilter {
            rsi: parse_labels(self.rsi.as_deref())?,
            deviation: parse_labels(self.deviation.as_deref())?,
            trend: parse_labels(self.trend.as_deref())?,
            macd: parse_labels(self.macd.as_deref())?,
            dmi: parse_labels(self.dmi.as_deref())?,
            adx: parse_labels(self.adx.as_deref())?,
        })
    }

    fn rank_options(&self) -> Result<RankOptions, UnknownLabel> {
        Ok(RankOptions {
            sort_by: self.sort_by.unwrap_or_default(),
            order: self.sort_order.unwrap_or_default(),
            min_buy_score: self.min_buy_score,
            min_short_score: self.min_short_score,
            limit: Some(self.limit.unwrap_or(DEFAULT_SEARCH_LIMIT)),
            filter: self.filter()?,
            benchmark: None,
        })
    }
}

async fn search_stocks(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>, StatusCode> {
    let options = query.rank_options().map_err(|e| {
        warn!(error = %e, "rejecting search with unknown signal label");
        StatusCode::BAD_REQUEST
    })?;
    let latest = latest_results(&state).await?;
    Ok(Json(latest.search_body(&options)))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/analyze/run", post(run_analysis))
        .route("/stocks/summary", get(stocks_summary))
        .route("/stocks/search", get(search_stocks))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(port: u16, state: AppState) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;

    info!(port, "HTTP server listening on port {}", port);
    axum::serve(listener, app).await?;
    Ok(())
}
