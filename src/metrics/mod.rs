//! Prometheus metrics for the HTTP API and analysis runs.

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    pub http_requests_total: IntCounter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_in_flight: IntGauge,
    pub analysis_runs_total: IntCounter,
    pub analysis_failures_total: IntCounter,
    pub analysis_in_progress: IntGauge,
    pub analysis_duration_seconds: Histogram,
    pub tickers_evaluated_total: IntCounter,
    pub tickers_excluded_total: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total =
            IntCounter::new("http_requests_total", "Total HTTP requests served")?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;
        let http_requests_in_flight =
            IntGauge::new("http_requests_in_flight", "HTTP requests currently in flight")?;
        let analysis_runs_total =
            IntCounter::new("analysis_runs_total", "Completed analysis runs")?;
        let analysis_failures_total =
            IntCounter::new("analysis_failures_total", "Analysis runs that failed")?;
        let analysis_in_progress =
            IntGauge::new("analysis_in_progress", "Analysis runs currently executing")?;
        let analysis_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "analysis_duration_seconds",
                "Wall time of an analysis run in seconds",
            )
            .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
        )?;
        let tickers_evaluated_total =
            IntCounter::new("tickers_evaluated_total", "Tickers scored across runs")?;
        let tickers_excluded_total =
            IntCounter::new("tickers_excluded_total", "Tickers excluded across runs")?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(analysis_runs_total.clone()))?;
        registry.register(Box::new(analysis_failures_total.clone()))?;
        registry.register(Box::new(analysis_in_progress.clone()))?;
        registry.register(Box::new(analysis_duration_seconds.clone()))?;
        registry.register(Box::new(tickers_evaluated_total.clone()))?;
        registry.register(Box::new(tickers_excluded_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            analysis_runs_total,
            analysis_failures_total,
            analysis_in_progress,
            analysis_duration_seconds,
            tickers_evaluated_total,
            tickers_excluded_total,
        })
    }

    /// Prometheus text exposition of every registered metric.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
