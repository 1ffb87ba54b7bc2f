//! End-to-end analysis run: universe, parameters, prices, scoring,
//! persistence and export.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::core::evaluator::{BatchEvaluator, BatchOutcome, Exclusion, MarketData};
use crate::data::universe::{load_universe, UniverseError};
use crate::db::StoreError;
use crate::error::EvaluationError;
use crate::export::{ExportError, SnapshotPaths, SnapshotWriter};
use crate::jobs::context::AnalysisContext;
use crate::models::params::ParameterSet;
use crate::services::market_data::MarketDataError;
use crate::signals::ranking::RankOptions;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("an analysis run is already in progress")]
    AlreadyRunning,

    #[error(transparent)]
    Universe(#[from] UniverseError),

    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("evaluation task failed: {0}")]
    Task(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub run_id: Option<i64>,
    pub analyzed_at: DateTime<Utc>,
    pub evaluated: usize,
    pub exclusions: Vec<Exclusion>,
    #[serde(skip)]
    pub snapshot: Option<SnapshotPaths>,
}

pub struct AnalysisPipeline {
    ctx: Arc<AnalysisContext>,
    running: AtomicBool,
}

struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl AnalysisPipeline {
    pub fn new(ctx: Arc<AnalysisContext>) -> Self {
        Self {
            ctx,
            running: AtomicBool::new(false),
        }
    }

    pub fn context(&self) -> &AnalysisContext {
        &self.ctx
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Run one analysis. Overlapping runs are rejected.
    pub async fn run(&self) -> Result<AnalysisReport, AnalysisError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(AnalysisError::AlreadyRunning);
        }
        let _guard = RunGuard(&self.running);

        let metrics = self.ctx.metrics.clone();
        if let Some(m) = &metrics {
            m.analysis_in_progress.inc();
        }
        let start = Instant::now();

        let result = self.execute().await;

        let elapsed = start.elapsed();
        if let Some(m) = &metrics {
            m.analysis_in_progress.dec();
            m.analysis_duration_seconds.observe(elapsed.as_secs_f64());
            match &result {
                Ok(report) => {
                    m.analysis_runs_total.inc();
                    m.tickers_evaluated_total.inc_by(report.evaluated as u64);
                    m.tickers_excluded_total.inc_by(report.exclusions.len() as u64);
                }
                Err(_) => m.analysis_failures_total.inc(),
            }
        }

        match &result {
            Ok(report) => info!(
                run_id = ?report.run_id,
                evaluated = report.evaluated,
                excluded = report.exclusions.len(),
                duration_ms = elapsed.as_millis() as u64,
                "analysis run finished"
            ),
            Err(e) => error!(error = %e, duration_ms = elapsed.as_millis() as u64, "analysis run failed"),
        }
        result
    }

    async fn execute(&self) -> Result<AnalysisReport, AnalysisError> {
        let config = &self.ctx.config;

        let mut universe = load_universe(&config.tickers_csv)?;
        if !universe.contains(&config.benchmark) {
            universe.insert(0, config.benchmark.clone());
        }

        let params = self.resolve_parameters().await?;
        info!(tickers = universe.len(), "starting analysis run");

        let daily = self
            .ctx
            .provider
            .daily_bars(&universe, config.daily_lookback_days)
            .await?;
        let intraday = match self.ctx.provider.intraday_bars(&universe).await {
            Ok(bars) => bars,
            Err(e) => {
                warn!(error = %e, "intraday retrieval failed, using daily closes");
                Default::default()
            }
        };
        let data = MarketData::new(daily, intraday);

        let evaluator = match config.worker_threads {
            Some(threads) => BatchEvaluator::with_threads(params.clone(), config.as_of, threads)?,
            None => BatchEvaluator::new(params.clone(), config.as_of)?,
        };
        let outcome: BatchOutcome =
            tokio::task::spawn_blocking(move || evaluator.evaluate(&universe, &data))
                .await
                .map_err(|e| AnalysisError::Task(e.to_string()))??;

        let analyzed_at = Utc::now();
        let run_id = match &self.ctx.store {
            Some(store) => Some(store.save_run(&params, &outcome.results).await?),
            None => None,
        };

        let snapshot = match &config.snapshot_dir {
            Some(dir) => {
                let options = RankOptions {
                    benchmark: Some(config.benchmark.clone()),
                    ..RankOptions::default()
                };
                Some(SnapshotWriter::new(dir).write_run(&outcome.results, &options, analyzed_at)?)
            }
            None => None,
        };

        Ok(AnalysisReport {
            run_id,
            analyzed_at,
            evaluated: outcome.results.len(),
            exclusions: outcome.exclusions,
            snapshot,
        })
    }

    async fn resolve_parameters(&self) -> Result<ParameterSet, AnalysisError> {
        let Some(store) = &self.ctx.store else {
            return Ok(ParameterSet::default());
        };
        let today = Utc::now()
            .with_timezone(&self.ctx.config.as_of.exchange_offset)
            .date_naive();
        Ok(store.resolve_parameters(today).await?)
    }
}
