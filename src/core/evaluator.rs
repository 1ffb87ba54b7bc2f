//! Parallel batch evaluation of a ticker universe.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::data::normalizer::AsOfSettings;
use crate::error::EvaluationError;
use crate::models::indicators::RawBar;
use crate::models::params::ParameterSet;
use crate::models::signal::{ResultSet, ScoreResult};
use crate::signals::engine::SignalEngine;

/// Raw provider bars keyed by universe ticker.
#[derive(Debug, Clone, Default)]
pub struct MarketData {
    pub daily: HashMap<String, Vec<RawBar>>,
    pub intraday: HashMap<String, Vec<RawBar>>,
}

impl MarketData {
    pub fn new(
        daily: HashMap<String, Vec<RawBar>>,
        intraday: HashMap<String, Vec<RawBar>>,
    ) -> Self {
        Self { daily, intraday }
    }

    fn has_daily_data(&self) -> bool {
        self.daily.values().any(|bars| !bars.is_empty())
    }
}

/// A ticker left out of a run and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exclusion {
    pub ticker: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub results: ResultSet,
    pub exclusions: Vec<Exclusion>,
}

pub struct BatchEvaluator {
    params: ParameterSet,
    as_of: AsOfSettings,
    pool: Arc<rayon::ThreadPool>,
}

impl BatchEvaluator {
    /// Evaluator on a pool sized to the available parallelism.
    pub fn new(params: ParameterSet, as_of: AsOfSettings) -> Result<Self, EvaluationError> {
        let threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::with_threads(params, as_of, threads)
    }

    pub fn with_threads(
        params: ParameterSet,
        as_of: AsOfSettings,
        threads: usize,
    ) -> Result<Self, EvaluationError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("evaluator-{i}"))
            .build()
            .map_err(|e| EvaluationError::WorkerPool(e.to_string()))?;
        Ok(Self {
            params,
            as_of,
            pool: Arc::new(pool),
        })
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Evaluate every ticker in `universe`.
    ///
    /// Per-ticker failures become exclusions. An invalid parameter set or a
    /// retrieval that produced no daily bars at all fails the whole batch.
    pub fn evaluate(
        &self,
        universe: &[String],
        data: &MarketData,
    ) -> Result<BatchOutcome, EvaluationError> {
        self.params.validate()?;
        if !data.has_daily_data() {
            return Err(EvaluationError::UpstreamRetrievalFailure);
        }

        let mut seen = HashSet::new();
        let tickers: Vec<&String> = universe.iter().filter(|t| seen.insert(*t)).collect();

        let engine = SignalEngine::new(self.params.clone(), self.as_of);
        let evaluated: Vec<Result<ScoreResult, EvaluationError>> = self.pool.install(|| {
            tickers
                .par_iter()
                .map(|ticker| {
                    let daily = data.daily.get(ticker.as_str()).map(Vec::as_slice);
                    let intraday = data
                        .intraday
                        .get(ticker.as_str())
                        .map(Vec::as_slice)
                        .unwrap_or_default();
                    engine.evaluate_ticker(ticker, daily, intraday)
                })
                .collect()
        });

        let mut outcome = BatchOutcome::default();
        for (ticker, result) in tickers.into_iter().zip(evaluated) {
            match result {
                Ok(score) => outcome.results.insert(score),
                Err(err) if err.is_ticker_scoped() => {
                    warn!(ticker = %ticker, error = %err, "excluding ticker from run");
                    outcome.exclusions.push(Exclusion {
                        ticker: ticker.clone(),
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        info!(
            evaluated = outcome.results.len(),
            excluded = outcome.exclusions.len(),
            threads = self.threads(),
            "batch evaluation finished"
        );
        Ok(outcome)
    }
}
