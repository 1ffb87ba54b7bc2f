//! Per-ticker evaluation: normalize, compute indicators, classify, score.

use tracing::debug;

use crate::data::normalizer::{build_window, AsOfSettings};
use crate::error::EvaluationError;
use crate::indicators::compute_snapshot;
use crate::models::indicators::{PriceWindow, RawBar};
use crate::models::params::ParameterSet;
use crate::models::signal::ScoreResult;
use crate::signals::scoring::SignalScorer;

/// Evaluates single tickers against one bound parameter set.
#[derive(Debug, Clone)]
pub struct SignalEngine {
    params: ParameterSet,
    as_of: AsOfSettings,
}

impl SignalEngine {
    pub fn new(params: ParameterSet, as_of: AsOfSettings) -> Self {
        Self { params, as_of }
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn as_of(&self) -> &AsOfSettings {
        &self.as_of
    }

    /// Evaluate a ticker from raw provider bars. `daily` is `None` when the
    /// provider returned nothing for the ticker.
    pub fn evaluate_ticker(
        &self,
        ticker: &str,
        daily: Option<&[RawBar]>,
        intraday: &[RawBar],
    ) -> Result<ScoreResult, EvaluationError> {
        let daily = daily
            .filter(|bars| !bars.is_empty())
            .ok_or_else(|| EvaluationError::MissingPriceData {
                ticker: ticker.to_string(),
            })?;
        let window = build_window(
            ticker,
            daily,
            intraday,
            self.params.min_history(),
            &self.as_of,
        )?;
        self.evaluate_window(&window)
    }

    pub fn evaluate_window(&self, window: &PriceWindow) -> Result<ScoreResult, EvaluationError> {
        let undefined = |source| EvaluationError::IndicatorUndefined {
            ticker: window.ticker.clone(),
            source,
        };

        let snapshot = compute_snapshot(window, &self.params).map_err(undefined)?;
        let classification = SignalScorer::new(&self.params)
            .score(&snapshot, window.as_of_close)
            .map_err(undefined)?;

        debug!(
            ticker = %window.ticker,
            buy_score = classification.buy_score,
            short_score = classification.short_score,
            "scored {}",
            window.ticker
        );

        Ok(ScoreResult {
            ticker: window.ticker.clone(),
            price: window.as_of_close,
            indicators: snapshot,
            deviation: classification.deviation,
            volume: window.last_volume().unwrap_or_default(),
            trend: classification.signals.trend,
            signals: classification.signals,
            buy_score: classification.buy_score,
            short_score: classification.short_score,
            parameters_used: self.params.clone(),
        })
    }
}
