//! Evaluation error taxonomy.
//!
//! Per-ticker variants are recovered by the batch evaluator (logged, ticker
//! excluded). Batch-level variants abort the whole evaluation.

use thiserror::Error;

use crate::indicators::IndicatorError;
use crate::models::params::ParameterError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error("{ticker}: insufficient history ({available} usable bars, {required} required)")]
    InsufficientHistory {
        ticker: String,
        required: usize,
        available: usize,
    },

    #[error("{ticker}: {source}")]
    IndicatorUndefined {
        ticker: String,
        #[source]
        source: IndicatorError,
    },

    #[error("{ticker}: no price data was retrieved")]
    MissingPriceData { ticker: String },

    #[error("price retrieval returned no data for any ticker")]
    UpstreamRetrievalFailure,

    #[error("invalid parameter set: {0}")]
    InvalidParameters(#[from] ParameterError),

    #[error("failed to build evaluation worker pool: {0}")]
    WorkerPool(String),
}

impl EvaluationError {
    /// True for errors that only exclude a single ticker from a batch.
    pub fn is_ticker_scoped(&self) -> bool {
        matches!(
            self,
            EvaluationError::InsufficientHistory { .. }
                | EvaluationError::IndicatorUndefined { .. }
                | EvaluationError::MissingPriceData { .. }
        )
    }

    pub fn ticker(&self) -> Option<&str> {
        match self {
            EvaluationError::InsufficientHistory { ticker, .. }
            | EvaluationError::IndicatorUndefined { ticker, .. }
            | EvaluationError::MissingPriceData { ticker } => Some(ticker),
            _ => None,
        }
    }
}
