//! Dependencies shared by analysis runs.

use std::sync::Arc;

use crate::config::AnalysisConfig;
use crate::db::AnalysisStore;
use crate::metrics::Metrics;
use crate::services::market_data::MarketDataProvider;

/// Everything an analysis run needs besides its inputs.
///
/// The store and metrics are optional: without a store nothing is persisted
/// and parameters fall back to the defaults.
pub struct AnalysisContext {
    pub provider: Arc<dyn MarketDataProvider>,
    pub store: Option<Arc<AnalysisStore>>,
    pub metrics: Option<Arc<Metrics>>,
    pub config: AnalysisConfig,
}

impl AnalysisContext {
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: AnalysisConfig) -> Self {
        Self {
            provider,
            store: None,
            metrics: None,
            config,
        }
    }

    pub fn with_store(mut self, store: Arc<AnalysisStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }
}
