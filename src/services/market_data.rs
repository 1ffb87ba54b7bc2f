//! Market data provider interface.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::indicators::RawBar;

/// Bars keyed by universe ticker.
pub type BarsByTicker = HashMap<String, Vec<RawBar>>;

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {status} for {symbol}")]
    Status { symbol: String, status: u16 },

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("unexpected response format: {0}")]
    ResponseFormat(String),

    #[error("invalid provider URL: {0}")]
    Url(String),
}

impl MarketDataError {
    /// Errors worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            MarketDataError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            MarketDataError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Source of daily and intraday bars for a set of tickers.
///
/// Tickers the provider has nothing for are omitted from the returned map
/// rather than failing the call.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn daily_bars(
        &self,
        tickers: &[String],
        lookback_days: u32,
    ) -> Result<BarsByTicker, MarketDataError>;

    async fn intraday_bars(&self, tickers: &[String]) -> Result<BarsByTicker, MarketDataError>;
}

/// Provider serving fixed bars.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    daily: BarsByTicker,
    intraday: BarsByTicker,
}

impl InMemoryProvider {
    pub fn new(daily: BarsByTicker, intraday: BarsByTicker) -> Self {
        Self { daily, intraday }
    }

    pub fn with_daily(mut self, ticker: &str, bars: Vec<RawBar>) -> Self {
        self.daily.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_intraday(mut self, ticker: &str, bars: Vec<RawBar>) -> Self {
        self.intraday.insert(ticker.to_string(), bars);
        self
    }

    fn select(source: &BarsByTicker, tickers: &[String]) -> BarsByTicker {
        tickers
            .iter()
            .filter_map(|t| source.get(t).map(|bars| (t.clone(), bars.clone())))
            .collect()
    }
}

#[async_trait]
impl MarketDataProvider for InMemoryProvider {
    async fn daily_bars(
        &self,
        tickers: &[String],
        lookback_days: u32,
    ) -> Result<BarsByTicker, MarketDataError> {
        let lookback = lookback_days as usize;
        Ok(Self::select(&self.daily, tickers)
            .into_iter()
            .map(|(ticker, bars)| {
                let skip = bars.len().saturating_sub(lookback);
                (ticker, bars.into_iter().skip(skip).collect())
            })
            .collect())
    }

    async fn intraday_bars(&self, tickers: &[String]) -> Result<BarsByTicker, MarketDataError> {
        Ok(Self::select(&self.intraday, tickers))
    }
}
