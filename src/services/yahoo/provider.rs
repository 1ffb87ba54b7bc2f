//! Yahoo Finance chart API provider.

use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use futures_util::stream::{self, StreamExt};
use tracing::{debug, warn};
use url::Url;

use super::messages::ChartResponse;
use crate::data::universe::provider_symbol;
use crate::models::indicators::RawBar;
use crate::services::market_data::{BarsByTicker, MarketDataError, MarketDataProvider};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

pub struct YahooProvider {
    client: reqwest::Client,
    base_url: Url,
    ticker_suffix: String,
    concurrency: usize,
    max_retries: usize,
}

impl YahooProvider {
    pub fn new(base_url: &str, ticker_suffix: &str) -> Result<Self, MarketDataError> {
        let base_url = Url::parse(base_url).map_err(|e| MarketDataError::Url(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(MarketDataError::Url(format!("{base_url} cannot be a base URL")));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url,
            ticker_suffix: ticker_suffix.to_string(),
            concurrency: 8,
            max_retries: 3,
        })
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn chart_url(&self, symbol: &str, range: &str, interval: &str) -> Result<Url, MarketDataError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| MarketDataError::Url(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        url.query_pairs_mut()
            .append_pair("range", range)
            .append_pair("interval", interval);
        Ok(url)
    }

    async fn fetch_once(&self, symbol: &str, url: &Url) -> Result<Vec<RawBar>, MarketDataError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(MarketDataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        if !status.is_success() {
            return Err(MarketDataError::Status {
                symbol: symbol.to_string(),
                status: status.as_u16(),
            });
        }
        let body: ChartResponse = response
            .json()
            .await
            .map_err(|e| MarketDataError::ResponseFormat(e.to_string()))?;
        body.into_raw_bars(symbol)
    }

    async fn fetch_chart(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<Vec<RawBar>, MarketDataError> {
        let url = self.chart_url(symbol, range, interval)?;
        let backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(500))
            .with_max_times(self.max_retries);

        (|| self.fetch_once(symbol, &url))
            .retry(backoff)
            .when(MarketDataError::is_transient)
            .notify(|err, delay| {
                warn!(symbol = %symbol, error = %err, delay_ms = delay.as_millis() as u64, "retrying chart request");
            })
            .await
    }

    /// Fetch every ticker with bounded concurrency. Failed tickers are logged
    /// and left out.
    async fn fetch_all(&self, tickers: &[String], range: &str, interval: &str) -> BarsByTicker {
        stream::iter(tickers.iter().cloned())
            .map(|ticker| async move {
                let symbol = provider_symbol(&ticker, &self.ticker_suffix);
                let result = self.fetch_chart(&symbol, range, interval).await;
                (ticker, symbol, result)
            })
            .buffer_unordered(self.concurrency)
            .filter_map(|(ticker, symbol, result)| async move {
                match result {
                    Ok(bars) if bars.is_empty() => {
                        debug!(ticker = %ticker, symbol = %symbol, interval, "no bars returned");
                        None
                    }
                    Ok(bars) => Some((ticker, bars)),
                    Err(e) => {
                        warn!(ticker = %ticker, symbol = %symbol, interval, error = %e, "chart request failed");
                        None
                    }
                }
            })
            .collect()
            .await
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    async fn daily_bars(
        &self,
        tickers: &[String],
        lookback_days: u32,
    ) -> Result<BarsByTicker, MarketDataError> {
        let range = format!("{lookback_days}d");
        Ok(self.fetch_all(tickers, &range, "1d").await)
    }

    async fn intraday_bars(&self, tickers: &[String]) -> Result<BarsByTicker, MarketDataError> {
        Ok(self.fetch_all(tickers, "1d", "1m").await)
    }
}
