//! Yahoo v8 chart API response payloads.

use chrono::DateTime;
use serde::Deserialize;

use crate::models::indicators::RawBar;
use crate::services::market_data::MarketDataError;

#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Debug, Deserialize)]
pub struct Chart {
    pub result: Option<Vec<ChartData>>,
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartData {
    pub timestamp: Option<Vec<i64>>,
    pub indicators: Indicators,
}

#[derive(Debug, Deserialize)]
pub struct Indicators {
    pub quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Quote {
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
    pub close: Vec<Option<f64>>,
    pub volume: Vec<Option<f64>>,
}

impl ChartResponse {
    /// Flatten the first chart result into bars. Rows with every value null
    /// (market holidays) are skipped; partially null rows are kept for the
    /// normalizer to judge.
    pub fn into_raw_bars(self, symbol: &str) -> Result<Vec<RawBar>, MarketDataError> {
        let data = match (self.chart.result, self.chart.error) {
            (Some(results), _) => results.into_iter().next(),
            (None, Some(err)) if err.code == "Not Found" => {
                return Err(MarketDataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                })
            }
            (None, Some(err)) => {
                return Err(MarketDataError::ResponseFormat(format!(
                    "{}: {}",
                    err.code, err.description
                )))
            }
            (None, None) => None,
        }
        .ok_or_else(|| MarketDataError::ResponseFormat("empty chart result".into()))?;

        // A symbol with no trades in range has no timestamp array at all.
        let Some(timestamps) = data.timestamp else {
            return Ok(Vec::new());
        };
        let quote = data.indicators.quote.into_iter().next().unwrap_or_default();
        let at = |series: &[Option<f64>], i: usize| series.get(i).copied().flatten();

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let timestamp = DateTime::from_timestamp(ts, 0).ok_or_else(|| {
                MarketDataError::ResponseFormat(format!("invalid timestamp {ts}"))
            })?;
            let bar = RawBar {
                timestamp,
                high: at(&quote.high, i),
                low: at(&quote.low, i),
                close: at(&quote.close, i),
                volume: at(&quote.volume, i),
            };
            if bar.high.is_none() && bar.low.is_none() && bar.close.is_none() && bar.volume.is_none()
            {
                continue;
            }
            bars.push(bar);
        }
        Ok(bars)
    }
}
