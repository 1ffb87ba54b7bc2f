use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bar as reported by a market data provider. Providers report gaps as nulls,
/// so every value is optional until the normalizer has vetted it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub timestamp: DateTime<Utc>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

impl RawBar {
    pub fn new(timestamp: DateTime<Utc>, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            high: Some(high),
            low: Some(low),
            close: Some(close),
            volume: Some(volume),
        }
    }

    /// Intraday bar where only the close matters.
    pub fn close_only(timestamp: DateTime<Utc>, close: f64) -> Self {
        Self {
            timestamp,
            high: None,
            low: None,
            close: Some(close),
            volume: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    pub fn new(timestamp: DateTime<Utc>, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Where the as-of close of a window came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "source", content = "timestamp")]
pub enum AsOfSource {
    /// Intraday bar stamped exactly at the target time of day.
    TargetTime(DateTime<Utc>),
    /// Latest intraday bar strictly before the target instant.
    PriorIntraday(DateTime<Utc>),
    /// No usable intraday bar; the last daily close is kept.
    DailyClose,
}

/// Gap-free daily series for one ticker. The last bar's close has already
/// been replaced by the as-of close.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceWindow {
    pub ticker: String,
    pub bars: Vec<PriceBar>,
    pub as_of_close: f64,
    pub as_of_source: AsOfSource,
}

impl PriceWindow {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn last_volume(&self) -> Option<f64> {
        self.bars.last().map(|b| b.volume)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsiIndicator {
    pub value: f64,
    pub period: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmaIndicator {
    pub value: f64,
    /// SMA of the same length ending one bar earlier.
    pub previous: Option<f64>,
    pub period: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacdIndicator {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
    pub period: (usize, usize, usize),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdxIndicator {
    pub value: f64,
    pub plus_di: f64,
    pub minus_di: f64,
    pub period: usize,
}

/// Every indicator value the scorer needs, taken at the final bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub rsi: f64,
    pub sma_short: f64,
    pub sma_long: f64,
    /// Long SMA one bar earlier; `None` with exactly `sma_long_length` bars.
    pub prev_sma_long: Option<f64>,
    pub macd_line: f64,
    pub macd_signal: f64,
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
}
