//! Builds clean per-ticker price windows and resolves the as-of close.

use chrono::{DateTime, FixedOffset, NaiveTime, Offset, TimeZone, Utc};
use tracing::debug;

use crate::error::EvaluationError;
use crate::models::indicators::{AsOfSource, PriceBar, PriceWindow, RawBar};

/// Valuation instant for the as-of close: a time of day in a fixed exchange
/// time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsOfSettings {
    pub target_time: NaiveTime,
    pub exchange_offset: FixedOffset,
}

impl AsOfSettings {
    pub fn new(target_time: NaiveTime, exchange_offset: FixedOffset) -> Self {
        Self {
            target_time,
            exchange_offset,
        }
    }
}

impl Default for AsOfSettings {
    /// 15:00 at UTC+9.
    fn default() -> Self {
        Self {
            target_time: NaiveTime::from_hms_opt(15, 0, 0).unwrap_or_default(),
            exchange_offset: FixedOffset::east_opt(9 * 3600).unwrap_or_else(|| Utc.fix()),
        }
    }
}

fn usable(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v >= 0.0)
}

/// Drop incomplete rows, order by timestamp, keep the last bar reported for a
/// duplicated timestamp.
pub fn clean_daily_bars(raw: &[RawBar]) -> Vec<PriceBar> {
    let mut bars: Vec<PriceBar> = raw
        .iter()
        .filter_map(|bar| {
            Some(PriceBar::new(
                bar.timestamp,
                usable(bar.high)?,
                usable(bar.low)?,
                usable(bar.close)?,
                usable(bar.volume)?,
            ))
        })
        .collect();
    bars.sort_by_key(|bar| bar.timestamp);

    let mut deduped: Vec<PriceBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match deduped.last_mut() {
            Some(last) if last.timestamp == bar.timestamp => *last = bar,
            _ => deduped.push(bar),
        }
    }
    deduped
}

/// Pick the close that values the window at the target time of day.
///
/// The session is the exchange-local date of the latest intraday bar. A bar
/// stamped exactly at the target time wins; otherwise the latest bar strictly
/// before the target instant; otherwise `daily_close` is kept.
pub fn resolve_as_of_close(
    daily_close: f64,
    intraday: &[RawBar],
    settings: &AsOfSettings,
) -> (f64, AsOfSource) {
    let offset = settings.exchange_offset;
    let mut quotes: Vec<(DateTime<Utc>, f64)> = intraday
        .iter()
        .filter_map(|bar| Some((bar.timestamp, usable(bar.close)?)))
        .collect();
    quotes.sort_by_key(|(timestamp, _)| *timestamp);

    let Some(&(latest, _)) = quotes.last() else {
        return (daily_close, AsOfSource::DailyClose);
    };
    let session_date = latest.with_timezone(&offset).date_naive();
    let Some(target) = offset
        .from_local_datetime(&session_date.and_time(settings.target_time))
        .single()
        .map(|t| t.with_timezone(&Utc))
    else {
        return (daily_close, AsOfSource::DailyClose);
    };

    let session: Vec<&(DateTime<Utc>, f64)> = quotes
        .iter()
        .filter(|(timestamp, _)| timestamp.with_timezone(&offset).date_naive() == session_date)
        .collect();

    if let Some(&&(timestamp, close)) = session
        .iter()
        .find(|(timestamp, _)| timestamp.with_timezone(&offset).time() == settings.target_time)
    {
        return (close, AsOfSource::TargetTime(timestamp));
    }

    if let Some(&&(timestamp, close)) = session
        .iter()
        .filter(|(timestamp, _)| *timestamp < target)
        .last()
    {
        return (close, AsOfSource::PriorIntraday(timestamp));
    }

    (daily_close, AsOfSource::DailyClose)
}

/// Build the window for one ticker. Fewer than `min_bars` usable daily bars
/// excludes the ticker.
pub fn build_window(
    ticker: &str,
    daily: &[RawBar],
    intraday: &[RawBar],
    min_bars: usize,
    settings: &AsOfSettings,
) -> Result<PriceWindow, EvaluationError> {
    let mut bars = clean_daily_bars(daily);
    let dropped = daily.len() - bars.len();

    let insufficient = |available: usize| EvaluationError::InsufficientHistory {
        ticker: ticker.to_string(),
        required: min_bars.max(1),
        available,
    };
    if bars.len() < min_bars {
        return Err(insufficient(bars.len()));
    }
    let last = bars.last_mut().ok_or_else(|| insufficient(0))?;

    let (as_of_close, as_of_source) = resolve_as_of_close(last.close, intraday, settings);
    last.close = as_of_close;

    debug!(
        ticker = %ticker,
        bars = bars.len(),
        dropped,
        as_of_close,
        as_of_source = ?as_of_source,
        "built price window for {}",
        ticker
    );

    Ok(PriceWindow {
        ticker: ticker.to_string(),
        bars,
        as_of_close,
        as_of_source,
    })
}
