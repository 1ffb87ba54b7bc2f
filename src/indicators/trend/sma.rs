//! SMA (Simple Moving Average) indicator

use crate::common::math;
use crate::indicators::error::{finite, require_bars, require_period, IndicatorError};
use crate::models::indicators::SmaIndicator;

const NAME: &str = "SMA";

/// SMA of the last `period` closes, with the value one bar earlier when the
/// series is long enough to have one.
pub fn calculate_sma(closes: &[f64], period: usize) -> Result<SmaIndicator, IndicatorError> {
    require_period(NAME, period)?;
    require_bars(NAME, period, closes.len())?;

    let series = math::sma_series(closes, period);
    let value = math::last_defined(&series).ok_or(IndicatorError::Undefined {
        indicator: NAME,
        reason: "no value at the last bar",
    })?;
    let previous = series
        .len()
        .checked_sub(2)
        .and_then(|i| series[i])
        .map(|v| finite(NAME, v))
        .transpose()?;

    Ok(SmaIndicator {
        value: finite(NAME, value)?,
        previous,
        period,
    })
}
