//! MACD (Moving Average Convergence Divergence) indicator

use crate::common::math;
use crate::indicators::error::{finite, require_bars, require_period, IndicatorError};
use crate::models::indicators::MacdIndicator;

const NAME: &str = "MACD";

/// MACD line and signal series aligned with `closes`.
///
/// MACD = EMA(fast) - EMA(slow)
/// Signal = EMA(signal) of MACD, starting from the first defined MACD value
pub fn macd_series(
    closes: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let fast = math::ema_series(closes, fast_period);
    let slow = math::ema_series(closes, slow_period);

    let line: Vec<Option<f64>> = fast
        .iter()
        .zip(&slow)
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    let signal = math::on_defined_tail(&line, |tail| math::ema_series(tail, signal_period));
    (line, signal)
}

/// Bars needed before the signal line is defined at the last bar.
pub fn macd_required_bars(slow_period: usize, signal_period: usize) -> usize {
    slow_period + signal_period - 1
}

/// MACD values at the last close.
pub fn calculate_macd(
    closes: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> Result<MacdIndicator, IndicatorError> {
    require_period(NAME, fast_period)?;
    require_period(NAME, slow_period)?;
    require_period(NAME, signal_period)?;
    require_bars(NAME, macd_required_bars(slow_period, signal_period), closes.len())?;

    let (line, signal) = macd_series(closes, fast_period, slow_period, signal_period);
    let undefined = IndicatorError::Undefined {
        indicator: NAME,
        reason: "no value at the last bar",
    };
    let macd = finite(NAME, math::last_defined(&line).ok_or_else(|| undefined.clone())?)?;
    let signal = finite(NAME, math::last_defined(&signal).ok_or(undefined)?)?;

    Ok(MacdIndicator {
        macd,
        signal,
        histogram: macd - signal,
        period: (fast_period, slow_period, signal_period),
    })
}
