//! RSI (Relative Strength Index) indicator

use crate::common::math;
use crate::indicators::error::{finite, require_bars, require_period, IndicatorError};
use crate::models::indicators::RsiIndicator;

const NAME: &str = "RSI";

/// RSI series over closes using Wilder-smoothed average gain and loss.
///
/// RSI = 100 - (100 / (1 + RS))
/// RS = Average Gain / Average Loss
///
/// A zero average loss saturates the RSI at 100.
pub fn rsi_series(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() < period + 1 {
        return out;
    }

    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|pair| {
            let change = pair[1] - pair[0];
            if change > 0.0 {
                (change, 0.0)
            } else {
                (0.0, -change)
            }
        })
        .unzip();

    let avg_gains = math::wilder_series(&gains, period);
    let avg_losses = math::wilder_series(&losses, period);

    for (i, (gain, loss)) in avg_gains.iter().zip(&avg_losses).enumerate() {
        if let (Some(gain), Some(loss)) = (gain, loss) {
            out[i + 1] = Some(rsi_from_averages(*gain, *loss));
        }
    }
    out
}

pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

/// RSI at the last close.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Result<RsiIndicator, IndicatorError> {
    require_period(NAME, period)?;
    require_bars(NAME, period + 1, closes.len())?;

    let value = math::last_defined(&rsi_series(closes, period)).ok_or(IndicatorError::Undefined {
        indicator: NAME,
        reason: "no value at the last bar",
    })?;

    Ok(RsiIndicator {
        value: finite(NAME, value)?,
        period,
    })
}
