//! All indicator values for one price window, taken at its final bar.

use crate::indicators::error::IndicatorError;
use crate::indicators::momentum::{calculate_macd, calculate_rsi};
use crate::indicators::trend::{calculate_adx, calculate_sma};
use crate::models::indicators::{IndicatorSnapshot, PriceWindow};
use crate::models::params::ParameterSet;

/// Compute every indicator the scorer needs. Any undefined value fails the
/// whole snapshot; nothing is substituted. The prior long SMA is absent when
/// the window holds exactly `sma_long_length` closes.
pub fn compute_snapshot(
    window: &PriceWindow,
    params: &ParameterSet,
) -> Result<IndicatorSnapshot, IndicatorError> {
    let closes = window.closes();

    let rsi = calculate_rsi(&closes, params.rsi_length)?;
    let sma_short = calculate_sma(&closes, params.sma_short_length)?;
    let sma_long = calculate_sma(&closes, params.sma_long_length)?;
    let macd = calculate_macd(&closes, params.macd_fast, params.macd_slow, params.macd_signal)?;
    let adx = calculate_adx(&window.bars, params.adx_length)?;

    Ok(IndicatorSnapshot {
        rsi: rsi.value,
        sma_short: sma_short.value,
        sma_long: sma_long.value,
        prev_sma_long: sma_long.previous,
        macd_line: macd.macd,
        macd_signal: macd.signal,
        adx: adx.value,
        plus_di: adx.plus_di,
        minus_di: adx.minus_di,
    })
}
