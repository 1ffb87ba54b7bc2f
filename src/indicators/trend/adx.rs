//! ADX (Average Directional Index) indicator with the DMI lines.
//!
//! 1. +DM / -DM from consecutive highs and lows (zero unless one direction
//!    strictly dominates and is positive)
//! 2. Wilder smoothing of +DM, -DM and true range
//! 3. +DI = 100 * smoothed(+DM) / smoothed(TR), -DI likewise
//! 4. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 5. ADX = Wilder-smoothed DX
//!
//! Lookback: 2 * period bars.

use crate::common::math;
use crate::indicators::error::{finite, require_bars, require_period, IndicatorError};
use crate::models::indicators::{AdxIndicator, PriceBar};

const NAME: &str = "ADX";

/// Directional movement of `bar` relative to `prev` as `(+DM, -DM)`.
pub fn directional_movement(prev: &PriceBar, bar: &PriceBar) -> (f64, f64) {
    let up = bar.high - prev.high;
    let down = prev.low - bar.low;
    let plus_dm = if up > down && up > 0.0 { up } else { 0.0 };
    let minus_dm = if down > up && down > 0.0 { down } else { 0.0 };
    (plus_dm, minus_dm)
}

/// Per-bar DMI/ADX values. Index 0 of every series is always `None`.
#[derive(Debug, Clone, Default)]
pub struct AdxSeries {
    pub plus_di: Vec<Option<f64>>,
    pub minus_di: Vec<Option<f64>>,
    pub dx: Vec<Option<f64>>,
    pub adx: Vec<Option<f64>>,
}

pub fn adx_series(bars: &[PriceBar], period: usize) -> AdxSeries {
    let n = bars.len();
    let mut series = AdxSeries {
        plus_di: vec![None; n],
        minus_di: vec![None; n],
        dx: vec![None; n],
        adx: vec![None; n],
    };
    if period == 0 || n < 2 {
        return series;
    }

    let mut tr = Vec::with_capacity(n - 1);
    let mut plus_dm = Vec::with_capacity(n - 1);
    let mut minus_dm = Vec::with_capacity(n - 1);
    for pair in bars.windows(2) {
        let (prev, bar) = (&pair[0], &pair[1]);
        let (plus, minus) = directional_movement(prev, bar);
        tr.push(math::true_range(bar.high, bar.low, prev.close));
        plus_dm.push(plus);
        minus_dm.push(minus);
    }

    let smooth_tr = math::wilder_series(&tr, period);
    let smooth_plus = math::wilder_series(&plus_dm, period);
    let smooth_minus = math::wilder_series(&minus_dm, period);

    for i in 0..tr.len() {
        let (Some(tr), Some(plus), Some(minus)) = (smooth_tr[i], smooth_plus[i], smooth_minus[i])
        else {
            continue;
        };
        // Zero true range leaves the DI lines undefined.
        if tr == 0.0 {
            continue;
        }
        let plus_di = 100.0 * plus / tr;
        let minus_di = 100.0 * minus / tr;
        let di_sum = plus_di + minus_di;
        let dx = if di_sum == 0.0 {
            0.0
        } else {
            100.0 * (plus_di - minus_di).abs() / di_sum
        };

        series.plus_di[i + 1] = Some(plus_di);
        series.minus_di[i + 1] = Some(minus_di);
        series.dx[i + 1] = Some(dx);
    }

    series.adx = adx_from_dx(&series.dx, period);
    series
}

// A hole in DX after its first defined value leaves the ADX undefined from
// there on instead of bridging the gap.
fn adx_from_dx(dx: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let Some(start) = dx.iter().position(Option::is_some) else {
        return vec![None; dx.len()];
    };
    let contiguous = dx[start..]
        .iter()
        .take_while(|v| v.is_some())
        .count();
    let mut out = math::on_defined_tail(&dx[..start + contiguous], |tail| {
        math::wilder_series(tail, period)
    });
    out.resize(dx.len(), None);
    out
}

pub fn adx_required_bars(period: usize) -> usize {
    2 * period
}

/// ADX, +DI and -DI at the last bar.
pub fn calculate_adx(bars: &[PriceBar], period: usize) -> Result<AdxIndicator, IndicatorError> {
    require_period(NAME, period)?;
    require_bars(NAME, adx_required_bars(period), bars.len())?;

    let series = adx_series(bars, period);
    let (Some(plus_di), Some(minus_di)) = (
        math::last_defined(&series.plus_di),
        math::last_defined(&series.minus_di),
    ) else {
        return Err(IndicatorError::Undefined {
            indicator: NAME,
            reason: "smoothed true range is zero",
        });
    };
    let value = math::last_defined(&series.adx).ok_or(IndicatorError::Undefined {
        indicator: NAME,
        reason: "directional index undefined inside the smoothing window",
    })?;

    Ok(AdxIndicator {
        value: finite(NAME, value)?,
        plus_di: finite(NAME, plus_di)?,
        minus_di: finite(NAME, minus_di)?,
        period,
    })
}
