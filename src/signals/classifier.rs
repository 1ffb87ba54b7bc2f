//! Per-family signal classification.
//!
//! Branch order and boundary inclusivity are part of the scoring contract:
//! the first matching branch wins, and exact MACD/DMI ties fall to the
//! bearish branch.

use crate::models::params::ParameterSet;
use crate::models::signal::{
    AdxSignal, DeviationSignal, DmiSignal, MacdSignal, RsiSignal, TrendSignal,
};

pub fn classify_rsi(rsi: f64, params: &ParameterSet) -> RsiSignal {
    if rsi < params.rsi_buy_threshold {
        RsiSignal::StrongBuy
    } else if rsi < params.rsi_buy_prepare_threshold {
        RsiSignal::BuyPrepare
    } else if rsi > params.rsi_sell_threshold {
        RsiSignal::StrongSell
    } else if rsi >= params.rsi_sell_prepare_threshold {
        RsiSignal::SellPrepare
    } else {
        RsiSignal::Neutral
    }
}

/// Percent distance of `price` from the short SMA. `None` when the SMA is zero.
pub fn deviation_percent(price: f64, sma_short: f64) -> Option<f64> {
    if sma_short == 0.0 {
        return None;
    }
    let deviation = 100.0 * (price - sma_short) / sma_short;
    deviation.is_finite().then_some(deviation)
}

pub fn classify_deviation(deviation: f64, params: &ParameterSet) -> DeviationSignal {
    if deviation <= params.deviation_buy_threshold {
        DeviationSignal::Buy
    } else if deviation >= params.deviation_sell_threshold {
        DeviationSignal::Sell
    } else {
        DeviationSignal::Neutral
    }
}

/// Direction of the long SMA over the last bar. Without a prior value there
/// is no direction to read.
pub fn classify_trend(sma_long: f64, prev_sma_long: Option<f64>) -> TrendSignal {
    match prev_sma_long {
        Some(prev) if sma_long > prev => TrendSignal::Upward,
        Some(prev) if sma_long < prev => TrendSignal::Downward,
        _ => TrendSignal::NoChange,
    }
}

pub fn classify_macd(macd_line: f64, macd_signal: f64) -> MacdSignal {
    if macd_line > macd_signal {
        MacdSignal::BullishCross
    } else {
        MacdSignal::BearishCross
    }
}

pub fn classify_dmi(plus_di: f64, minus_di: f64) -> DmiSignal {
    if plus_di > minus_di {
        DmiSignal::GoldenCross
    } else {
        DmiSignal::DeadCross
    }
}

pub fn classify_adx(adx: f64, plus_di: f64, minus_di: f64, params: &ParameterSet) -> AdxSignal {
    if adx > params.adx_threshold && plus_di > minus_di {
        AdxSignal::StrongUptrend
    } else if adx > params.adx_threshold && plus_di < minus_di {
        AdxSignal::StrongDowntrend
    } else {
        AdxSignal::Trendless
    }
}
