//! Unit tests for per-family classification boundaries

use equiscan::models::signal::{
    AdxSignal, DeviationSignal, DmiSignal, MacdSignal, RsiSignal, TrendSignal,
};
use equiscan::models::ParameterSet;
use equiscan::signals::classifier::*;

#[test]
fn test_rsi_boundaries() {
    let p = ParameterSet::default();
    assert_eq!(classify_rsi(24.99, &p), RsiSignal::StrongBuy);
    assert_eq!(classify_rsi(25.0, &p), RsiSignal::BuyPrepare);
    assert_eq!(classify_rsi(39.99, &p), RsiSignal::BuyPrepare);
    assert_eq!(classify_rsi(40.0, &p), RsiSignal::Neutral);
    assert_eq!(classify_rsi(59.99, &p), RsiSignal::Neutral);
    assert_eq!(classify_rsi(60.0, &p), RsiSignal::SellPrepare);
    assert_eq!(classify_rsi(75.0, &p), RsiSignal::SellPrepare);
    assert_eq!(classify_rsi(75.01, &p), RsiSignal::StrongSell);
    assert_eq!(classify_rsi(100.0, &p), RsiSignal::StrongSell);
}

#[test]
fn test_deviation_boundaries_are_inclusive() {
    let p = ParameterSet::default();
    assert_eq!(classify_deviation(-5.0, &p), DeviationSignal::Buy);
    assert_eq!(classify_deviation(-4.99, &p), DeviationSignal::Neutral);
    assert_eq!(classify_deviation(0.0, &p), DeviationSignal::Neutral);
    assert_eq!(classify_deviation(5.0, &p), DeviationSignal::Sell);
}

#[test]
fn test_deviation_percent() {
    assert!((deviation_percent(105.0, 100.0).unwrap() - 5.0).abs() < 1e-12);
    assert!((deviation_percent(90.0, 100.0).unwrap() + 10.0).abs() < 1e-12);
    assert_eq!(deviation_percent(10.0, 0.0), None);
}

#[test]
fn test_trend_direction() {
    assert_eq!(classify_trend(101.0, Some(100.0)), TrendSignal::Upward);
    assert_eq!(classify_trend(99.0, Some(100.0)), TrendSignal::Downward);
    assert_eq!(classify_trend(100.0, Some(100.0)), TrendSignal::NoChange);
    assert_eq!(classify_trend(101.0, None), TrendSignal::NoChange);
}

#[test]
fn test_macd_tie_is_bearish() {
    assert_eq!(classify_macd(0.5, 0.4), MacdSignal::BullishCross);
    assert_eq!(classify_macd(0.4, 0.4), MacdSignal::BearishCross);
    assert_eq!(classify_macd(-1.0, 0.0), MacdSignal::BearishCross);
}

#[test]
fn test_dmi_tie_is_dead_cross() {
    assert_eq!(classify_dmi(30.0, 20.0), DmiSignal::GoldenCross);
    assert_eq!(classify_dmi(20.0, 20.0), DmiSignal::DeadCross);
    assert_eq!(classify_dmi(0.0, 0.0), DmiSignal::DeadCross);
}

#[test]
fn test_adx_strength_and_direction() {
    let p = ParameterSet::default();
    assert_eq!(classify_adx(30.0, 30.0, 10.0, &p), AdxSignal::StrongUptrend);
    assert_eq!(classify_adx(30.0, 10.0, 30.0, &p), AdxSignal::StrongDowntrend);
    assert_eq!(classify_adx(30.0, 20.0, 20.0, &p), AdxSignal::Trendless);
    assert_eq!(classify_adx(25.0, 30.0, 10.0, &p), AdxSignal::Trendless);
    assert_eq!(classify_adx(10.0, 10.0, 30.0, &p), AdxSignal::Trendless);
}

#[test]
fn test_thresholds_come_from_parameters() {
    let p = ParameterSet {
        rsi_buy_threshold: 30.0,
        adx_threshold: 40.0,
        ..ParameterSet::default()
    };
    assert_eq!(classify_rsi(28.0, &p), RsiSignal::StrongBuy);
    assert_eq!(classify_adx(35.0, 30.0, 10.0, &p), AdxSignal::Trendless);
}
