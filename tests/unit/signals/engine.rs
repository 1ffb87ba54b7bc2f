//! Unit tests for single-ticker evaluation

use chrono::{TimeZone, Utc};
use equiscan::error::EvaluationError;
use equiscan::models::indicators::RawBar;
use equiscan::models::signal::{
    AdxSignal, DeviationSignal, DmiSignal, MacdSignal, RsiSignal, TrendSignal,
};
use equiscan::models::ParameterSet;
use equiscan::signals::SignalEngine;

use crate::test_utils::{falling_bars, rising_bars, symmetric_bars, tokyo_close};

fn engine() -> SignalEngine {
    SignalEngine::new(ParameterSet::default(), tokyo_close())
}

#[test]
fn test_rising_series_scores() {
    let daily = rising_bars(80);
    let result = engine().evaluate_ticker("7203", Some(&daily[..]), &[]).unwrap();

    assert_eq!(result.ticker, "7203");
    assert_eq!(result.price, daily[79].close.unwrap());
    assert_eq!(result.volume, 1000.0);
    assert_eq!(result.signals.rsi, RsiSignal::StrongSell);
    assert_eq!(result.signals.deviation, DeviationSignal::Sell);
    assert_eq!(result.signals.trend, TrendSignal::Upward);
    assert_eq!(result.trend, TrendSignal::Upward);
    assert_eq!(result.signals.macd, MacdSignal::BullishCross);
    assert_eq!(result.signals.dmi, DmiSignal::GoldenCross);
    assert_eq!(result.signals.adx, AdxSignal::StrongUptrend);
    assert_eq!(result.buy_score, 6);
    assert_eq!(result.short_score, 4);
    assert_eq!(result.parameters_used, ParameterSet::default());
}

#[test]
fn test_falling_series_reads_oversold() {
    let daily = falling_bars(80);
    let result = engine().evaluate_ticker("6758", Some(&daily[..]), &[]).unwrap();

    assert_eq!(result.indicators.rsi, 0.0);
    assert_eq!(result.signals.rsi, RsiSignal::StrongBuy);
    assert_eq!(result.signals.deviation, DeviationSignal::Buy);
    assert_eq!(result.signals.trend, TrendSignal::Downward);
    assert_eq!(result.signals.dmi, DmiSignal::DeadCross);
    assert!(result.deviation < -5.0);
}

#[test]
fn test_ties_fall_to_bearish_labels() {
    let daily = symmetric_bars(80);
    let result = engine().evaluate_ticker("9984", Some(&daily[..]), &[]).unwrap();

    assert_eq!(result.deviation, 0.0);
    assert_eq!(result.signals.rsi, RsiSignal::StrongSell);
    assert_eq!(result.signals.deviation, DeviationSignal::Neutral);
    assert_eq!(result.signals.trend, TrendSignal::NoChange);
    assert_eq!(result.signals.macd, MacdSignal::BearishCross);
    assert_eq!(result.signals.dmi, DmiSignal::DeadCross);
    assert_eq!(result.signals.adx, AdxSignal::Trendless);
    assert_eq!(result.buy_score, 0);
    assert_eq!(result.short_score, 6);
}

#[test]
fn test_missing_daily_data() {
    let expected = EvaluationError::MissingPriceData {
        ticker: "8306".to_string(),
    };
    assert_eq!(
        engine().evaluate_ticker("8306", None, &[]).unwrap_err(),
        expected
    );
    assert_eq!(
        engine().evaluate_ticker("8306", Some(&[][..]), &[]).unwrap_err(),
        expected
    );
}

#[test]
fn test_history_thresholds() {
    let short = engine()
        .evaluate_ticker("7203", Some(&rising_bars(74)[..]), &[])
        .unwrap_err();
    assert!(matches!(
        short,
        EvaluationError::InsufficientHistory {
            required: 75,
            available: 74,
            ..
        }
    ));

    assert!(short.is_ticker_scoped());
    assert_eq!(short.ticker(), Some("7203"));

    let exact = engine()
        .evaluate_ticker("7203", Some(&rising_bars(75)[..]), &[])
        .unwrap();
    assert_eq!(exact.indicators.prev_sma_long, None);
    assert_eq!(exact.signals.trend, TrendSignal::NoChange);
    assert_eq!(exact.trend, TrendSignal::NoChange);
    assert_eq!(exact.signals.rsi, RsiSignal::StrongSell);
    assert_eq!(exact.signals.macd, MacdSignal::BullishCross);
    assert_eq!(exact.signals.dmi, DmiSignal::GoldenCross);
    assert_eq!(exact.signals.adx, AdxSignal::StrongUptrend);
    assert_eq!(exact.buy_score, 5);
    assert_eq!(exact.short_score, 4);

    assert!(engine()
        .evaluate_ticker("7203", Some(&rising_bars(76)[..]), &[])
        .is_ok());
}

#[test]
fn test_intraday_close_drives_price() {
    let daily = rising_bars(80);
    // 14:59 JST
    let intraday = vec![RawBar::close_only(
        Utc.with_ymd_and_hms(2024, 3, 20, 5, 59, 0).unwrap(),
        150.0,
    )];

    let base = engine().evaluate_ticker("7203", Some(&daily[..]), &[]).unwrap();
    let adjusted = engine()
        .evaluate_ticker("7203", Some(&daily[..]), &intraday)
        .unwrap();

    assert_eq!(adjusted.price, 150.0);
    assert!(adjusted.indicators.sma_short < base.indicators.sma_short);
    assert!(adjusted.deviation < base.deviation);
}

#[test]
fn test_evaluation_is_deterministic() {
    let daily = rising_bars(90);
    let first = engine().evaluate_ticker("7203", Some(&daily[..]), &[]).unwrap();
    let second = engine().evaluate_ticker("7203", Some(&daily[..]), &[]).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_custom_parameters_are_recorded() {
    let params = ParameterSet {
        sma_short_length: 5,
        sma_long_length: 20,
        ..ParameterSet::default()
    };
    let engine = SignalEngine::new(params.clone(), tokyo_close());
    let result = engine
        .evaluate_ticker("7203", Some(&rising_bars(40)[..]), &[])
        .unwrap();
    assert_eq!(result.parameters_used, params);
}
