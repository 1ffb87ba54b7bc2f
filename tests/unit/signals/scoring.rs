//! Unit tests for additive scoring

use equiscan::indicators::IndicatorError;
use equiscan::models::indicators::IndicatorSnapshot;
use equiscan::models::signal::{
    AdxSignal, DeviationSignal, DmiSignal, MacdSignal, RsiSignal, TrendSignal,
};
use equiscan::models::ParameterSet;
use equiscan::signals::scoring::{ScoreDelta, Scored, SignalScorer};

fn snapshot() -> IndicatorSnapshot {
    IndicatorSnapshot {
        rsi: 50.0,
        sma_short: 100.0,
        sma_long: 100.0,
        prev_sma_long: Some(100.0),
        macd_line: 0.0,
        macd_signal: 0.0,
        adx: 10.0,
        plus_di: 20.0,
        minus_di: 20.0,
    }
}

#[test]
fn test_label_deltas() {
    assert_eq!(RsiSignal::StrongBuy.delta(), ScoreDelta::buy(2));
    assert_eq!(RsiSignal::BuyPrepare.delta(), ScoreDelta::buy(1));
    assert_eq!(RsiSignal::StrongSell.delta(), ScoreDelta::short(2));
    assert_eq!(RsiSignal::SellPrepare.delta(), ScoreDelta::short(1));
    assert_eq!(RsiSignal::Neutral.delta(), ScoreDelta::NONE);
    assert_eq!(DeviationSignal::Buy.delta(), ScoreDelta::buy(2));
    assert_eq!(DeviationSignal::Sell.delta(), ScoreDelta::short(2));
    assert_eq!(TrendSignal::Upward.delta(), ScoreDelta::buy(1));
    assert_eq!(TrendSignal::Downward.delta(), ScoreDelta::short(1));
    assert_eq!(TrendSignal::NoChange.delta(), ScoreDelta::NONE);
    assert_eq!(MacdSignal::BullishCross.delta(), ScoreDelta::buy(2));
    assert_eq!(MacdSignal::BearishCross.delta(), ScoreDelta::short(2));
    assert_eq!(DmiSignal::GoldenCross.delta(), ScoreDelta::buy(2));
    assert_eq!(DmiSignal::DeadCross.delta(), ScoreDelta::short(2));
    assert_eq!(AdxSignal::StrongUptrend.delta(), ScoreDelta::buy(1));
    assert_eq!(AdxSignal::StrongDowntrend.delta(), ScoreDelta::short(1));
    assert_eq!(AdxSignal::Trendless.delta(), ScoreDelta::NONE);
}

#[test]
fn test_neutral_snapshot_scores_only_tie_breaks() {
    let params = ParameterSet::default();
    let scored = SignalScorer::new(&params).score(&snapshot(), 100.0).unwrap();

    assert_eq!(scored.signals.rsi, RsiSignal::Neutral);
    assert_eq!(scored.signals.deviation, DeviationSignal::Neutral);
    assert_eq!(scored.signals.trend, TrendSignal::NoChange);
    assert_eq!(scored.signals.macd, MacdSignal::BearishCross);
    assert_eq!(scored.signals.dmi, DmiSignal::DeadCross);
    assert_eq!(scored.signals.adx, AdxSignal::Trendless);
    assert_eq!(scored.buy_score, 0);
    assert_eq!(scored.short_score, 4);
}

#[test]
fn test_buy_and_short_can_both_score() {
    let params = ParameterSet::default();
    let snap = IndicatorSnapshot {
        rsi: 20.0,
        sma_long: 101.0,
        macd_line: 1.0,
        ..snapshot()
    };
    // Price 6% above the short SMA.
    let scored = SignalScorer::new(&params).score(&snap, 106.0).unwrap();

    assert_eq!(scored.signals.rsi, RsiSignal::StrongBuy);
    assert_eq!(scored.signals.deviation, DeviationSignal::Sell);
    assert!((scored.deviation - 6.0).abs() < 1e-9);
    assert_eq!(scored.buy_score, 2 + 1 + 2);
    assert_eq!(scored.short_score, 2 + 2);
}

#[test]
fn test_totals_equal_sum_of_family_deltas() {
    let params = ParameterSet::default();
    let snap = IndicatorSnapshot {
        rsi: 65.0,
        sma_long: 99.0,
        adx: 40.0,
        plus_di: 10.0,
        minus_di: 30.0,
        ..snapshot()
    };
    let scored = SignalScorer::new(&params).score(&snap, 94.0).unwrap();
    let s = scored.signals;
    let expected = s.rsi.delta() + s.deviation.delta() + s.trend.delta() + s.macd.delta()
        + s.dmi.delta()
        + s.adx.delta();

    assert_eq!(scored.buy_score, expected.buy);
    assert_eq!(scored.short_score, expected.short);
    assert_eq!(s.delta(), expected);
    // buy: deviation 2; short: rsi 1, trend 1, macd 2, dmi 2, adx 1
    assert_eq!((scored.buy_score, scored.short_score), (2, 7));
}

#[test]
fn test_zero_short_sma_is_undefined() {
    let params = ParameterSet::default();
    let snap = IndicatorSnapshot {
        sma_short: 0.0,
        ..snapshot()
    };
    assert!(matches!(
        SignalScorer::new(&params).score(&snap, 1.0),
        Err(IndicatorError::Undefined { indicator: "deviation", .. })
    ));
}
