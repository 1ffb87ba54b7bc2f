//! Unit tests for ADX / DMI

use equiscan::indicators::trend::{adx_required_bars, adx_series, calculate_adx, directional_movement};
use equiscan::indicators::IndicatorError;

use crate::test_utils::{bar, price_bars, rising_bars, symmetric_bars};

fn sample_bars() -> Vec<equiscan::models::indicators::PriceBar> {
    vec![
        bar(10.0, 8.0, 9.0),
        bar(12.0, 9.0, 11.0),
        bar(13.0, 10.0, 12.0),
        bar(12.0, 8.0, 9.0),
    ]
}

#[test]
fn test_directional_movement_requires_strict_dominance() {
    assert_eq!(directional_movement(&bar(10.0, 8.0, 9.0), &bar(12.0, 9.0, 11.0)), (2.0, 0.0));
    assert_eq!(directional_movement(&bar(13.0, 10.0, 12.0), &bar(12.0, 8.0, 9.0)), (0.0, 2.0));
    // Equal expansion both ways cancels out.
    assert_eq!(directional_movement(&bar(11.0, 9.0, 10.0), &bar(12.0, 8.0, 10.0)), (0.0, 0.0));
    // Inside bar.
    assert_eq!(directional_movement(&bar(12.0, 8.0, 10.0), &bar(11.0, 9.0, 10.0)), (0.0, 0.0));
}

#[test]
fn test_adx_hand_computed_values() {
    let adx = calculate_adx(&sample_bars(), 2).unwrap();
    assert!((adx.plus_di - 150.0 / 7.0).abs() < 1e-9);
    assert!((adx.minus_di - 200.0 / 7.0).abs() < 1e-9);
    assert!((adx.value - 400.0 / 7.0).abs() < 1e-9);
}

#[test]
fn test_adx_series_first_dx_values() {
    let series = adx_series(&sample_bars(), 2);
    assert_eq!(series.dx[0], None);
    assert_eq!(series.dx[1], None);
    assert!((series.dx[2].unwrap() - 100.0).abs() < 1e-9);
    assert!((series.dx[3].unwrap() - 100.0 / 7.0).abs() < 1e-9);
    assert_eq!(series.adx[2], None);
}

#[test]
fn test_adx_needs_twice_the_period() {
    assert_eq!(adx_required_bars(14), 28);
    let err = calculate_adx(&sample_bars()[..3], 2).unwrap_err();
    assert!(matches!(err, IndicatorError::InsufficientData { required: 4, .. }));
}

#[test]
fn test_adx_uptrend_has_no_negative_movement() {
    let adx = calculate_adx(&price_bars(&rising_bars(40)), 14).unwrap();
    assert_eq!(adx.minus_di, 0.0);
    assert!(adx.plus_di > 0.0);
    assert!((adx.value - 100.0).abs() < 1e-9);
}

#[test]
fn test_adx_balanced_movement_is_zero() {
    let adx = calculate_adx(&price_bars(&symmetric_bars(40)), 14).unwrap();
    assert_eq!(adx.plus_di, 0.0);
    assert_eq!(adx.minus_di, 0.0);
    assert_eq!(adx.value, 0.0);
}

#[test]
fn test_adx_undefined_for_zero_true_range() {
    let flat: Vec<_> = (0..10).map(|_| bar(10.0, 10.0, 10.0)).collect();
    assert!(matches!(
        calculate_adx(&flat, 3),
        Err(IndicatorError::Undefined { indicator: "ADX", .. })
    ));
}
