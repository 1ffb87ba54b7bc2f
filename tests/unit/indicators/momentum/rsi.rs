//! Unit tests for RSI

use equiscan::indicators::momentum::{calculate_rsi, rsi_series};
use equiscan::indicators::IndicatorError;

#[test]
fn test_rsi_series_alternating_closes() {
    let out = rsi_series(&[10.0, 11.0, 10.0, 11.0, 10.0], 2);
    assert_eq!(out[0], None);
    assert_eq!(out[1], None);
    assert!((out[2].unwrap() - 50.0).abs() < 1e-9);
    assert!((out[3].unwrap() - 75.0).abs() < 1e-9);
    assert!((out[4].unwrap() - 37.5).abs() < 1e-9);
}

#[test]
fn test_calculate_rsi_takes_last_value() {
    let rsi = calculate_rsi(&[10.0, 11.0, 10.0, 11.0, 10.0], 2).unwrap();
    assert!((rsi.value - 37.5).abs() < 1e-9);
    assert_eq!(rsi.period, 2);
}

#[test]
fn test_rsi_saturates_without_losses() {
    let rising: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
    assert_eq!(calculate_rsi(&rising, 14).unwrap().value, 100.0);

    let flat = vec![50.0; 20];
    assert_eq!(calculate_rsi(&flat, 14).unwrap().value, 100.0);
}

#[test]
fn test_rsi_is_zero_without_gains() {
    let falling: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
    assert_eq!(calculate_rsi(&falling, 14).unwrap().value, 0.0);
}

#[test]
fn test_rsi_needs_period_plus_one_closes() {
    let err = calculate_rsi(&[1.0, 2.0], 2).unwrap_err();
    assert_eq!(
        err,
        IndicatorError::InsufficientData {
            indicator: "RSI",
            required: 3,
            available: 2,
        }
    );
    assert!(calculate_rsi(&[1.0, 2.0, 3.0], 2).is_ok());
}

#[test]
fn test_rsi_rejects_zero_period() {
    assert!(matches!(
        calculate_rsi(&[1.0, 2.0, 3.0], 0),
        Err(IndicatorError::InvalidPeriod { .. })
    ));
}
