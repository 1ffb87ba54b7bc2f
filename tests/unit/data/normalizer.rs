//! Unit tests for the price window normalizer

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use equiscan::data::normalizer::{
    build_window, clean_daily_bars, resolve_as_of_close, AsOfSettings,
};
use equiscan::error::EvaluationError;
use equiscan::models::indicators::{AsOfSource, RawBar};

use crate::test_utils::{day, rising_bars, tokyo_close};

/// Intraday bar at a Tokyo wall-clock time on 2024-03-01.
fn tokyo(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, hour - 9, minute, 0).unwrap()
}

#[test]
fn test_incomplete_rows_are_dropped() {
    let mut raw = rising_bars(5);
    raw[1].volume = None;
    raw[3].close = Some(f64::NAN);
    raw.push(RawBar::new(day(5), 1.0, -1.0, 0.5, 10.0));

    let bars = clean_daily_bars(&raw);
    assert_eq!(bars.len(), 3);
    assert_eq!(bars[0].timestamp, day(0));
    assert_eq!(bars[1].timestamp, day(2));
    assert_eq!(bars[2].timestamp, day(4));
}

#[test]
fn test_bars_are_sorted_and_deduplicated() {
    let raw = vec![
        RawBar::new(day(2), 12.0, 10.0, 11.0, 100.0),
        RawBar::new(day(0), 12.0, 10.0, 10.0, 100.0),
        RawBar::new(day(2), 13.0, 11.0, 12.5, 200.0),
        RawBar::new(day(1), 12.0, 10.0, 10.5, 100.0),
    ];
    let bars = clean_daily_bars(&raw);
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    assert_eq!(closes, vec![10.0, 10.5, 12.5]);
}

#[test]
fn test_as_of_prefers_exact_target_time() {
    let intraday = vec![
        RawBar::close_only(tokyo(14, 59), 101.0),
        RawBar::close_only(tokyo(15, 0), 102.0),
        RawBar::close_only(tokyo(15, 1), 103.0),
    ];
    let (close, source) = resolve_as_of_close(99.0, &intraday, &tokyo_close());
    assert_eq!(close, 102.0);
    assert_eq!(source, AsOfSource::TargetTime(tokyo(15, 0)));
}

#[test]
fn test_as_of_takes_latest_bar_before_target() {
    let intraday = vec![
        RawBar::close_only(tokyo(14, 58), 101.0),
        RawBar::close_only(tokyo(15, 1), 103.0),
        RawBar::close_only(tokyo(14, 59), 102.0),
    ];
    let (close, source) = resolve_as_of_close(99.0, &intraday, &tokyo_close());
    assert_eq!(close, 102.0);
    assert_eq!(source, AsOfSource::PriorIntraday(tokyo(14, 59)));
}

#[test]
fn test_as_of_keeps_daily_close_without_prior_bars() {
    let only_after = vec![RawBar::close_only(tokyo(15, 5), 103.0)];
    assert_eq!(
        resolve_as_of_close(99.0, &only_after, &tokyo_close()),
        (99.0, AsOfSource::DailyClose)
    );
    assert_eq!(
        resolve_as_of_close(99.0, &[], &tokyo_close()),
        (99.0, AsOfSource::DailyClose)
    );
}

#[test]
fn test_as_of_ignores_bars_without_close() {
    let mut gap = RawBar::close_only(tokyo(15, 0), 0.0);
    gap.close = None;
    let intraday = vec![RawBar::close_only(tokyo(14, 30), 100.5), gap];
    let (close, source) = resolve_as_of_close(99.0, &intraday, &tokyo_close());
    assert_eq!(close, 100.5);
    assert_eq!(source, AsOfSource::PriorIntraday(tokyo(14, 30)));
}

#[test]
fn test_as_of_only_considers_latest_session() {
    // 14:30 JST the previous day, then only post-target bars today.
    let yesterday = Utc.with_ymd_and_hms(2024, 2, 29, 5, 30, 0).unwrap();
    let intraday = vec![
        RawBar::close_only(yesterday, 98.0),
        RawBar::close_only(tokyo(15, 10), 103.0),
    ];
    assert_eq!(
        resolve_as_of_close(99.0, &intraday, &tokyo_close()),
        (99.0, AsOfSource::DailyClose)
    );
}

#[test]
fn test_custom_target_time() {
    let settings = AsOfSettings::new(
        NaiveTime::from_hms_opt(11, 30, 0).unwrap(),
        tokyo_close().exchange_offset,
    );
    let intraday = vec![
        RawBar::close_only(tokyo(11, 29), 100.0),
        RawBar::close_only(tokyo(11, 30), 101.0),
        RawBar::close_only(tokyo(15, 0), 102.0),
    ];
    let (close, _) = resolve_as_of_close(99.0, &intraday, &settings);
    assert_eq!(close, 101.0);
}

#[test]
fn test_build_window_replaces_only_last_close() {
    let daily = rising_bars(80);
    let last = daily.last().cloned().unwrap();
    let intraday = vec![RawBar::close_only(tokyo(14, 59), 250.0)];

    let window = build_window("7203", &daily, &intraday, 75, &tokyo_close()).unwrap();
    let final_bar = window.bars.last().unwrap();

    assert_eq!(window.as_of_close, 250.0);
    assert_eq!(final_bar.close, 250.0);
    assert_eq!(Some(final_bar.high), last.high);
    assert_eq!(Some(final_bar.low), last.low);
    assert_eq!(Some(final_bar.volume), last.volume);
    assert_eq!(window.bars[78].close, daily[78].close.unwrap());
}

#[test]
fn test_build_window_excludes_short_history() {
    let err = build_window("7203", &rising_bars(74), &[], 75, &tokyo_close()).unwrap_err();
    assert_eq!(
        err,
        EvaluationError::InsufficientHistory {
            ticker: "7203".to_string(),
            required: 75,
            available: 74,
        }
    );
    assert!(build_window("7203", &rising_bars(75), &[], 75, &tokyo_close()).is_ok());
}

#[test]
fn test_dropped_rows_count_against_history() {
    let mut daily = rising_bars(75);
    daily[10].high = None;
    let err = build_window("7203", &daily, &[], 75, &tokyo_close()).unwrap_err();
    assert!(matches!(
        err,
        EvaluationError::InsufficientHistory { available: 74, .. }
    ));
}
