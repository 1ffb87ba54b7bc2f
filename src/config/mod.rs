//! Environment-driven configuration.
//!
//! Values are read from the process environment (optionally seeded from a
//! `.env` file by the binaries). Accessors fall back to defaults when a
//! variable is unset; malformed values are reported as [`ConfigError`].

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{FixedOffset, NaiveTime};
use thiserror::Error;

use crate::data::normalizer::AsOfSettings;
use crate::signals::ranking::DEFAULT_BENCHMARK;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(name: &'static str, value: &str, reason: impl ToString) -> Self {
        ConfigError::Invalid {
            name,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "development".to_string())
}

pub fn get_database_url() -> Option<String> {
    non_empty("DATABASE_URL")
}

pub fn get_port() -> Result<u16, ConfigError> {
    parse_or("PORT", DEFAULT_PORT)
}

pub fn get_analysis_schedule() -> Option<String> {
    non_empty("ANALYSIS_SCHEDULE")
}

pub fn get_yahoo_base_url() -> String {
    non_empty("YAHOO_BASE_URL").unwrap_or_else(|| DEFAULT_YAHOO_BASE_URL.to_string())
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    match non_empty(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e: T::Err| ConfigError::invalid(name, &raw, e)),
        None => Ok(default),
    }
}

/// Parse `HH:MM` or `HH:MM:SS`.
pub fn parse_target_time(raw: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|e| ConfigError::invalid("TARGET_TIME", raw, e))
}

pub fn parse_utc_offset(hours: i32) -> Result<FixedOffset, ConfigError> {
    FixedOffset::east_opt(hours * 3600).ok_or_else(|| {
        ConfigError::invalid(
            "EXCHANGE_UTC_OFFSET_HOURS",
            &hours.to_string(),
            "offset out of range",
        )
    })
}

/// Settings for one analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub tickers_csv: PathBuf,
    pub ticker_suffix: String,
    pub benchmark: String,
    pub as_of: AsOfSettings,
    pub daily_lookback_days: u32,
    pub worker_threads: Option<usize>,
    pub fetch_concurrency: usize,
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tickers_csv: PathBuf::from("data/csv/tickers.csv"),
            ticker_suffix: ".T".to_string(),
            benchmark: DEFAULT_BENCHMARK.to_string(),
            as_of: AsOfSettings::default(),
            daily_lookback_days: 100,
            worker_threads: None,
            fetch_concurrency: 8,
            snapshot_dir: Some(PathBuf::from("data/json")),
        }
    }
}

impl AnalysisConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let target_time = match non_empty("TARGET_TIME") {
            Some(raw) => parse_target_time(&raw)?,
            None => defaults.as_of.target_time,
        };
        let exchange_offset = match non_empty("EXCHANGE_UTC_OFFSET_HOURS") {
            Some(_) => parse_utc_offset(parse_or("EXCHANGE_UTC_OFFSET_HOURS", 9)?)?,
            None => defaults.as_of.exchange_offset,
        };

        let worker_threads = match non_empty("WORKER_THREADS") {
            Some(_) => Some(parse_or::<usize>("WORKER_THREADS", 1)?).filter(|n| *n > 0),
            None => None,
        };

        // An empty SNAPSHOT_DIR disables snapshot export.
        let snapshot_dir = match env::var("SNAPSHOT_DIR") {
            Ok(raw) if raw.trim().is_empty() => None,
            Ok(raw) => Some(PathBuf::from(raw.trim())),
            Err(_) => defaults.snapshot_dir,
        };

        Ok(Self {
            tickers_csv: non_empty("TICKERS_CSV")
                .map(PathBuf::from)
                .unwrap_or(defaults.tickers_csv),
            ticker_suffix: env::var("TICKER_SUFFIX").unwrap_or(defaults.ticker_suffix),
            benchmark: non_empty("BENCHMARK_TICKER").unwrap_or(defaults.benchmark),
            as_of: AsOfSettings::new(target_time, exchange_offset),
            daily_lookback_days: parse_or("DAILY_LOOKBACK_DAYS", defaults.daily_lookback_days)?,
            worker_threads,
            fetch_concurrency: parse_or("FETCH_CONCURRENCY", defaults.fetch_concurrency)?.max(1),
            snapshot_dir,
        })
    }
}
