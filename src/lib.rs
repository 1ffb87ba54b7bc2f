//! Technical indicator and signal scoring service for equity tickers.

pub mod common;
pub mod config;
pub mod core;
pub mod data;
pub mod db;
pub mod error;
pub mod export;
pub mod indicators;
pub mod jobs;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;

pub use error::EvaluationError;
pub use models::{ParameterSet, ScoreResult};
