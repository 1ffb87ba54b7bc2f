//! Indicator lengths and scoring thresholds bound to one evaluation run.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("{name} must be a positive length")]
    NonPositiveLength { name: &'static str },

    #[error("{name} must be a positive whole number, got {value}")]
    InvalidLength { name: String, value: f64 },

    #[error("{name} must be finite")]
    NotFinite { name: &'static str },

    #[error("constraint violated: {constraint}")]
    Constraint { constraint: &'static str },
}

/// Resolved parameters for one evaluation.
///
/// Created by a resolver (defaults or stored tuning values) and never mutated
/// by the scoring core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    pub rsi_length: usize,
    pub rsi_buy_threshold: f64,
    pub rsi_buy_prepare_threshold: f64,
    pub rsi_sell_threshold: f64,
    pub rsi_sell_prepare_threshold: f64,
    pub sma_short_length: usize,
    pub sma_long_length: usize,
    pub deviation_buy_threshold: f64,
    pub deviation_sell_threshold: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub adx_length: usize,
    pub adx_threshold: f64,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            rsi_length: 14,
            rsi_buy_threshold: 25.0,
            rsi_buy_prepare_threshold: 40.0,
            rsi_sell_threshold: 75.0,
            rsi_sell_prepare_threshold: 60.0,
            sma_short_length: 25,
            sma_long_length: 75,
            deviation_buy_threshold: -5.0,
            deviation_sell_threshold: 5.0,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            adx_length: 14,
            adx_threshold: 25.0,
        }
    }
}

impl ParameterSet {
    /// Names accepted by [`ParameterSet::with_overrides`].
    pub const NAMES: [&'static str; 14] = [
        "rsi_length",
        "rsi_buy_threshold",
        "rsi_buy_prepare_threshold",
        "rsi_sell_threshold",
        "rsi_sell_prepare_threshold",
        "sma_short_length",
        "sma_long_length",
        "deviation_buy_threshold",
        "deviation_sell_threshold",
        "macd_fast",
        "macd_slow",
        "macd_signal",
        "adx_length",
        "adx_threshold",
    ];

    pub fn validate(&self) -> Result<(), ParameterError> {
        let lengths = [
            ("rsi_length", self.rsi_length),
            ("sma_short_length", self.sma_short_length),
            ("sma_long_length", self.sma_long_length),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("adx_length", self.adx_length),
        ];
        for (name, length) in lengths {
            if length == 0 {
                return Err(ParameterError::NonPositiveLength { name });
            }
        }

        let thresholds = [
            ("rsi_buy_threshold", self.rsi_buy_threshold),
            ("rsi_buy_prepare_threshold", self.rsi_buy_prepare_threshold),
            ("rsi_sell_threshold", self.rsi_sell_threshold),
            ("rsi_sell_prepare_threshold", self.rsi_sell_prepare_threshold),
            ("deviation_buy_threshold", self.deviation_buy_threshold),
            ("deviation_sell_threshold", self.deviation_sell_threshold),
            ("adx_threshold", self.adx_threshold),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() {
                return Err(ParameterError::NotFinite { name });
            }
        }

        let constraints = [
            (
                self.rsi_buy_threshold < self.rsi_buy_prepare_threshold,
                "rsi_buy_threshold < rsi_buy_prepare_threshold",
            ),
            (
                self.rsi_buy_prepare_threshold <= self.rsi_sell_prepare_threshold,
                "rsi_buy_prepare_threshold <= rsi_sell_prepare_threshold",
            ),
            (
                self.rsi_sell_prepare_threshold < self.rsi_sell_threshold,
                "rsi_sell_prepare_threshold < rsi_sell_threshold",
            ),
            (
                self.sma_short_length < self.sma_long_length,
                "sma_short_length < sma_long_length",
            ),
            (
                self.deviation_buy_threshold < 0.0,
                "deviation_buy_threshold < 0",
            ),
            (
                self.deviation_sell_threshold > 0.0,
                "deviation_sell_threshold > 0",
            ),
            (self.macd_fast < self.macd_slow, "macd_fast < macd_slow"),
            (self.adx_threshold > 0.0, "adx_threshold > 0"),
        ];
        for (holds, constraint) in constraints {
            if !holds {
                return Err(ParameterError::Constraint { constraint });
            }
        }

        Ok(())
    }

    /// Apply stored name/value tuning overrides on top of `self` and validate
    /// the result. Unknown names are ignored.
    pub fn with_overrides(mut self, overrides: &HashMap<String, f64>) -> Result<Self, ParameterError> {
        for (name, &value) in overrides {
            match name.as_str() {
                "rsi_length" => self.rsi_length = length_from(name, value)?,
                "rsi_buy_threshold" => self.rsi_buy_threshold = value,
                "rsi_buy_prepare_threshold" => self.rsi_buy_prepare_threshold = value,
                "rsi_sell_threshold" => self.rsi_sell_threshold = value,
                "rsi_sell_prepare_threshold" => self.rsi_sell_prepare_threshold = value,
                "sma_short_length" => self.sma_short_length = length_from(name, value)?,
                "sma_long_length" => self.sma_long_length = length_from(name, value)?,
                "deviation_buy_threshold" => self.deviation_buy_threshold = value,
                "deviation_sell_threshold" => self.deviation_sell_threshold = value,
                "macd_fast" => self.macd_fast = length_from(name, value)?,
                "macd_slow" => self.macd_slow = length_from(name, value)?,
                "macd_signal" => self.macd_signal = length_from(name, value)?,
                "adx_length" => self.adx_length = length_from(name, value)?,
                "adx_threshold" => self.adx_threshold = value,
                unknown => {
                    warn!(parameter = %unknown, value, "ignoring unknown tuning parameter");
                }
            }
        }
        self.validate()?;
        Ok(self)
    }

    /// Smallest number of daily bars a ticker needs to be evaluated at all.
    pub fn min_history(&self) -> usize {
        self.sma_long_length
    }
}

fn length_from(name: &str, value: f64) -> Result<usize, ParameterError> {
    if value.is_finite() && value >= 1.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        Ok(value as usize)
    } else {
        Err(ParameterError::InvalidLength {
            name: name.to_string(),
            value,
        })
    }
}
