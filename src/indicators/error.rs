use thiserror::Error;

/// Why an indicator has no value at the final bar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndicatorError {
    #[error("{indicator} needs {required} bars, got {available}")]
    InsufficientData {
        indicator: &'static str,
        required: usize,
        available: usize,
    },

    #[error("{indicator} is undefined at the last bar: {reason}")]
    Undefined {
        indicator: &'static str,
        reason: &'static str,
    },

    #[error("{indicator} period must be positive")]
    InvalidPeriod { indicator: &'static str },
}

impl IndicatorError {
    pub fn indicator(&self) -> &'static str {
        match self {
            IndicatorError::InsufficientData { indicator, .. }
            | IndicatorError::Undefined { indicator, .. }
            | IndicatorError::InvalidPeriod { indicator } => indicator,
        }
    }
}

pub(crate) fn require_bars(
    indicator: &'static str,
    required: usize,
    available: usize,
) -> Result<(), IndicatorError> {
    if available < required {
        Err(IndicatorError::InsufficientData {
            indicator,
            required,
            available,
        })
    } else {
        Ok(())
    }
}

pub(crate) fn require_period(indicator: &'static str, period: usize) -> Result<(), IndicatorError> {
    if period == 0 {
        Err(IndicatorError::InvalidPeriod { indicator })
    } else {
        Ok(())
    }
}

pub(crate) fn finite(indicator: &'static str, value: f64) -> Result<f64, IndicatorError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(IndicatorError::Undefined {
            indicator,
            reason: "non-finite value",
        })
    }
}
