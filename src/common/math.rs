//! Smoothing recurrences shared by the indicator calculators.
//!
//! Each function is a pure fold over its input and returns a series aligned
//! with it: `None` while the recurrence is warming up, `Some(value)` from the
//! first bar where it is defined.

/// Simple moving average of the trailing `period` values.
pub fn sma_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                None
            } else {
                let window = &values[i + 1 - period..=i];
                Some(window.iter().sum::<f64>() / period as f64)
            }
        })
        .collect()
}

/// Exponential moving average with smoothing factor `2 / (period + 1)`,
/// seeded by the simple mean of the first `period` values.
pub fn ema_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let alpha = 2.0 / (period as f64 + 1.0);
    seeded_recurrence(values, period, alpha)
}

/// Wilder smoothing (`alpha = 1 / period`), seeded by the simple mean of the
/// first `period` values.
pub fn wilder_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let alpha = 1.0 / period as f64;
    seeded_recurrence(values, period, alpha)
}

fn seeded_recurrence(values: &[f64], period: usize, alpha: f64) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let seed = values[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = Some(seed);

    values[period..]
        .iter()
        .scan(seed, |prev, &x| {
            *prev = (1.0 - alpha) * *prev + alpha * x;
            Some(*prev)
        })
        .enumerate()
        .for_each(|(offset, value)| out[period + offset] = Some(value));

    out
}

/// Apply `f` to the defined tail of an aligned series and re-align the output.
///
/// The tail must be contiguous: once a value is defined, every later value is.
pub fn on_defined_tail<F>(series: &[Option<f64>], f: F) -> Vec<Option<f64>>
where
    F: FnOnce(&[f64]) -> Vec<Option<f64>>,
{
    let start = match series.iter().position(Option::is_some) {
        Some(start) => start,
        None => return vec![None; series.len()],
    };
    let tail: Option<Vec<f64>> = series[start..].iter().copied().collect();
    let mut out = vec![None; series.len()];
    if let Some(tail) = tail {
        for (offset, value) in f(&tail).into_iter().enumerate() {
            out[start + offset] = value;
        }
    }
    out
}

pub fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    (high - low)
        .max((high - prev_close).abs())
        .max((low - prev_close).abs())
}

/// Last value of an aligned series, if defined.
pub fn last_defined(series: &[Option<f64>]) -> Option<f64> {
    series.last().copied().flatten()
}
