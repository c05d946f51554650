/// Moving averages over series that may carry undefined (NaN) warmup values.
///
/// Every `*_series` function returns a vector aligned with its input, using
/// `f64::NAN` where the value is not yet defined.

/// Simple Moving Average over a trailing window
///
/// Defined only when every value in the window is defined.
pub fn calculate_sma_series(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        if window.iter().all(|v| v.is_finite()) {
            out[i] = window.iter().sum::<f64>() / period as f64;
        }
    }

    out
}

/// Exponential Moving Average
///
/// Seeded with the SMA of the first `period` defined values, then
/// `ema = (x - ema) * k + ema` with `k = 2 / (period + 1)`.
/// Leading NaNs in the input (e.g. a MACD line) are skipped.
pub fn calculate_ema_series(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 {
        return out;
    }

    let Some(start) = values.iter().position(|v| v.is_finite()) else {
        return out;
    };
    if values.len() - start < period {
        return out;
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let seed_end = start + period - 1;

    // Start with SMA
    let mut ema = values[start..=seed_end].iter().sum::<f64>() / period as f64;
    out[seed_end] = ema;

    for i in (seed_end + 1)..values.len() {
        ema = (values[i] - ema) * multiplier + ema;
        out[i] = ema;
    }

    out
}

/// Value `periods` bars earlier, NaN where no such bar exists
pub fn shift(values: &[f64], periods: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| if i >= periods { values[i - periods] } else { f64::NAN })
        .collect()
}
