/// Average True Range (ATR) indicator
///
/// Measures market volatility by calculating the average of true ranges over a period.
/// True Range is the greatest of:
/// - Current High - Current Low
/// - Abs(Current High - Previous Close)
/// - Abs(Current Low - Previous Close)
///
/// Uses Wilder's smoothing (same as RSI and ADX) for the moving average.

use crate::models::Candle;

/// True range of each candle against its predecessor
///
/// Index 0 has no previous close and is NaN.
pub fn true_range_series(candles: &[Candle]) -> Vec<f64> {
    let mut true_ranges = vec![f64::NAN; candles.len()];

    for i in 1..candles.len() {
        let high = candles[i].high;
        let low = candles[i].low;
        let prev_close = candles[i - 1].close;

        true_ranges[i] = (high - low)
            .max((high - prev_close).abs())
            .max((low - prev_close).abs());
    }

    true_ranges
}

/// Calculate ATR aligned with candles
///
/// First ATR (at index `period`) is the simple average of the first
/// `period` true ranges; earlier bars are NaN.
pub fn calculate_atr_series(candles: &[Candle], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; candles.len()];
    if period == 0 || candles.len() < period + 1 {
        return out;
    }

    let true_ranges = true_range_series(candles);
    let p = period as f64;

    // First ATR is simple average of first 'period' true ranges
    let mut atr = true_ranges[1..=period].iter().sum::<f64>() / p;
    out[period] = atr;

    // Apply Wilder's smoothing for subsequent values
    for i in (period + 1)..candles.len() {
        atr = (atr * (p - 1.0) + true_ranges[i]) / p;
        out[i] = atr;
    }

    out
}

/// ATR as a percentage of the close price
pub fn atr_percent_series(candles: &[Candle], atr: &[f64]) -> Vec<f64> {
    candles
        .iter()
        .zip(atr)
        .map(|(candle, atr)| atr / candle.close * 100.0)
        .collect()
}
