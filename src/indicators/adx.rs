/// Average Directional Index (ADX) - Measures trend strength
///
/// ADX ranges from 0 to 100:
/// - ADX > 25: Strong trend (bull or bear)
/// - ADX 20-25: Moderate trend
/// - ADX < 20: Weak trend / choppy / ranging market

use super::atr::true_range_series;
use crate::models::Candle;

/// Calculate ADX aligned with candles
///
/// Wilder's construction: smoothed TR/+DM/-DM sums seeded with the first
/// `period` raw values, DX from bar `period`, first ADX as the mean of the
/// first `period` DX values (bar `2 * period - 1`), Wilder smoothing after.
pub fn calculate_adx_series(candles: &[Candle], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; candles.len()];
    if period == 0 || candles.len() < 2 * period {
        return out;
    }

    // Step 1: Calculate True Range (TR) and Directional Movement (+DM, -DM)
    let true_ranges = true_range_series(candles);
    let mut plus_dms = vec![0.0; candles.len()];
    let mut minus_dms = vec![0.0; candles.len()];

    for i in 1..candles.len() {
        let up_move = candles[i].high - candles[i - 1].high;
        let down_move = candles[i - 1].low - candles[i].low;

        if up_move > down_move && up_move > 0.0 {
            plus_dms[i] = up_move;
        }
        if down_move > up_move && down_move > 0.0 {
            minus_dms[i] = down_move;
        }
    }

    // Step 2: Wilder running sums, seeded over bars 1..=period
    let p = period as f64;
    let mut smoothed_tr: f64 = true_ranges[1..=period].iter().sum();
    let mut smoothed_plus: f64 = plus_dms[1..=period].iter().sum();
    let mut smoothed_minus: f64 = minus_dms[1..=period].iter().sum();

    // Step 3: DX per bar
    let mut dx = vec![f64::NAN; candles.len()];
    dx[period] = directional_index(smoothed_tr, smoothed_plus, smoothed_minus);

    for i in (period + 1)..candles.len() {
        smoothed_tr = smoothed_tr - smoothed_tr / p + true_ranges[i];
        smoothed_plus = smoothed_plus - smoothed_plus / p + plus_dms[i];
        smoothed_minus = smoothed_minus - smoothed_minus / p + minus_dms[i];
        dx[i] = directional_index(smoothed_tr, smoothed_plus, smoothed_minus);
    }

    // Step 4: ADX (smoothed DX)
    let first = 2 * period - 1;
    let mut adx = dx[period..=first].iter().sum::<f64>() / p;
    out[first] = adx;

    for i in (first + 1)..candles.len() {
        adx = (adx * (p - 1.0) + dx[i]) / p;
        out[i] = adx;
    }

    out
}

fn directional_index(tr: f64, plus_dm: f64, minus_dm: f64) -> f64 {
    if tr <= 0.0 {
        return 0.0;
    }

    let plus_di = plus_dm / tr * 100.0;
    let minus_di = minus_dm / tr * 100.0;

    let di_sum = plus_di + minus_di;
    if di_sum > 0.0 {
        (plus_di - minus_di).abs() / di_sum * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_candles;

    fn uptrend(n: usize) -> Vec<(f64, f64, f64, f64)> {
        (0..n)
            .map(|i| {
                let base = 100.0 + i as f64 * 3.0;
                (base, base + 5.0, base - 1.0, base + 3.0)
            })
            .collect()
    }

    fn choppy(n: usize) -> Vec<(f64, f64, f64, f64)> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    (100.0, 103.0, 97.0, 101.0)
                } else {
                    (101.0, 102.0, 98.0, 99.0)
                }
            })
            .collect()
    }

    #[test]
    fn test_adx_strong_uptrend() {
        let candles = test_candles(&uptrend(40));
        let adx = calculate_adx_series(&candles, 14);

        assert!(adx[26].is_nan());
        assert!(adx[27].is_finite());
        // Every bar makes a higher high and higher low: pure +DM
        assert!(adx[39] > 90.0, "ADX should be high in uptrend, got {:.2}", adx[39]);
    }

    #[test]
    fn test_adx_choppy_market() {
        let candles = test_candles(&choppy(40));
        let adx = calculate_adx_series(&candles, 14);

        assert!(
            adx[39] < 40.0,
            "ADX should be lower in choppy market, got {:.2}",
            adx[39]
        );
    }

    #[test]
    fn test_adx_trend_above_chop() {
        let trending = calculate_adx_series(&test_candles(&uptrend(40)), 14);
        let ranging = calculate_adx_series(&test_candles(&choppy(40)), 14);

        assert!(trending[39] > ranging[39]);
    }

    #[test]
    fn test_adx_insufficient_data() {
        let candles = test_candles(&uptrend(20));
        let adx = calculate_adx_series(&candles, 14);

        assert!(adx.iter().all(|v| v.is_nan()), "Should be NaN for insufficient data");
    }
}
