/// Calculate Relative Strength Index (RSI) for every bar
///
/// RSI measures the magnitude of recent price changes to evaluate
/// overbought or oversold conditions.
///
/// Values:
/// - RSI > 70: Overbought
/// - RSI < 30: Oversold
///
/// The first average gain/loss is the simple mean of the first `period`
/// changes; later values use Wilder's smoothing. The first `period` bars
/// are NaN. A window with no movement at all yields 0.
pub fn calculate_rsi_series(prices: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; prices.len()];
    if period == 0 || prices.len() < period + 1 {
        return out;
    }

    let mut gains = Vec::with_capacity(prices.len() - 1);
    let mut losses = Vec::with_capacity(prices.len() - 1);

    // Calculate price changes
    for i in 1..prices.len() {
        let change = prices[i] - prices[i - 1];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(change.abs());
        }
    }

    let p = period as f64;
    let mut avg_gain = gains[..period].iter().sum::<f64>() / p;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / p;
    out[period] = rsi_from_averages(avg_gain, avg_loss);

    for i in period..gains.len() {
        avg_gain = (avg_gain * (p - 1.0) + gains[i]) / p;
        avg_loss = (avg_loss * (p - 1.0) + losses[i]) / p;
        out[i + 1] = rsi_from_averages(avg_gain, avg_loss);
    }

    out
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    let total = avg_gain + avg_loss;
    if total == 0.0 {
        return 0.0;
    }
    100.0 * avg_gain / total
}
