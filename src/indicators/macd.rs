/// Moving Average Convergence Divergence
///
/// line = EMA(fast) - EMA(slow), signal = EMA(signal) of the line,
/// histogram = line - signal.

use super::moving_average::calculate_ema_series;

#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn calculate_macd_series(prices: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let fast_ema = calculate_ema_series(prices, fast);
    let slow_ema = calculate_ema_series(prices, slow);

    let line: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal_line = calculate_ema_series(&line, signal);
    let histogram = line.iter().zip(&signal_line).map(|(l, s)| l - s).collect();

    MacdSeries {
        line,
        signal: signal_line,
        histogram,
    }
}
