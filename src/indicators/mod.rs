// Technical indicators module
// Implements EMA, RSI, ATR, ADX, MACD and Bollinger Bands as NaN-padded series

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod macd;
pub mod market_analysis;
pub mod moving_average;
pub mod rsi;

pub use adx::calculate_adx_series;
pub use atr::{atr_percent_series, calculate_atr_series, true_range_series};
pub use bollinger::{calculate_bollinger_series, BollingerSeries};
pub use macd::{calculate_macd_series, MacdSeries};
pub use market_analysis::{populate_indicators, IndicatorSnapshot};
pub use moving_average::{calculate_ema_series, calculate_sma_series, shift};
pub use rsi::calculate_rsi_series;

#[cfg(test)]
pub(crate) fn test_candles(prices: &[(f64, f64, f64, f64)]) -> Vec<crate::models::Candle> {
    use chrono::{TimeZone, Utc};

    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    prices
        .iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| crate::models::Candle {
            pair: "TEST/USDT".to_string(),
            timestamp: start + chrono::Duration::hours(i as i64),
            open,
            high,
            low,
            close,
            volume: 1000.0,
        })
        .collect()
}
