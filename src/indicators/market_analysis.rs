/// Composite indicator engine
///
/// Turns a candle series into one [`IndicatorSnapshot`] per bar, using the
/// EMA periods of the instrument's parameter record and fixed periods for
/// everything else. Values that need more history than is available are NaN,
/// and any comparison against them is false.

use serde::Serialize;

use super::adx::calculate_adx_series;
use super::atr::{atr_percent_series, calculate_atr_series};
use super::bollinger::calculate_bollinger_series;
use super::macd::calculate_macd_series;
use super::moving_average::{calculate_ema_series, calculate_sma_series, shift};
use super::rsi::calculate_rsi_series;
use crate::config::AssetParams;
use crate::models::Candle;
use chrono::{DateTime, Utc};

pub const RSI_PERIOD: usize = 14;
pub const ATR_PERIOD: usize = 14;
pub const ADX_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const BB_PERIOD: usize = 20;
pub const BB_STD_DEV: f64 = 2.0;
pub const SLOPE_LOOKBACK: usize = 10;
pub const VOLATILITY_WINDOW: usize = 50;
pub const ADX_SMA_WINDOW: usize = 10;
pub const BB_WIDTH_SMA_WINDOW: usize = 50;
pub const VOLUME_SMA_WINDOW: usize = 20;

/// Bars needed before every fixed-period column is defined
pub fn fixed_warmup_bars() -> usize {
    let rsi = RSI_PERIOD + 1;
    let volatility_ratio = ATR_PERIOD + VOLATILITY_WINDOW; // first ATR at bar 14
    let adx_sma = 2 * ADX_PERIOD - 1 + ADX_SMA_WINDOW; // first ADX at bar 27
    let bb_width_sma = BB_PERIOD + BB_WIDTH_SMA_WINDOW - 1;
    let macd_signal = MACD_SLOW + MACD_SIGNAL - 1;

    rsi.max(volatility_ratio)
        .max(adx_sma)
        .max(bb_width_sma)
        .max(macd_signal)
        .max(VOLUME_SMA_WINDOW)
}

/// Derived values for a single bar
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorSnapshot {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,

    pub ema_fast: f64,
    pub ema_slow: f64,
    pub ema_trend: f64,
    pub ema_exit: f64,

    pub rsi: f64,
    pub atr: f64,
    pub atr_pct: f64,
    pub volatility_ratio: f64, // current ATR% / 50-bar mean

    pub uptrend: bool,
    pub slope: f64, // % change of slow EMA over 10 bars

    pub adx: f64,
    pub adx_sma: f64,
    pub adx_rising: bool,
    pub bb_width: f64,
    pub bb_width_sma: f64,
    pub is_trending: bool,

    pub macd: f64,
    pub macd_signal: f64,
    pub macd_hist: f64,

    pub volume_sma: f64,
    pub volume_ratio: f64,
}

/// Compute every indicator column for the series
pub fn populate_indicators(candles: &[Candle], params: &AssetParams) -> Vec<IndicatorSnapshot> {
    if candles.is_empty() {
        return Vec::new();
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let volumes: Vec<f64> = candles.iter().map(|c| c.volume).collect();

    // EMA (trend core)
    let ema_fast = calculate_ema_series(&closes, params.ema_fast);
    let ema_slow = calculate_ema_series(&closes, params.ema_slow);
    let ema_trend = calculate_ema_series(&closes, params.ema_trend);
    let ema_exit = if params.exit_ema_period() == params.ema_trend {
        ema_trend.clone()
    } else {
        calculate_ema_series(&closes, params.exit_ema_period())
    };

    let rsi = calculate_rsi_series(&closes, RSI_PERIOD);

    // Volatility
    let atr = calculate_atr_series(candles, ATR_PERIOD);
    let atr_pct = atr_percent_series(candles, &atr);
    let atr_pct_sma = calculate_sma_series(&atr_pct, VOLATILITY_WINDOW);

    let ema_slow_prev = shift(&ema_slow, SLOPE_LOOKBACK);

    // Trend vs range
    let adx = calculate_adx_series(candles, ADX_PERIOD);
    let adx_sma = calculate_sma_series(&adx, ADX_SMA_WINDOW);
    let bb_width = calculate_bollinger_series(&closes, BB_PERIOD, BB_STD_DEV).width();
    let bb_width_sma = calculate_sma_series(&bb_width, BB_WIDTH_SMA_WINDOW);

    let macd = calculate_macd_series(&closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL);
    let volume_sma = calculate_sma_series(&volumes, VOLUME_SMA_WINDOW);

    let snapshots: Vec<IndicatorSnapshot> = candles
        .iter()
        .enumerate()
        .map(|(i, candle)| {
            let uptrend = ema_fast[i] > ema_slow[i]
                && ema_slow[i] > ema_trend[i]
                && candle.close > ema_fast[i];
            let adx_rising = adx[i] > adx_sma[i];

            IndicatorSnapshot {
                timestamp: candle.timestamp,
                open: candle.open,
                high: candle.high,
                low: candle.low,
                close: candle.close,
                volume: candle.volume,
                ema_fast: ema_fast[i],
                ema_slow: ema_slow[i],
                ema_trend: ema_trend[i],
                ema_exit: ema_exit[i],
                rsi: rsi[i],
                atr: atr[i],
                atr_pct: atr_pct[i],
                volatility_ratio: atr_pct[i] / atr_pct_sma[i],
                uptrend,
                slope: (ema_slow[i] - ema_slow_prev[i]) / ema_slow_prev[i] * 100.0,
                adx: adx[i],
                adx_sma: adx_sma[i],
                adx_rising,
                bb_width: bb_width[i],
                bb_width_sma: bb_width_sma[i],
                is_trending: adx_rising || bb_width[i] > bb_width_sma[i],
                macd: macd.line[i],
                macd_signal: macd.signal[i],
                macd_hist: macd.histogram[i],
                volume_sma: volume_sma[i],
                volume_ratio: candle.volume / volume_sma[i],
            }
        })
        .collect();

    tracing::trace!(
        bars = snapshots.len(),
        ema_fast = params.ema_fast,
        ema_slow = params.ema_slow,
        ema_trend = params.ema_trend,
        ema_exit = params.exit_ema_period(),
        "Populated indicators"
    );

    snapshots
}
