use serde::Serialize;

use crate::config::AssetParams;
use crate::error::Error;
use crate::indicators::IndicatorSnapshot;
use crate::models::{Candle, EntryTag, ExitTag, SignalRow};

/// ADX floor used when a record enables the ADX filter without a value
pub const DEFAULT_MIN_ADX: f64 = 20.0;

/// Volume must be at least this fraction of its 20-bar average
pub const MIN_VOLUME_RATIO: f64 = 0.8;

/// One named entry condition
///
/// Conditions are evaluated in declaration order and combined with AND.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryPredicate {
    IndicatorsDefined,
    Uptrend,
    SlopeAboveThreshold,
    PullbackToFastEma,
    CloseAboveFastEma,
    RsiInRange,
    AdxAboveMinimum,
    MacdHistogramPositive,
    VolumeAboveAverage,
    Trending,
}

impl EntryPredicate {
    pub fn name(&self) -> &'static str {
        match self {
            EntryPredicate::IndicatorsDefined => "indicators_defined",
            EntryPredicate::Uptrend => "uptrend",
            EntryPredicate::SlopeAboveThreshold => "slope_above_threshold",
            EntryPredicate::PullbackToFastEma => "pullback_to_fast_ema",
            EntryPredicate::CloseAboveFastEma => "close_above_fast_ema",
            EntryPredicate::RsiInRange => "rsi_in_range",
            EntryPredicate::AdxAboveMinimum => "adx_above_minimum",
            EntryPredicate::MacdHistogramPositive => "macd_histogram_positive",
            EntryPredicate::VolumeAboveAverage => "volume_above_average",
            EntryPredicate::Trending => "trending",
        }
    }

    /// Whether the condition holds on `bar`. Undefined inputs never hold.
    pub fn holds(&self, bar: &IndicatorSnapshot, params: &AssetParams) -> bool {
        match self {
            EntryPredicate::IndicatorsDefined => bar.ema_fast.is_finite() && bar.rsi.is_finite(),
            EntryPredicate::Uptrend => bar.uptrend,
            EntryPredicate::SlopeAboveThreshold => bar.slope > params.slope_threshold,
            // Low touched (or undercut) the fast EMA region
            EntryPredicate::PullbackToFastEma => {
                bar.low <= bar.ema_fast * params.pullback_tolerance
            }
            EntryPredicate::CloseAboveFastEma => bar.close > bar.ema_fast,
            EntryPredicate::RsiInRange => {
                bar.rsi > params.rsi_oversold && bar.rsi < params.rsi_overbought
            }
            EntryPredicate::AdxAboveMinimum => {
                bar.adx > params.min_adx.unwrap_or(DEFAULT_MIN_ADX)
            }
            EntryPredicate::MacdHistogramPositive => bar.macd_hist > 0.0,
            EntryPredicate::VolumeAboveAverage => bar.volume_ratio > MIN_VOLUME_RATIO,
            EntryPredicate::Trending => bar.is_trending,
        }
    }
}

/// Ordered entry conditions enabled by a parameter record
pub fn entry_predicates(params: &AssetParams) -> Vec<EntryPredicate> {
    let mut predicates = vec![
        EntryPredicate::IndicatorsDefined,
        EntryPredicate::Uptrend,
        EntryPredicate::SlopeAboveThreshold,
        EntryPredicate::PullbackToFastEma,
        EntryPredicate::CloseAboveFastEma,
        EntryPredicate::RsiInRange,
    ];

    if params.min_adx.is_some() {
        predicates.push(EntryPredicate::AdxAboveMinimum);
    }
    if params.advanced_filters {
        predicates.push(EntryPredicate::MacdHistogramPositive);
        predicates.push(EntryPredicate::VolumeAboveAverage);
    }
    if params.use_trend_filter {
        predicates.push(EntryPredicate::Trending);
    }

    predicates
}

/// Conditions from `predicates` that do not hold on `bar`
pub fn failed_predicates(
    bar: &IndicatorSnapshot,
    predicates: &[EntryPredicate],
    params: &AssetParams,
) -> Vec<EntryPredicate> {
    predicates
        .iter()
        .copied()
        .filter(|predicate| !predicate.holds(bar, params))
        .collect()
}

/// Entry tag if every enabled condition holds on `bar`
pub fn evaluate_entry(bar: &IndicatorSnapshot, params: &AssetParams) -> Option<EntryTag> {
    entry_with(bar, &entry_predicates(params), params)
}

fn entry_with(
    bar: &IndicatorSnapshot,
    predicates: &[EntryPredicate],
    params: &AssetParams,
) -> Option<EntryTag> {
    predicates
        .iter()
        .all(|predicate| predicate.holds(bar, params))
        .then_some(EntryTag::FullSignal)
}

/// Trend-break exit: two consecutive closes below the exit EMA
///
/// When the record sets a volatility trigger, the current volatility ratio
/// must also be at or above it.
pub fn evaluate_exit(
    current: &IndicatorSnapshot,
    previous: Option<&IndicatorSnapshot>,
    params: &AssetParams,
) -> Option<ExitTag> {
    if !params.use_trend_exit {
        return None;
    }
    let previous = previous?;

    let below_now = current.close < current.ema_exit;
    let below_before = previous.close < previous.ema_exit;
    let volatility_ok = params.trend_exit_volatility_ratio <= 0.0
        || current.volatility_ratio >= params.trend_exit_volatility_ratio;

    (below_now && below_before && volatility_ok).then_some(ExitTag::TrendBreak)
}

/// Entry and exit flags for every bar
pub fn populate_signals(snapshots: &[IndicatorSnapshot], params: &AssetParams) -> Vec<SignalRow> {
    let predicates = entry_predicates(params);

    snapshots
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let previous = i.checked_sub(1).map(|j| &snapshots[j]);
            let enter_tag = entry_with(bar, &predicates, params);
            let exit_tag = evaluate_exit(bar, previous, params);

            if enter_tag.is_some() {
                tracing::debug!(
                    timestamp = %bar.timestamp,
                    close = bar.close,
                    ema_fast = bar.ema_fast,
                    rsi = bar.rsi,
                    adx = bar.adx,
                    slope = bar.slope,
                    "Entry signal"
                );
            }
            if exit_tag.is_some() {
                tracing::debug!(
                    timestamp = %bar.timestamp,
                    close = bar.close,
                    ema_exit = bar.ema_exit,
                    volatility_ratio = bar.volatility_ratio,
                    "Trend-break exit signal"
                );
            }

            SignalRow {
                timestamp: Some(bar.timestamp),
                enter_long: enter_tag.is_some(),
                enter_tag,
                exit_long: exit_tag.is_some(),
                exit_tag,
            }
        })
        .collect()
}

/// Validate that candles are strictly increasing in time
///
/// # Returns
/// * `Ok(())` if every candle is later than its predecessor
/// * `Err` naming the first out-of-order index
pub fn validate_candle_order(candles: &[Candle]) -> Result<(), Error> {
    for (i, window) in candles.windows(2).enumerate() {
        if window[1].timestamp <= window[0].timestamp {
            return Err(Error::UnsortedCandles {
                pair: window[1].pair.clone(),
                index: i + 1,
            });
        }
    }

    Ok(())
}
