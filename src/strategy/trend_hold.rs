use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use super::signals::populate_signals;
use super::{default_trailing, Strategy, StrategySettings};
use crate::config::AssetParams;
use crate::indicators::{populate_indicators, IndicatorSnapshot};
use crate::models::{Candle, PositionSnapshot, SignalRow};
use crate::risk::profit_lock_stoploss;

/// EMA 20/50/100 pullback trend follower with one parameter set for all pairs
///
/// Entries need the EMA stack, a slow-EMA slope above 0.5%, a pullback to the
/// fast EMA and RSI between 40 and 70. Exits on two closes below EMA100; the
/// five-rung profit-lock ladder handles the rest.
#[derive(Debug, Clone)]
pub struct TrendHoldStrategy {
    params: AssetParams,
}

impl TrendHoldStrategy {
    pub const STARTUP_CANDLES: usize = 200;

    pub fn new(params: AssetParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &AssetParams {
        &self.params
    }
}

impl Default for TrendHoldStrategy {
    fn default() -> Self {
        Self::new(AssetParams::trend_hold())
    }
}

impl Strategy for TrendHoldStrategy {
    fn name(&self) -> &str {
        "MntTrendHoldV3Strategy"
    }

    fn settings(&self) -> StrategySettings {
        StrategySettings {
            timeframe: "1h",
            can_short: false,
            process_only_new_candles: true,
            startup_candle_count: Self::STARTUP_CANDLES,
            stoploss: self.params.stoploss,
            use_custom_stoploss: true,
            minimal_roi: BTreeMap::from([(0, 0.80)]),
            trailing: default_trailing(),
            use_exit_signal: true,
            exit_profit_only: false,
        }
    }

    fn populate_indicators(&self, candles: &[Candle], _pair: &str) -> Vec<IndicatorSnapshot> {
        populate_indicators(candles, &self.params)
    }

    fn populate_signals(&self, indicators: &[IndicatorSnapshot], _pair: &str) -> Vec<SignalRow> {
        populate_signals(indicators, &self.params)
    }

    fn custom_stoploss(&self, position: &PositionSnapshot, _now: DateTime<Utc>) -> Option<f64> {
        Some(profit_lock_stoploss(
            position.current_profit,
            &self.params.profit_lock_levels,
            self.params.stoploss,
        ))
    }
}
