use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::signals::populate_signals;
use super::{default_trailing, Strategy, StrategySettings};
use crate::config::{AssetParams, AssetTable, ParamCache};
use crate::indicators::{populate_indicators, IndicatorSnapshot};
use crate::models::{Candle, CustomExit, PositionSnapshot, SignalRow};
use crate::risk::{long_holding_exit, profit_lock_stoploss};

/// Per-asset trend follower
///
/// Each pair is traded with its own parameter record (DOGE, MNT, or the
/// default): EMA pullback entries confirmed by RSI, ADX, MACD and volume,
/// a volatility-gated trend-break exit and a profit-lock stop ladder.
///
/// Designed for 1h candles, long only.
#[derive(Debug)]
pub struct AdaptiveStrategy {
    params: ParamCache,
}

impl AdaptiveStrategy {
    /// Longest EMA in use (EMA300 exit for DOGE) plus slack
    pub const STARTUP_CANDLES: usize = 350;

    pub fn new(table: AssetTable) -> Self {
        Self {
            params: ParamCache::new(table),
        }
    }

    pub fn with_cache(params: ParamCache) -> Self {
        Self { params }
    }

    /// Resolved parameters for a pair
    pub fn params_for(&self, pair: &str) -> Arc<AssetParams> {
        self.params.get(pair)
    }
}

impl Default for AdaptiveStrategy {
    fn default() -> Self {
        Self::new(AssetTable::builtin())
    }
}

impl Strategy for AdaptiveStrategy {
    fn name(&self) -> &str {
        "AdaptiveInstitutionalStrategy"
    }

    fn settings(&self) -> StrategySettings {
        StrategySettings {
            timeframe: "1h",
            can_short: false,
            process_only_new_candles: true,
            startup_candle_count: Self::STARTUP_CANDLES,
            stoploss: -0.12,
            use_custom_stoploss: true,
            minimal_roi: BTreeMap::from([(0, 1.0)]), // effectively off
            trailing: default_trailing(),
            use_exit_signal: true,
            exit_profit_only: false,
        }
    }

    fn populate_indicators(&self, candles: &[Candle], pair: &str) -> Vec<IndicatorSnapshot> {
        populate_indicators(candles, &self.params.get(pair))
    }

    fn populate_signals(&self, indicators: &[IndicatorSnapshot], pair: &str) -> Vec<SignalRow> {
        populate_signals(indicators, &self.params.get(pair))
    }

    fn custom_stoploss(&self, position: &PositionSnapshot, _now: DateTime<Utc>) -> Option<f64> {
        let params = self.params.get(&position.pair);
        Some(profit_lock_stoploss(
            position.current_profit,
            &params.profit_lock_levels,
            params.stoploss,
        ))
    }

    fn custom_exit(&self, position: &PositionSnapshot, now: DateTime<Utc>) -> Option<CustomExit> {
        let exit = long_holding_exit(position.holding_hours(now), position.current_profit);
        if let Some(reason) = exit {
            tracing::info!(
                pair = %position.pair,
                profit = position.current_profit,
                hours = position.holding_hours(now),
                reason = %reason,
                "Forcing exit of long-held losing position"
            );
        }
        exit
    }
}
