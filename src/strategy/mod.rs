// Trading strategy module
pub mod adaptive;
pub mod signals;
pub mod trend_hold;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::indicators::IndicatorSnapshot;
use crate::models::{Candle, CustomExit, PositionSnapshot, SignalRow};

pub use adaptive::AdaptiveStrategy;
pub use trend_hold::TrendHoldStrategy;

/// Host-side trailing stop configuration
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrailingStopSettings {
    pub enabled: bool,
    pub positive: f64,        // distance from the high
    pub positive_offset: f64, // profit before trailing starts
    pub only_offset_is_reached: bool,
}

/// Static settings a strategy advertises to the host
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StrategySettings {
    pub timeframe: &'static str,
    pub can_short: bool,
    pub process_only_new_candles: bool,
    pub startup_candle_count: usize,
    pub stoploss: f64,
    pub use_custom_stoploss: bool,
    pub minimal_roi: BTreeMap<u32, f64>, // minutes since entry -> ROI
    pub trailing: TrailingStopSettings,
    pub use_exit_signal: bool,
    pub exit_profit_only: bool,
}

/// Callbacks the backtesting/execution host invokes
///
/// Implementations hold no per-call state: every method is a pure function
/// of its arguments and the strategy's parameter table.
pub trait Strategy: Send + Sync {
    /// Get strategy name
    fn name(&self) -> &str;

    fn settings(&self) -> StrategySettings;

    /// Indicator columns for every candle of `pair`
    fn populate_indicators(&self, candles: &[Candle], pair: &str) -> Vec<IndicatorSnapshot>;

    /// Entry/exit flags for every bar
    fn populate_signals(&self, indicators: &[IndicatorSnapshot], pair: &str) -> Vec<SignalRow>;

    /// Stop-loss ratio for an open position, `None` keeps the host's stop
    fn custom_stoploss(&self, position: &PositionSnapshot, now: DateTime<Utc>) -> Option<f64>;

    /// Exit reason for an open position
    fn custom_exit(&self, _position: &PositionSnapshot, _now: DateTime<Utc>) -> Option<CustomExit> {
        None
    }

    /// Spot only
    fn leverage(&self, _pair: &str, _proposed: f64, _max: f64) -> f64 {
        1.0
    }

    fn confirm_trade_entry(&self, _pair: &str, _amount: f64, _rate: f64) -> bool {
        true
    }

    /// Additional (pair, timeframe) feeds the strategy wants
    fn informative_pairs(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Indicators and signals in one pass
    fn analyze(&self, candles: &[Candle], pair: &str) -> Vec<SignalRow> {
        let indicators = self.populate_indicators(candles, pair);
        self.populate_signals(&indicators, pair)
    }
}

/// Which built-in strategy to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StrategyKind {
    Adaptive,
    TrendHold,
}

impl StrategyKind {
    pub fn build(self, table: crate::config::AssetTable) -> Box<dyn Strategy> {
        match self {
            StrategyKind::Adaptive => Box::new(AdaptiveStrategy::new(table)),
            StrategyKind::TrendHold => Box::new(TrendHoldStrategy::default()),
        }
    }
}

pub(crate) fn default_trailing() -> TrailingStopSettings {
    TrailingStopSettings {
        enabled: true,
        positive: 0.10,
        positive_offset: 0.15,
        only_offset_is_reached: true,
    }
}
