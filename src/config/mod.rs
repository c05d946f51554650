//! Per-instrument parameter records and the built-in asset table.
//!
//! Only DOGE and MNT carry tuned records; every other symbol resolves to the
//! default record.

pub mod cache;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::indicators::market_analysis::{fixed_warmup_bars, SLOPE_LOOKBACK};

pub use cache::ParamCache;

/// One rung of the profit-lock ladder
///
/// Once profit reaches `threshold`, at least `locked` profit is kept.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ProfitLock {
    pub threshold: f64,
    pub locked: f64,
}

impl ProfitLock {
    pub const fn new(threshold: f64, locked: f64) -> Self {
        Self { threshold, locked }
    }
}

/// Tunable parameters for a single instrument
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetParams {
    // Stop parameters
    pub stoploss: f64,        // fixed stop, e.g. -0.05
    pub trailing_stop: f64,   // distance from the high once trailing is active
    pub trailing_offset: f64, // profit that activates trailing
    pub profit_lock_levels: Vec<ProfitLock>, // descending thresholds

    // EMA periods
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub ema_trend: usize,
    #[serde(default)]
    pub ema_exit: Option<usize>, // falls back to ema_trend

    // Entry filters
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub slope_threshold: f64,
    pub pullback_tolerance: f64, // 1.02 = low may sit 2% above the fast EMA
    pub volatility_multiplier: f64,
    #[serde(default = "default_min_adx")]
    pub min_adx: Option<f64>,
    #[serde(default = "default_true")]
    pub advanced_filters: bool, // MACD histogram + volume ratio
    #[serde(default)]
    pub use_trend_filter: bool,

    // Trend-break exit
    #[serde(default = "default_true")]
    pub use_trend_exit: bool,
    #[serde(default)]
    pub trend_exit_volatility_ratio: f64, // 0 = not gated on volatility
}

fn default_min_adx() -> Option<f64> {
    Some(20.0)
}

fn default_true() -> bool {
    true
}

impl AssetParams {
    /// Period of the EMA the trend-break exit compares against
    pub fn exit_ema_period(&self) -> usize {
        self.ema_exit.unwrap_or(self.ema_trend)
    }

    /// Longest lookback any indicator needs before it is defined
    pub fn warmup_bars(&self) -> usize {
        self.ema_fast
            .max(self.ema_slow + SLOPE_LOOKBACK)
            .max(self.ema_trend)
            .max(self.exit_ema_period())
            .max(fixed_warmup_bars())
    }

    /// Check the invariants the stop ladder and entry filters rely on
    pub fn validate(&self, asset: &str) -> Result<(), ConfigError> {
        if self.stoploss >= 0.0 {
            return Err(ConfigError::StoplossNotNegative {
                asset: asset.to_string(),
                value: self.stoploss,
            });
        }

        for (field, period) in [
            ("ema_fast", self.ema_fast),
            ("ema_slow", self.ema_slow),
            ("ema_trend", self.ema_trend),
            ("ema_exit", self.exit_ema_period()),
        ] {
            if period == 0 {
                return Err(ConfigError::ZeroPeriod {
                    asset: asset.to_string(),
                    field,
                });
            }
        }

        if self.rsi_oversold >= self.rsi_overbought {
            return Err(ConfigError::RsiBounds {
                asset: asset.to_string(),
                oversold: self.rsi_oversold,
                overbought: self.rsi_overbought,
            });
        }

        for level in &self.profit_lock_levels {
            if level.locked >= level.threshold {
                return Err(ConfigError::LockAboveThreshold {
                    asset: asset.to_string(),
                    threshold: level.threshold,
                    locked: level.locked,
                });
            }
        }

        for pair in self.profit_lock_levels.windows(2) {
            if pair[1].threshold >= pair[0].threshold {
                return Err(ConfigError::UnsortedProfitLocks {
                    asset: asset.to_string(),
                    previous: pair[0].threshold,
                    next: pair[1].threshold,
                });
            }
        }

        Ok(())
    }

    /// DOGE: tight stop, fast trailing activation, wide EMA300 exit gated on
    /// high volatility, trending-market filter
    pub fn doge() -> Self {
        Self {
            stoploss: -0.05,
            trailing_stop: 0.03,
            trailing_offset: 0.05,
            profit_lock_levels: vec![
                ProfitLock::new(0.25, 0.18),
                ProfitLock::new(0.15, 0.10),
                ProfitLock::new(0.08, 0.04),
                ProfitLock::new(0.04, 0.01),
            ],
            ema_fast: 20,
            ema_slow: 50,
            ema_trend: 100,
            ema_exit: Some(300),
            rsi_oversold: 35.0,
            rsi_overbought: 75.0,
            slope_threshold: 0.4,
            pullback_tolerance: 1.02,
            volatility_multiplier: 1.3,
            min_adx: Some(22.0),
            advanced_filters: true,
            use_trend_filter: true,
            use_trend_exit: true,
            trend_exit_volatility_ratio: 1.6,
        }
    }

    /// MNT: wide stop for a high-volatility token, EMA100 trend-break exit
    pub fn mnt() -> Self {
        Self {
            stoploss: -0.12,
            trailing_stop: 0.10,
            trailing_offset: 0.15,
            profit_lock_levels: trend_hold_ladder(),
            ema_fast: 20,
            ema_slow: 50,
            ema_trend: 100,
            ema_exit: None,
            rsi_oversold: 40.0,
            rsi_overbought: 70.0,
            slope_threshold: 0.5,
            pullback_tolerance: 1.02,
            volatility_multiplier: 1.5,
            min_adx: default_min_adx(),
            advanced_filters: true,
            use_trend_filter: false,
            use_trend_exit: true,
            trend_exit_volatility_ratio: 0.0,
        }
    }

    /// Fallback for symbols without a tuned record
    pub fn fallback() -> Self {
        Self {
            stoploss: -0.10,
            trailing_stop: 0.08,
            trailing_offset: 0.12,
            profit_lock_levels: vec![
                ProfitLock::new(0.35, 0.25),
                ProfitLock::new(0.25, 0.15),
                ProfitLock::new(0.15, 0.08),
                ProfitLock::new(0.08, 0.03),
            ],
            ema_fast: 20,
            ema_slow: 50,
            ema_trend: 100,
            ema_exit: None,
            rsi_oversold: 35.0,
            rsi_overbought: 72.0,
            slope_threshold: 0.4,
            pullback_tolerance: 1.02,
            volatility_multiplier: 1.3,
            min_adx: default_min_adx(),
            advanced_filters: true,
            use_trend_filter: false,
            use_trend_exit: true,
            trend_exit_volatility_ratio: 0.0,
        }
    }

    /// Single record used by the trend hold strategy for every pair:
    /// no ADX, MACD or volume filters
    pub fn trend_hold() -> Self {
        Self {
            stoploss: -0.12,
            trailing_stop: 0.10,
            trailing_offset: 0.15,
            profit_lock_levels: trend_hold_ladder(),
            ema_fast: 20,
            ema_slow: 50,
            ema_trend: 100,
            ema_exit: None,
            rsi_oversold: 40.0,
            rsi_overbought: 70.0,
            slope_threshold: 0.5,
            pullback_tolerance: 1.02,
            volatility_multiplier: 1.0,
            min_adx: None,
            advanced_filters: false,
            use_trend_filter: false,
            use_trend_exit: true,
            trend_exit_volatility_ratio: 0.0,
        }
    }
}

fn trend_hold_ladder() -> Vec<ProfitLock> {
    vec![
        ProfitLock::new(0.50, 0.40),
        ProfitLock::new(0.30, 0.20),
        ProfitLock::new(0.20, 0.10),
        ProfitLock::new(0.10, 0.05),
        ProfitLock::new(0.05, 0.01),
    ]
}

/// Symbol -> parameter record, plus the record for unlisted symbols
#[derive(Debug, Clone)]
pub struct AssetTable {
    assets: HashMap<String, Arc<AssetParams>>,
    default: Arc<AssetParams>,
}

impl AssetTable {
    pub fn new(default: AssetParams) -> Self {
        Self {
            assets: HashMap::new(),
            default: Arc::new(default),
        }
    }

    /// DOGE and MNT records with the shared fallback
    pub fn builtin() -> Self {
        Self::new(AssetParams::fallback())
            .with_asset("DOGE", AssetParams::doge())
            .with_asset("MNT", AssetParams::mnt())
    }

    pub fn with_asset(mut self, symbol: &str, params: AssetParams) -> Self {
        self.insert(symbol, params);
        self
    }

    pub fn insert(&mut self, symbol: &str, params: AssetParams) {
        self.assets.insert(symbol.to_uppercase(), Arc::new(params));
    }

    pub fn set_default(&mut self, params: AssetParams) {
        self.default = Arc::new(params);
    }

    /// Record for a base symbol, if one is listed
    pub fn get(&self, symbol: &str) -> Option<&Arc<AssetParams>> {
        self.assets.get(&symbol.to_uppercase())
    }

    pub fn default_params(&self) -> &Arc<AssetParams> {
        &self.default
    }

    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.assets.keys().map(String::as_str).collect();
        symbols.sort_unstable();
        symbols
    }

    /// Validate every record, including the default
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.default.validate("default")?;
        for (symbol, params) in &self.assets {
            params.validate(symbol)?;
        }
        Ok(())
    }
}

impl Default for AssetTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Base asset of a pair: "doge/usdt" -> "DOGE"
pub fn base_asset(pair: &str) -> String {
    pair.split('/').next().unwrap_or(pair).trim().to_uppercase()
}
