//! Asset table overrides from a TOML file and `TRENDHOLD__` environment
//! variables.
//!
//! ```toml
//! [default]
//! stoploss = -0.08
//! # ...full record...
//!
//! [assets.SOL]
//! stoploss = -0.07
//! trailing_stop = 0.05
//! trailing_offset = 0.08
//! profit_lock_levels = [
//!     { threshold = 0.20, locked = 0.12 },
//!     { threshold = 0.10, locked = 0.05 },
//! ]
//! # ...
//! ```
//!
//! Listed assets replace the built-in record for that symbol; everything else
//! keeps the built-in table.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use super::{AssetParams, AssetTable};
use crate::error::ConfigError;

pub const ENV_PREFIX: &str = "TRENDHOLD";

#[derive(Debug, Default, Deserialize)]
struct AssetTableFile {
    #[serde(default)]
    assets: HashMap<String, AssetParams>,
    #[serde(default)]
    default: Option<AssetParams>,
}

impl AssetTable {
    /// Built-in table overlaid with the records in `path` and the environment
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        Self::from_settings(settings)
    }

    /// Built-in table overlaid with environment records only
    pub fn from_env() -> Result<Self, ConfigError> {
        let settings = config::Config::builder().add_source(environment()).build()?;
        Self::from_settings(settings)
    }

    /// Built-in table overlaid with records from a TOML string
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;

        Self::from_settings(settings)
    }

    fn from_settings(settings: config::Config) -> Result<Self, ConfigError> {
        let file: AssetTableFile = settings.try_deserialize()?;

        let mut table = AssetTable::builtin();
        if let Some(default) = file.default {
            table.set_default(default);
        }
        for (symbol, params) in file.assets {
            tracing::debug!(symbol = %symbol.to_uppercase(), "Loaded asset override");
            table.insert(&symbol, params);
        }

        table.validate()?;
        Ok(table)
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOL: &str = r#"
        [assets.SOL]
        stoploss = -0.07
        trailing_stop = 0.05
        trailing_offset = 0.08
        profit_lock_levels = [
            { threshold = 0.20, locked = 0.12 },
            { threshold = 0.10, locked = 0.05 },
        ]
        ema_fast = 12
        ema_slow = 26
        ema_trend = 90
        rsi_oversold = 38.0
        rsi_overbought = 72.0
        slope_threshold = 0.3
        pullback_tolerance = 1.01
        volatility_multiplier = 1.2
    "#;

    #[test]
    fn test_override_adds_asset() {
        let table = AssetTable::from_toml_str(SOL).unwrap();
        let sol = table.get("SOL").unwrap();

        assert_eq!(sol.stoploss, -0.07);
        assert_eq!(sol.profit_lock_levels.len(), 2);
        assert_eq!(sol.ema_fast, 12);

        // Serde defaults for omitted fields
        assert_eq!(sol.min_adx, Some(20.0));
        assert!(sol.advanced_filters);
        assert!(sol.use_trend_exit);
        assert!(!sol.use_trend_filter);
        assert_eq!(sol.exit_ema_period(), 90);

        // Built-ins survive
        assert_eq!(table.get("DOGE").unwrap().stoploss, -0.05);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let bad = SOL.replace("threshold = 0.10, locked = 0.05", "threshold = 0.30, locked = 0.05");
        let err = AssetTable::from_toml_str(&bad).unwrap_err();

        assert!(matches!(err, ConfigError::UnsortedProfitLocks { .. }));
    }

    #[test]
    fn test_missing_field_is_load_error() {
        let err = AssetTable::from_toml_str("[assets.SOL]\nstoploss = -0.07\n").unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn test_empty_file_is_builtin() {
        let table = AssetTable::from_toml_str("").unwrap();
        assert_eq!(table.symbols(), vec!["DOGE", "MNT"]);
    }
}
