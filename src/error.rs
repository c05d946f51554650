use thiserror::Error;

/// Invalid instrument parameter records
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{asset}: profit lock thresholds must be strictly decreasing ({previous} then {next})")]
    UnsortedProfitLocks {
        asset: String,
        previous: f64,
        next: f64,
    },

    #[error("{asset}: locked profit {locked} must be below its threshold {threshold}")]
    LockAboveThreshold {
        asset: String,
        threshold: f64,
        locked: f64,
    },

    #[error("{asset}: {field} must be greater than zero")]
    ZeroPeriod { asset: String, field: &'static str },

    #[error("{asset}: rsi_oversold {oversold} must be below rsi_overbought {overbought}")]
    RsiBounds {
        asset: String,
        oversold: f64,
        overbought: f64,
    },

    #[error("{asset}: stoploss must be negative, got {value}")]
    StoplossNotNegative { asset: String, value: f64 },

    #[error("failed to load asset table: {0}")]
    Load(#[from] config::ConfigError),
}

/// Top-level error type
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid candle data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("candles for {pair} are not sorted by timestamp at index {index}")]
    UnsortedCandles { pair: String, index: usize },
}
