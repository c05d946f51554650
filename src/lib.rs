// Core modules
pub mod config;
pub mod error;
pub mod indicators;
pub mod models;
pub mod risk;
pub mod strategy;
pub mod synthetic;

// Re-export commonly used types
pub use config::{AssetParams, AssetTable, ParamCache, ProfitLock};
pub use error::{ConfigError, Error};
pub use models::*;
pub use strategy::{Strategy, StrategyKind};

// Error handling
pub type Result<T> = std::result::Result<T, Error>;
