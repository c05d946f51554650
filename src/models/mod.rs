use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// OHLCV candlestick data for one pair at one point in time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candle {
    pub pair: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Read-only view of an open position, supplied by the host on every tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub pair: String,
    pub open_time: DateTime<Utc>,
    pub current_profit: f64, // 0.23 = +23%
}

impl PositionSnapshot {
    pub fn new(pair: impl Into<String>, open_time: DateTime<Utc>, current_profit: f64) -> Self {
        Self {
            pair: pair.into(),
            open_time,
            current_profit,
        }
    }

    /// Fractional hours held as of `now`
    pub fn holding_hours(&self, now: DateTime<Utc>) -> f64 {
        (now - self.open_time).num_milliseconds() as f64 / 3_600_000.0
    }
}

/// Why an entry signal fired
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntryTag {
    FullSignal,
}

/// Why an exit signal fired
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExitTag {
    TrendBreak,
}

/// Reason returned from the per-position custom exit callback
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CustomExit {
    LongHoldingLoss,
}

impl EntryTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryTag::FullSignal => "full_signal",
        }
    }
}

impl ExitTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitTag::TrendBreak => "trend_break",
        }
    }
}

impl CustomExit {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomExit::LongHoldingLoss => "long_holding_loss",
        }
    }
}

impl fmt::Display for EntryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ExitTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for CustomExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry/exit flags for a single bar
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SignalRow {
    pub timestamp: Option<DateTime<Utc>>,
    pub enter_long: bool,
    pub enter_tag: Option<EntryTag>,
    pub exit_long: bool,
    pub exit_tag: Option<ExitTag>,
}

impl SignalRow {
    pub fn has_signal(&self) -> bool {
        self.enter_long || self.exit_long
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_holding_hours() {
        let opened = Utc::now();
        let position = PositionSnapshot::new("DOGE/USDT", opened, 0.02);

        let hours = position.holding_hours(opened + Duration::minutes(90));
        assert_eq!(hours, 1.5);
    }

    #[test]
    fn test_holding_hours_keeps_subsecond_time() {
        let opened = Utc::now();
        let position = PositionSnapshot::new("DOGE/USDT", opened, -0.08);

        let now = opened + Duration::hours(168) + Duration::milliseconds(1);
        assert!(position.holding_hours(now) > 168.0);
        assert_eq!(
            crate::risk::long_holding_exit(position.holding_hours(now), position.current_profit),
            Some(CustomExit::LongHoldingLoss)
        );
    }

    #[test]
    fn test_tags_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&EntryTag::FullSignal).unwrap(),
            "\"full_signal\""
        );
        assert_eq!(
            serde_json::to_string(&ExitTag::TrendBreak).unwrap(),
            "\"trend_break\""
        );
        assert_eq!(CustomExit::LongHoldingLoss.to_string(), "long_holding_loss");
    }

    #[test]
    fn test_candle_from_json() {
        let json = r#"{
            "pair": "MNT/USDT",
            "timestamp": "2025-01-01T00:00:00Z",
            "open": 1.0,
            "high": 1.1,
            "low": 0.9,
            "close": 1.05,
            "volume": 12000.0
        }"#;

        let candle: Candle = serde_json::from_str(json).unwrap();
        assert_eq!(candle.pair, "MNT/USDT");
        assert_eq!(candle.close, 1.05);
    }
}
