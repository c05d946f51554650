// Per-position risk callbacks
pub mod stoploss;

pub use stoploss::{
    locked_profit_floor, long_holding_exit, profit_lock_stoploss, LONG_HOLD_MAX_LOSS,
    MAX_LOSING_HOLD_HOURS,
};
