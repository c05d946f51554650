use crate::config::ProfitLock;
use crate::models::CustomExit;

/// Holding time after which a losing position is force-closed
pub const MAX_LOSING_HOLD_HOURS: f64 = 168.0;

/// Loss a long-held position must exceed before the forced exit fires
pub const LONG_HOLD_MAX_LOSS: f64 = -0.05;

/// Stop-loss ratio for the current profit, from a profit-lock ladder
///
/// Scans `levels` in descending-threshold order. The first rung whose
/// threshold is at or below `current_profit` yields
/// `-(current_profit - locked)`, i.e. a stop that keeps `locked` profit.
/// With no matching rung the fixed `stoploss` applies.
///
/// Stateless: the result depends only on the current profit, so it can
/// loosen again when profit falls back across a threshold.
pub fn profit_lock_stoploss(current_profit: f64, levels: &[ProfitLock], stoploss: f64) -> f64 {
    levels
        .iter()
        .find(|level| current_profit >= level.threshold)
        .map(|level| -(current_profit - level.locked))
        .unwrap_or(stoploss)
}

/// Profit still kept if the stop returned for `current_profit` is hit
///
/// Uses the additive approximation `current_profit + stop`. Within one rung
/// this is the rung's locked profit, so it never falls as profit grows.
pub fn locked_profit_floor(current_profit: f64, stop: f64) -> f64 {
    current_profit + stop
}

/// Forced exit for positions held longer than a week at more than a 5% loss
///
/// Both bounds are strict: exactly 168 hours or exactly -5% does not exit.
pub fn long_holding_exit(holding_hours: f64, current_profit: f64) -> Option<CustomExit> {
    if holding_hours > MAX_LOSING_HOLD_HOURS && current_profit < LONG_HOLD_MAX_LOSS {
        return Some(CustomExit::LongHoldingLoss);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AssetParams;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn doge_levels() -> Vec<ProfitLock> {
        AssetParams::doge().profit_lock_levels
    }

    #[test]
    fn test_doge_ladder() {
        let levels = doge_levels();

        assert_relative_eq!(profit_lock_stoploss(0.30, &levels, -0.05), -0.12, epsilon = 1e-12);
        assert_relative_eq!(profit_lock_stoploss(0.20, &levels, -0.05), -0.10, epsilon = 1e-12);
        assert_relative_eq!(profit_lock_stoploss(0.06, &levels, -0.05), -0.05, epsilon = 1e-12);
        assert_eq!(profit_lock_stoploss(0.02, &levels, -0.05), -0.05);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let levels = doge_levels();

        // Exactly 25% profit hits the top rung: keep 18%
        assert_relative_eq!(profit_lock_stoploss(0.25, &levels, -0.05), -0.07, epsilon = 1e-12);
        assert_relative_eq!(profit_lock_stoploss(0.04, &levels, -0.05), -0.03, epsilon = 1e-12);
    }

    #[test]
    fn test_losing_position_uses_fixed_stop() {
        assert_eq!(profit_lock_stoploss(-0.03, &doge_levels(), -0.05), -0.05);
    }

    #[test]
    fn test_empty_ladder_uses_fixed_stop() {
        assert_eq!(profit_lock_stoploss(0.90, &[], -0.12), -0.12);
    }

    #[test]
    fn test_nan_profit_uses_fixed_stop() {
        assert_eq!(profit_lock_stoploss(f64::NAN, &doge_levels(), -0.05), -0.05);
    }

    #[test]
    fn test_cross_band_can_loosen() {
        let levels = doge_levels();

        // Just above the 15% rung the stop sits 5% below price...
        let above = profit_lock_stoploss(0.15, &levels, -0.05);
        // ...just below it, the 8% rung only keeps 4%
        let below = profit_lock_stoploss(0.149, &levels, -0.05);

        assert!(below < above);
    }

    #[test]
    fn test_locked_floor_matches_rung() {
        let levels = doge_levels();
        let stop = profit_lock_stoploss(0.30, &levels, -0.05);

        assert_relative_eq!(locked_profit_floor(0.30, stop), 0.18, epsilon = 1e-12);
    }

    #[test]
    fn test_long_holding_exit() {
        assert_eq!(long_holding_exit(200.0, -0.10), Some(CustomExit::LongHoldingLoss));
        assert_eq!(long_holding_exit(168.5, -0.051), Some(CustomExit::LongHoldingLoss));
    }

    #[test]
    fn test_long_holding_exit_strict_bounds() {
        assert_eq!(long_holding_exit(168.0, -0.10), None);
        assert_eq!(long_holding_exit(200.0, -0.05), None);
        assert_eq!(long_holding_exit(100.0, -0.30), None);
        assert_eq!(long_holding_exit(500.0, 0.02), None);
    }

    proptest! {
        #[test]
        fn prop_matches_highest_reached_rung(profit in -0.5f64..1.0) {
            let levels = doge_levels();
            let stop = profit_lock_stoploss(profit, &levels, -0.05);

            match levels.iter().filter(|l| l.threshold <= profit).map(|l| l.threshold).reduce(f64::max) {
                Some(top) => {
                    let level = levels.iter().find(|l| l.threshold == top).unwrap();
                    prop_assert!((stop + (profit - level.locked)).abs() < 1e-12);
                }
                None => prop_assert_eq!(stop, -0.05),
            }
        }

        #[test]
        fn prop_floor_monotonic_within_band(a in -0.5f64..1.0, b in -0.5f64..1.0) {
            let levels = doge_levels();
            let (p1, p2) = if a <= b { (a, b) } else { (b, a) };
            let band = |p: f64| levels.iter().position(|l| p >= l.threshold);
            prop_assume!(band(p1) == band(p2));

            let floor = |p: f64| locked_profit_floor(p, profit_lock_stoploss(p, &levels, -0.05));
            prop_assert!(floor(p2) >= floor(p1) - 1e-12);
        }
    }
}
