use chrono::{Duration, Utc};
use std::sync::Arc;
use trendhold::config::{AssetParams, AssetTable};
use trendhold::models::{CustomExit, EntryTag, ExitTag, PositionSnapshot};
use trendhold::strategy::signals::{
    entry_predicates, failed_predicates, validate_candle_order, EntryPredicate,
};
use trendhold::strategy::{AdaptiveStrategy, Strategy, StrategyKind, TrendHoldStrategy};
use trendhold::synthetic::{MarketScenario, SyntheticDataGenerator};
use trendhold::Error;

fn candles(scenario: MarketScenario, bars: usize, pair: &str) -> Vec<trendhold::models::Candle> {
    SyntheticDataGenerator::new(42)
        .with_pair(pair)
        .generate(scenario, bars, 60)
}

#[test]
fn test_trend_hold_enters_pullbacks_after_warmup() {
    let strategy = TrendHoldStrategy::default();
    let data = candles(MarketScenario::Pullback, 500, "MNT/USDT");

    let indicators = strategy.populate_indicators(&data, "MNT/USDT");
    let rows = strategy.populate_signals(&indicators, "MNT/USDT");

    assert_eq!(indicators.len(), data.len());
    assert_eq!(rows.len(), data.len());

    // EMA100 is undefined before bar 99
    assert!(rows[..99].iter().all(|r| !r.enter_long));
    assert!(rows[150..].iter().any(|r| r.enter_long));

    for row in rows.iter().filter(|r| r.enter_long) {
        assert_eq!(row.enter_tag, Some(EntryTag::FullSignal));
    }
    for (row, candle) in rows.iter().zip(&data) {
        assert_eq!(row.timestamp, Some(candle.timestamp));
    }
}

#[test]
fn test_adaptive_entries_are_stricter_than_trend_hold() {
    // MNT shares the trend hold EMA/RSI/slope settings and adds ADX, MACD
    // and volume filters on top
    let data = candles(MarketScenario::Pullback, 500, "MNT/USDT");

    let adaptive = AdaptiveStrategy::default().analyze(&data, "MNT/USDT");
    let hold = TrendHoldStrategy::default().analyze(&data, "MNT/USDT");

    assert!(adaptive.iter().any(|r| r.enter_long));
    assert!(
        adaptive.iter().filter(|r| r.enter_long).count()
            < hold.iter().filter(|r| r.enter_long).count()
    );

    for (i, (a, h)) in adaptive.iter().zip(&hold).enumerate() {
        if a.enter_long {
            assert!(h.enter_long, "adaptive entered alone at bar {}", i);
        }
    }
}

#[test]
fn test_doge_entries_pass_adx_and_trending_filters() {
    let strategy = AdaptiveStrategy::default();
    let params = strategy.params_for("DOGE/USDT");
    let data = candles(MarketScenario::Pullback, 500, "DOGE/USDT");

    let indicators = strategy.populate_indicators(&data, "DOGE/USDT");
    let rows = strategy.populate_signals(&indicators, "DOGE/USDT");

    let predicates = entry_predicates(&params);
    assert!(predicates.contains(&EntryPredicate::AdxAboveMinimum));
    assert!(predicates.contains(&EntryPredicate::Trending));

    let entries: Vec<usize> = (0..rows.len()).filter(|&i| rows[i].enter_long).collect();
    assert!(!entries.is_empty());
    for &i in &entries {
        let bar = &indicators[i];
        assert!(bar.adx > 22.0, "bar {} adx {}", i, bar.adx);
        assert!(bar.is_trending, "bar {} not trending", i);
        assert!(bar.macd_hist > 0.0);
        assert!(bar.volume_ratio > 0.8);
    }

    // Dropping both filters can only add entries
    let mut relaxed = params.as_ref().clone();
    relaxed.min_adx = None;
    relaxed.use_trend_filter = false;
    let relaxed_rows = trendhold::strategy::signals::populate_signals(&indicators, &relaxed);
    for &i in &entries {
        assert!(relaxed_rows[i].enter_long);
    }
    assert!(relaxed_rows.iter().filter(|r| r.enter_long).count() >= entries.len());
}

#[test]
fn test_no_entries_in_downtrend() {
    let data = candles(MarketScenario::Downtrend, 400, "DOGE/USDT");

    for kind in [StrategyKind::Adaptive, StrategyKind::TrendHold] {
        let strategy = kind.build(AssetTable::builtin());
        let rows = strategy.analyze(&data, "DOGE/USDT");
        assert!(rows.iter().all(|r| !r.enter_long), "{} entered", strategy.name());
    }
}

#[test]
fn test_downtrend_fails_uptrend_predicate() {
    let strategy = TrendHoldStrategy::default();
    let data = candles(MarketScenario::Downtrend, 300, "MNT/USDT");
    let indicators = strategy.populate_indicators(&data, "MNT/USDT");
    let predicates = entry_predicates(strategy.params());

    let failed = failed_predicates(&indicators[250], &predicates, strategy.params());
    assert!(failed.contains(&EntryPredicate::Uptrend));
}

#[test]
fn test_trend_break_exit_after_rally() {
    let strategy = TrendHoldStrategy::default();
    let data = candles(MarketScenario::RallyThenBreak, 300, "MNT/USDT");
    let rows = strategy.analyze(&data, "MNT/USDT");

    // Rally holds above EMA100, the breakdown starts at bar 210
    assert!(rows[..210].iter().all(|r| !r.exit_long));
    assert!(rows[210..].iter().any(|r| r.exit_long));

    let first_exit = rows.iter().position(|r| r.exit_long).unwrap();
    assert_eq!(rows[first_exit].exit_tag, Some(ExitTag::TrendBreak));
    assert!(data[first_exit].close < data[first_exit - 1].close);
}

#[test]
fn test_doge_exit_needs_ema300_history() {
    let strategy = AdaptiveStrategy::default();
    let data = candles(MarketScenario::RallyThenBreak, 300, "DOGE/USDT");
    let rows = strategy.analyze(&data, "DOGE/USDT");

    assert!(rows.iter().all(|r| !r.exit_long));
}

#[test]
fn test_unknown_pair_uses_default_record() {
    let table = AssetTable::builtin();
    let default = Arc::clone(table.default_params());
    let strategy = AdaptiveStrategy::new(table);

    let params = strategy.params_for("XRP/USDT");
    assert!(Arc::ptr_eq(&params, &default));
    assert_eq!(*params, AssetParams::fallback());

    // Same signals as the default record applied directly
    let data = candles(MarketScenario::Pullback, 500, "XRP/USDT");
    let via_strategy = strategy.analyze(&data, "XRP/USDT");
    assert!(via_strategy.iter().any(|r| r.enter_long));
    let direct = trendhold::strategy::signals::populate_signals(
        &trendhold::indicators::populate_indicators(&data, &AssetParams::fallback()),
        &AssetParams::fallback(),
    );
    assert_eq!(via_strategy, direct);
}

#[test]
fn test_custom_stoploss_callbacks() {
    let strategy = StrategyKind::Adaptive.build(AssetTable::builtin());
    let now = Utc::now();
    let stop = |pair: &str, profit: f64| {
        strategy
            .custom_stoploss(&PositionSnapshot::new(pair, now, profit), now)
            .unwrap()
    };

    // DOGE: 10% profit sits on the 8% rung, keep 4%
    assert!((stop("DOGE/USDT", 0.10) - -0.06).abs() < 1e-12);
    // Pair case and quote currency do not matter
    assert_eq!(stop("doge/usdt", 0.10), stop("DOGE/BTC", 0.10));
    // Below every rung: fixed stop
    assert_eq!(stop("DOGE/USDT", 0.02), -0.05);
    assert_eq!(stop("MNT/USDT", -0.30), -0.12);
}

#[test]
fn test_custom_exit_only_for_long_losers() {
    let strategy = AdaptiveStrategy::default();
    let opened = Utc::now() - Duration::days(10);
    let now = Utc::now();

    let loser = PositionSnapshot::new("MNT/USDT", opened, -0.06);
    let small_loser = PositionSnapshot::new("MNT/USDT", opened, -0.05);
    let winner = PositionSnapshot::new("MNT/USDT", opened, 0.20);

    assert_eq!(strategy.custom_exit(&loser, now), Some(CustomExit::LongHoldingLoss));
    assert_eq!(strategy.custom_exit(&small_loser, now), None);
    assert_eq!(strategy.custom_exit(&winner, now), None);

    // Trend hold never forces exits
    let hold = TrendHoldStrategy::default();
    assert_eq!(hold.custom_exit(&loser, now), None);
}

#[test]
fn test_table_overrides_reach_strategy() {
    let table = AssetTable::from_toml_str(
        r#"
        [assets.sol]
        stoploss = -0.07
        trailing_stop = 0.05
        trailing_offset = 0.08
        profit_lock_levels = [
            { threshold = 0.20, locked = 0.12 },
            { threshold = 0.10, locked = 0.05 },
        ]
        ema_fast = 20
        ema_slow = 50
        ema_trend = 100
        rsi_oversold = 40.0
        rsi_overbought = 70.0
        slope_threshold = 0.5
        pullback_tolerance = 1.02
        volatility_multiplier = 1.2
        "#,
    )
    .unwrap();
    let strategy = AdaptiveStrategy::new(table);
    let now = Utc::now();

    let sol = strategy
        .custom_stoploss(&PositionSnapshot::new("SOL/USDT", now, 0.0), now)
        .unwrap();
    assert_eq!(sol, -0.07);

    // Built-in records survive the overlay
    assert_eq!(strategy.params_for("DOGE/USDT").stoploss, -0.05);
}

#[test]
fn test_unsorted_candles_rejected() {
    let mut data = candles(MarketScenario::Sideways, 50, "MNT/USDT");
    assert!(validate_candle_order(&data).is_ok());

    data.swap(10, 11);
    match validate_candle_order(&data) {
        Err(Error::UnsortedCandles { index, .. }) => assert_eq!(index, 11),
        other => panic!("expected UnsortedCandles, got {:?}", other),
    }
}

#[test]
fn test_short_history_yields_no_signals() {
    let data = candles(MarketScenario::Pullback, 30, "MNT/USDT");

    for kind in [StrategyKind::Adaptive, StrategyKind::TrendHold] {
        let rows = kind.build(AssetTable::builtin()).analyze(&data, "MNT/USDT");
        assert_eq!(rows.len(), 30);
        assert!(rows.iter().all(|r| !r.has_signal()));
    }
}
