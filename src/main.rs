use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use trendhold::config::AssetTable;
use trendhold::error::Error;
use trendhold::models::{Candle, PositionSnapshot};
use trendhold::risk::locked_profit_floor;
use trendhold::strategy::signals::validate_candle_order;
use trendhold::strategy::StrategyKind;
use trendhold::synthetic::{MarketScenario, SyntheticDataGenerator};

#[derive(Debug, Parser)]
#[command(name = "trendhold", version, about = "Trend-following signal and stop evaluator")]
struct Cli {
    /// Asset table overrides (TOML)
    #[arg(long, global = true)]
    assets: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "adaptive", global = true)]
    strategy: StrategyKind,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute entry/exit signals for a JSON array of candles
    Signals {
        #[arg(long)]
        candles: PathBuf,
        #[arg(long)]
        pair: String,
        /// Only print the last N rows
        #[arg(long)]
        tail: Option<usize>,
    },
    /// Evaluate the custom stop for an open position
    Stoploss {
        #[arg(long)]
        pair: String,
        #[arg(long, allow_hyphen_values = true)]
        profit: f64,
        /// Hours the position has been open
        #[arg(long, default_value_t = 0.0)]
        hours: f64,
    },
    /// Run a strategy over synthetic candles and summarize its signals
    Demo {
        #[arg(long, value_enum, default_value = "pullback")]
        scenario: MarketScenario,
        #[arg(long, default_value_t = 500)]
        bars: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value = "MNT/USDT")]
        pair: String,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();
    let table = load_table(cli.assets.as_deref())?;
    let strategy = cli.strategy.build(table);

    tracing::info!(strategy = strategy.name(), "Strategy loaded");

    match cli.command {
        Command::Signals {
            candles,
            pair,
            tail,
        } => {
            let candles = read_candles(&candles)?;
            validate_candle_order(&candles)?;

            let rows = strategy.analyze(&candles, &pair);
            let skip = tail.map_or(0, |n| rows.len().saturating_sub(n));
            let entries = rows.iter().filter(|r| r.enter_long).count();
            let exits = rows.iter().filter(|r| r.exit_long).count();
            tracing::info!(pair = %pair, bars = rows.len(), entries, exits, "Signals computed");

            println!("{}", serde_json::to_string_pretty(&rows[skip..])?);
        }
        Command::Stoploss { pair, profit, hours } => {
            let now = Utc::now();
            let opened = opened_hours_ago(now, hours)?;
            let position = PositionSnapshot::new(pair, opened, profit);

            let stop = strategy
                .custom_stoploss(&position, now)
                .unwrap_or(strategy.settings().stoploss);
            let exit = strategy.custom_exit(&position, now);

            let report = serde_json::json!({
                "pair": position.pair,
                "profit": profit,
                "stoploss": stop,
                "locked_profit": locked_profit_floor(profit, stop),
                "custom_exit": exit,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Demo {
            scenario,
            bars,
            seed,
            pair,
        } => {
            let candles = SyntheticDataGenerator::new(seed)
                .with_pair(pair.clone())
                .generate(scenario, bars, 60);
            let rows = strategy.analyze(&candles, &pair);
            let warmup = strategy.settings().startup_candle_count;

            println!("\n{} on {:?} ({} bars, seed {})", strategy.name(), scenario, bars, seed);
            println!("{}", "─".repeat(60));
            println!("{:<22} {:>12} {:>8} {:>14}", "Time", "Close", "Signal", "Tag");

            for (candle, row) in candles.iter().zip(&rows).filter(|(_, r)| r.has_signal()) {
                let (signal, tag) = match (row.enter_long, row.exit_tag) {
                    (true, _) => ("ENTER", row.enter_tag.map(|t| t.to_string())),
                    (false, tag) => ("EXIT", tag.map(|t| t.to_string())),
                };
                println!(
                    "{:<22} {:>12.6} {:>8} {:>14}",
                    candle.timestamp.format("%Y-%m-%d %H:%M"),
                    candle.close,
                    signal,
                    tag.unwrap_or_default()
                );
            }

            let entries = rows.iter().filter(|r| r.enter_long).count();
            let exits = rows.iter().filter(|r| r.exit_long).count();
            println!("{}", "─".repeat(60));
            println!(
                "entries: {}  exits: {}  (host startup window: {} bars)\n",
                entries, exits, warmup
            );
        }
    }

    Ok(())
}

fn setup_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("trendhold=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_table(path: Option<&Path>) -> Result<AssetTable> {
    let table = match path {
        Some(path) => AssetTable::load(path)
            .with_context(|| format!("failed to load asset table from {}", path.display()))?,
        None => AssetTable::from_env().context("failed to read asset overrides from environment")?,
    };

    tracing::debug!(assets = ?table.symbols(), "Asset table ready");
    Ok(table)
}

/// Open time of a position held for `hours` as of `now`
fn opened_hours_ago(now: DateTime<Utc>, hours: f64) -> Result<DateTime<Utc>> {
    if !hours.is_finite() || hours < 0.0 {
        anyhow::bail!("--hours must be a non-negative number, got {}", hours);
    }

    let held = Duration::try_milliseconds((hours * 3_600_000.0).round() as i64)
        .with_context(|| format!("--hours {} is out of range", hours))?;
    now.checked_sub_signed(held)
        .with_context(|| format!("--hours {} is out of range", hours))
}

fn read_candles(path: &Path) -> Result<Vec<Candle>> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.display().to_string(),
        source,
    })?;

    let candles: Vec<Candle> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of candles", path.display()))?;
    Ok(candles)
}
