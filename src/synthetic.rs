use crate::models::Candle;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Market scenario types for synthetic data generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MarketScenario {
    /// Steady uptrend with noise (+0.3% per bar)
    Uptrend,
    /// Steady downtrend with noise (-0.3% per bar)
    Downtrend,
    /// Sideways/choppy market (mean-reverting)
    Sideways,
    /// High volatility (±5% swings)
    Volatile,
    /// Uptrend whose candles repeatedly wick back to the fast EMA region
    Pullback,
    /// Rally for the first 70% of bars, then a steady breakdown
    RallyThenBreak,
}

/// Generates synthetic candles for demos and tests
pub struct SyntheticDataGenerator {
    rng: StdRng,
    pair: String,
    base_price: f64,
    base_volume: f64,
    start: DateTime<Utc>,
}

impl SyntheticDataGenerator {
    /// Create a new generator with a seed for reproducibility
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            pair: "SYNTH/USDT".to_string(),
            base_price: 1.0,
            base_volume: 1_000_000.0,
            start: Utc
                .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
                .single()
                .unwrap_or_else(Utc::now),
        }
    }

    pub fn with_pair(mut self, pair: impl Into<String>) -> Self {
        self.pair = pair.into();
        self
    }

    pub fn with_start(mut self, start: DateTime<Utc>) -> Self {
        self.start = start;
        self
    }

    pub fn base_price(&self) -> f64 {
        self.base_price
    }

    /// Generate candles for a specific market scenario
    ///
    /// # Arguments
    /// * `scenario` - The market scenario to simulate
    /// * `num_candles` - Number of candles (350+ covers every indicator warmup)
    /// * `interval_minutes` - Minutes between candles (60 for the 1h strategies)
    pub fn generate(
        &mut self,
        scenario: MarketScenario,
        num_candles: usize,
        interval_minutes: i64,
    ) -> Vec<Candle> {
        let mut candles = Vec::with_capacity(num_candles);
        let mut current_price = self.base_price;
        let break_at = num_candles * 7 / 10;

        for i in 0..num_candles {
            let timestamp = self.start + Duration::minutes(i as i64 * interval_minutes);

            let change = match scenario {
                MarketScenario::Uptrend => 0.003 + self.rng.gen_range(-0.002..0.002),
                MarketScenario::Downtrend => -0.003 + self.rng.gen_range(-0.002..0.002),
                MarketScenario::Sideways => {
                    // Mean reversion force + noise
                    (self.base_price - current_price) / current_price * 0.1
                        + self.rng.gen_range(-0.01..0.01)
                }
                MarketScenario::Volatile => self.rng.gen_range(-0.05..0.05),
                MarketScenario::Pullback => sawtooth_step(i) + self.rng.gen_range(-0.001..0.001),
                MarketScenario::RallyThenBreak if i < break_at => {
                    sawtooth_step(i) + self.rng.gen_range(-0.001..0.001)
                }
                MarketScenario::RallyThenBreak => -0.01 + self.rng.gen_range(-0.002..0.002),
            };
            current_price *= 1.0 + change;

            // Prevent price from going too low
            current_price = current_price.max(self.base_price * 0.05);

            let wick = if scenario == MarketScenario::Pullback { 0.03 } else { 0.004 };
            let candle = self.create_candle(current_price, timestamp, wick);
            candles.push(candle);
        }

        candles
    }

    /// Helper to create a candle from price and timestamp
    fn create_candle(&mut self, price: f64, timestamp: DateTime<Utc>, max_wick: f64) -> Candle {
        // Generate high and low around the close price
        let high = price * (1.0 + self.rng.gen_range(0.0..0.004));
        let low = price * (1.0 - self.rng.gen_range(max_wick / 2.0..max_wick));

        // Generate open and clamp it between low and high
        let open_raw = price * (1.0 + self.rng.gen_range(-0.004..0.004));
        let open = open_raw.clamp(low, high);

        // Vary volume ±30%
        let volume = self.base_volume * self.rng.gen_range(0.7..1.3);

        Candle {
            pair: self.pair.clone(),
            timestamp,
            open,
            high,
            low,
            close: price,
            volume,
        }
    }
}

/// Three up bars, two down bars
fn sawtooth_step(i: usize) -> f64 {
    if i % 5 < 3 {
        0.01
    } else {
        -0.01
    }
}
