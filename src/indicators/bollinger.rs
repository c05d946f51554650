/// Bollinger Bands
///
/// - Middle: SMA over `period` closes
/// - Upper/Lower: middle ± `std_dev_mult` × population standard deviation
///
/// The first `period - 1` bars are NaN.

#[derive(Debug, Clone)]
pub struct BollingerSeries {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

impl BollingerSeries {
    /// Relative band width: (upper - lower) / middle
    pub fn width(&self) -> Vec<f64> {
        self.upper
            .iter()
            .zip(&self.lower)
            .zip(&self.middle)
            .map(|((upper, lower), middle)| (upper - lower) / middle)
            .collect()
    }
}

pub fn calculate_bollinger_series(prices: &[f64], period: usize, std_dev_mult: f64) -> BollingerSeries {
    let len = prices.len();
    let mut bands = BollingerSeries {
        upper: vec![f64::NAN; len],
        middle: vec![f64::NAN; len],
        lower: vec![f64::NAN; len],
    };
    if period == 0 || len < period {
        return bands;
    }

    for i in (period - 1)..len {
        let window = &prices[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance = window.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / period as f64;
        let std_dev = variance.sqrt();

        bands.middle[i] = mean;
        bands.upper[i] = mean + std_dev_mult * std_dev;
        bands.lower[i] = mean - std_dev_mult * std_dev;
    }

    bands
}
