// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Middle band = SMA of the whole slice, σ = population standard deviation
// around it, upper/lower = middle ± k·σ (k = 2 by default). The slice is not
// windowed: the caller decides how many prices to pass.

use crate::stats::{mean, population_variance};

/// Result of a Bollinger Band calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerResult {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub std_dev: f64,
}

/// Calculate Bollinger Bands over every price in `prices`.
///
/// Returns `None` for an empty slice.
pub fn calculate_bollinger(prices: &[f64], num_std: f64) -> Option<BollingerResult> {
    let middle = mean(prices)?;
    let std_dev = population_variance(prices, middle)?.sqrt();

    Some(BollingerResult {
        upper: middle + num_std * std_dev,
        middle,
        lower: middle - num_std * std_dev,
        std_dev,
    })
}
