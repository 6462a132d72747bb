// =============================================================================
// MACD: Moving Average Convergence Divergence (scalar form)
// =============================================================================
//
//   macd      = EMA_fast(prices) - EMA_slow(prices)
//   signal    = macd * 2 / (signal_period + 1)
//   histogram = macd - signal
//
// Both EMAs are the scalar accumulators from `ema.rs`, seeded at the first
// price. The signal line is a one-step smoothing of the current MACD value,
// not an EMA over a MACD series.

use super::ema::{multiplier, scalar_ema};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdResult {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Returns `None` for an empty price slice.
pub fn calculate_macd(
    prices: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> Option<MacdResult> {
    let fast = scalar_ema(prices, fast_period)?;
    let slow = scalar_ema(prices, slow_period)?;
    let macd = fast - slow;
    let signal = macd * multiplier(signal_period);
    Some(MacdResult {
        macd,
        signal,
        histogram: macd - signal,
    })
}
