// =============================================================================
// KDJ Stochastic Oscillator
// =============================================================================
//
// RSV for bar i over the trailing `kdj_period` window:
//   RSV_i = 0                                           i < kdj_period - 1
//   RSV_i = (close_i - low_n) / (high_n - low_n) * 100  otherwise
//   RSV_i = 50                                          when high_n == low_n
//
// Smoothing, seeded at 50 on the first bar:
//   K_i = 2/3 * K_{i-1} + 1/3 * RSV_i
//   D_i = 2/3 * D_{i-1} + 1/3 * K_i
//   J   = 3K - 2D
//
// Only the final K, D and J are exposed.

use serde::{Deserialize, Serialize};

use crate::stats::{rolling_max, rolling_min};
use crate::types::PriceBar;

/// Seed value of both K and D.
const SEED: f64 = 50.0;

/// RSV used when the window has no range.
const FLAT_RSV: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kdj {
    pub k: f64,
    pub d: f64,
    pub j: f64,
}

/// RSV for every bar, oldest first.
pub fn rsv_series(bars: &[PriceBar], kdj_period: usize) -> Vec<f64> {
    if kdj_period == 0 {
        return vec![0.0; bars.len()];
    }
    let highs: Vec<f64> = bars.iter().map(PriceBar::high).collect();
    let lows: Vec<f64> = bars.iter().map(PriceBar::low).collect();
    let period_highs = rolling_max(&highs, kdj_period);
    let period_lows = rolling_min(&lows, kdj_period);

    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let Some(k) = (i + 1).checked_sub(kdj_period) else {
                return 0.0;
            };
            let (high, low) = (period_highs[k], period_lows[k]);
            let range = high - low;
            if range == 0.0 {
                FLAT_RSV
            } else {
                (bar.close() - low) / range * 100.0
            }
        })
        .collect()
}

/// Final K, D, J over `bars`. `None` for an empty slice.
pub fn calculate_kdj(bars: &[PriceBar], kdj_period: usize) -> Option<Kdj> {
    if bars.is_empty() {
        return None;
    }
    let rsv = rsv_series(bars, kdj_period);

    let (k, d) = rsv.iter().skip(1).fold((SEED, SEED), |(k, d), &value| {
        let k = 2.0 / 3.0 * k + value / 3.0;
        let d = 2.0 / 3.0 * d + k / 3.0;
        (k, d)
    });

    Some(Kdj { k, d, j: 3.0 * k - 2.0 * d })
}
