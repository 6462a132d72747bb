// =============================================================================
// Shared Numeric Helpers
// =============================================================================
//
// Windowing, moments and rolling extremes used by both engines. Every helper
// is total: empty input yields `None` (or an empty vec) instead of NaN.

use std::f64::consts::PI;

/// Apply a Hann window over the full length of `values`:
///   w[i] = x[i] * 0.5 * (1 - cos(2π·i / (N - 1)))
///
/// A single value is returned untouched (the window degenerates to 1).
pub fn hann_window(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n < 2 {
        return values.to_vec();
    }
    let denom = (n - 1) as f64;
    values
        .iter()
        .enumerate()
        .map(|(i, &x)| x * 0.5 * (1.0 - (2.0 * PI * i as f64 / denom).cos()))
        .collect()
}

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance around a precomputed `mean`.
pub fn population_variance(values: &[f64], mean: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / values.len() as f64)
}

/// The last `n` elements, or the whole slice when it is shorter.
pub fn tail(values: &[f64], n: usize) -> &[f64] {
    &values[values.len().saturating_sub(n)..]
}

pub fn highest(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().cloned().fold(f64::NEG_INFINITY, f64::max))
}

pub fn lowest(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().cloned().fold(f64::INFINITY, f64::min))
}

/// Maximum over each full trailing window.
///
/// Element `k` covers `values[k..k + window]`, so the output has
/// `len - window + 1` entries (empty when `window` is zero or too large).
pub fn rolling_max(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || values.len() < window {
        return Vec::new();
    }
    values
        .windows(window)
        .filter_map(highest)
        .collect()
}

/// Minimum over each full trailing window. Same layout as [`rolling_max`].
pub fn rolling_min(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || values.len() < window {
        return Vec::new();
    }
    values
        .windows(window)
        .filter_map(lowest)
        .collect()
}
