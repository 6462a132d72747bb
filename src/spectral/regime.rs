// =============================================================================
// Spectral Regime Change Detection
// =============================================================================
//
// Compares two successive spectral decompositions of the same instrument and
// flags a regime shift when the cycle structure moves materially:
//
//   Δdominant = |n_prev - n_curr| / max(n_prev, n_curr)   (0 when both empty)
//   Δphase    = |pc_prev - pc_curr|
//   Δseasonal = |ss_prev - ss_curr|
//
//   shifted = any delta > threshold   (default 0.2)

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::result::SpectralResult;

/// Default relative change that counts as a regime shift.
pub const DEFAULT_REGIME_THRESHOLD: f64 = 0.2;

/// Outcome of comparing two spectral results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeShift {
    pub shifted: bool,
    /// Relative change in the number of dominant frequencies.
    pub dominant_change: f64,
    pub phase_change: f64,
    pub seasonal_change: f64,
}

/// Compare `previous` and `current` against `threshold`.
pub fn detect_regime_change(
    previous: &SpectralResult,
    current: &SpectralResult,
    threshold: f64,
) -> RegimeShift {
    let prev_count = previous.dominant_frequencies.len();
    let curr_count = current.dominant_frequencies.len();
    let larger = prev_count.max(curr_count);
    let dominant_change = if larger == 0 {
        0.0
    } else {
        prev_count.abs_diff(curr_count) as f64 / larger as f64
    };

    let phase_change = (previous.phase_consistency - current.phase_consistency).abs();
    let seasonal_change = (previous.seasonal_strength - current.seasonal_strength).abs();

    let shifted =
        dominant_change > threshold || phase_change > threshold || seasonal_change > threshold;

    if shifted {
        debug!(
            dominant_change = format!("{:.3}", dominant_change),
            phase_change = format!("{:.3}", phase_change),
            seasonal_change = format!("{:.3}", seasonal_change),
            "Spectral regime shift detected"
        );
    }

    RegimeShift {
        shifted,
        dominant_change,
        phase_change,
        seasonal_change,
    }
}
