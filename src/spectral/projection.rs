// =============================================================================
// Harmonic Projection
// =============================================================================
//
// Deterministic extrapolation of the dominant spectral components:
//
//   offset(t) = Σ_j cos(2π · f_j · (t_last + t) + φ_j),   t = 1..=horizon
//
// The output is a unitless offset shape, not a price forecast: it carries no
// amplitude scaling and no confidence interval.

use std::f64::consts::{PI, TAU};

use tracing::trace;

use super::result::SpectralResult;
use crate::error::EngineError;

/// Project `horizon` future offsets after `last_timestamp`.
///
/// `phases[j]` must belong to `dominant_frequencies[j]`; use
/// [`SpectralResult::dominant_phases`] to obtain an aligned vector.
///
/// # Errors
/// `ProjectionLengthMismatch` when the two slices differ in length.
pub fn predict_offsets(
    last_timestamp: i64,
    dominant_frequencies: &[f64],
    phases: &[f64],
    horizon: usize,
) -> Result<Vec<f64>, EngineError> {
    if dominant_frequencies.len() != phases.len() {
        return Err(EngineError::ProjectionLengthMismatch {
            frequencies: dominant_frequencies.len(),
            phases: phases.len(),
        });
    }

    let offsets: Vec<f64> = (1..=horizon)
        .map(|step| {
            let time = last_timestamp as f64 + step as f64;
            dominant_frequencies
                .iter()
                .zip(phases.iter())
                .map(|(&f, &phase)| (2.0 * PI * f * time + phase).cos())
                .sum::<f64>()
        })
        .collect();

    Ok(offsets)
}

/// Offsets at selected horizons from an analysis result.
///
/// Computes `max(horizons)` steps after `current_time` and returns the
/// `(horizon, offset)` pair for every requested horizon. Horizon `0` has no
/// projected step and is skipped. Empty when the result has no dominant
/// frequencies.
pub fn project_horizons(
    result: &SpectralResult,
    current_time: i64,
    horizons: &[usize],
) -> Vec<(usize, f64)> {
    let Some(&max_horizon) = horizons.iter().max() else {
        return Vec::new();
    };
    if result.dominant_frequencies.is_empty() {
        return Vec::new();
    }

    let phases = result.dominant_phases();
    // Aligned by construction, so the length check cannot fail.
    let Ok(offsets) =
        predict_offsets(current_time, &result.dominant_frequencies, &phases, max_horizon)
    else {
        return Vec::new();
    };

    let picked: Vec<(usize, f64)> = horizons
        .iter()
        .filter(|&&h| h > 0)
        .map(|&h| (h, offsets[h - 1]))
        .collect();

    trace!(
        current_time,
        max_horizon,
        requested = horizons.len(),
        "Harmonic projection at horizons"
    );

    picked
}

/// Current position within the strongest cycle, in `[0, 2π)`.
///
/// Returns `0.0` when the result has no components.
pub fn cycle_phase(result: &SpectralResult, current_time: i64) -> f64 {
    match result.strongest_component() {
        Some(c) => (2.0 * PI * c.frequency * current_time as f64 + c.phase).rem_euclid(TAU),
        None => 0.0,
    }
}
