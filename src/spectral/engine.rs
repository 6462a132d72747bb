// =============================================================================
// Spectral Engine: Fourier decomposition of a price window
// =============================================================================
//
// Pipeline for one window of N = window_size samples:
//   1. Hann-window the prices to suppress leakage at the window edges.
//   2. Radix-2 FFT; keep bins 0..N/2 (real input => conjugate symmetry).
//   3. Per bin: f = i·rate/N, amplitude = |X|, phase = arg(X).
//   4. Dominant bins: amplitude > peak · dominant_threshold (strict).
//   5. Harmonics: ratios f_j/f_i (i < j, f_i != 0) within tolerance of an
//      integer.
//   6. Phase consistency: 1 - mean(|Δphase| folded into [0, π]) / π.
//   7. Seasonal strength: amplitude share above the seasonal cutoff.
//
// A zero-energy window (all prices zero, or an empty slice) produces a
// well-formed result with no dominant bins and every score at 0.

use std::f64::consts::PI;

use tracing::{debug, trace};

use super::fft::real_fft;
use super::projection;
use super::result::{FrequencyComponent, SpectralResult};
use crate::error::EngineError;
use crate::runtime_config::SpectralConfig;
use crate::stats::{hann_window, highest};
use crate::types::TimeSeriesSample;

/// Stateless analyzer holding only its validated configuration.
#[derive(Debug, Clone)]
pub struct SpectralEngine {
    config: SpectralConfig,
}

impl Default for SpectralEngine {
    fn default() -> Self {
        Self {
            config: SpectralConfig::default(),
        }
    }
}

impl SpectralEngine {
    /// Build an engine, rejecting invalid window sizes or sampling rates.
    pub fn new(config: SpectralConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SpectralConfig {
        &self.config
    }

    pub fn window_size(&self) -> usize {
        self.config.window_size
    }

    /// Bin centre frequencies `i · rate / N` for `i in 0..N/2`.
    pub fn bin_frequencies(&self) -> Vec<f64> {
        let n = self.config.window_size;
        (0..n / 2)
            .map(|i| i as f64 * self.config.sampling_rate / n as f64)
            .collect()
    }

    /// Decompose exactly one window of samples.
    ///
    /// # Errors
    /// `WindowLengthMismatch` when `samples.len() != window_size`. An empty
    /// slice is accepted and yields the zero-energy result.
    pub fn analyze(&self, samples: &[TimeSeriesSample]) -> Result<SpectralResult, EngineError> {
        let prices: Vec<f64> = samples.iter().map(|s| s.price).collect();
        self.analyze_prices(&prices)
    }

    /// Decompose the trailing `window_size` samples of a longer series.
    pub fn analyze_trailing(
        &self,
        samples: &[TimeSeriesSample],
    ) -> Result<SpectralResult, EngineError> {
        let n = self.config.window_size;
        if samples.len() < n {
            return Err(EngineError::WindowLengthMismatch {
                expected: n,
                actual: samples.len(),
            });
        }
        self.analyze(&samples[samples.len() - n..])
    }

    /// Same as [`analyze`](Self::analyze) on a bare price slice.
    pub fn analyze_prices(&self, prices: &[f64]) -> Result<SpectralResult, EngineError> {
        let n = self.config.window_size;

        let zeros;
        let prices = if prices.is_empty() {
            debug!(window_size = n, "Spectral: empty input, analysing a zero window");
            zeros = vec![0.0; n];
            &zeros[..]
        } else if prices.len() != n {
            return Err(EngineError::WindowLengthMismatch {
                expected: n,
                actual: prices.len(),
            });
        } else {
            prices
        };

        // --- Steps 1-3: window, transform, per-bin amplitude and phase -------
        let spectrum = real_fft(&hann_window(prices));
        let frequencies = self.bin_frequencies();
        let (amplitudes, phases): (Vec<f64>, Vec<f64>) = spectrum[..n / 2]
            .iter()
            .map(|c| (c.norm(), c.arg()))
            .unzip();

        // --- Step 4: dominant bins -------------------------------------------
        let dominant_bins = dominant_bins(&amplitudes, self.config.dominant_threshold);
        let dominant_frequencies: Vec<f64> =
            dominant_bins.iter().map(|&i| frequencies[i]).collect();

        // --- Steps 5-7: summaries --------------------------------------------
        let harmonic_relations =
            harmonic_relations(&dominant_frequencies, self.config.harmonic_tolerance);

        let total_amplitude: f64 = amplitudes.iter().sum();
        let zero_energy = total_amplitude == 0.0;

        let phase_consistency = if zero_energy {
            0.0
        } else {
            phase_consistency(&phases).unwrap_or(0.0)
        };

        let seasonal_strength =
            seasonal_strength(&amplitudes, &frequencies, self.config.seasonal_cutoff);

        // --- Extended fields --------------------------------------------------
        let components = frequencies
            .iter()
            .zip(amplitudes.iter())
            .zip(phases.iter())
            .map(|((&frequency, &amplitude), &phase)| FrequencyComponent {
                frequency,
                amplitude,
                phase,
            })
            .collect();

        let dominant_cycles = dominant_frequencies
            .iter()
            .filter(|&&f| f > 0.0)
            .map(|f| 1.0 / f)
            .collect();

        let trend_strength = if zero_energy { 0.0 } else { 1.0 - seasonal_strength };
        let noise_level = noise_level(&amplitudes, &dominant_bins);

        trace!(
            window_size = n,
            dominant = dominant_bins.len(),
            harmonics = harmonic_relations.len(),
            phase_consistency = format!("{:.4}", phase_consistency),
            seasonal_strength = format!("{:.4}", seasonal_strength),
            "Spectral analysis complete"
        );

        Ok(SpectralResult {
            frequencies,
            amplitudes,
            phases,
            dominant_frequencies,
            dominant_bins,
            harmonic_relations,
            phase_consistency,
            seasonal_strength,
            components,
            dominant_cycles,
            trend_strength,
            noise_level,
        })
    }

    /// Harmonic projection of the next `horizon` offsets after
    /// `last_timestamp`. See [`projection::predict_offsets`].
    pub fn predict_offsets(
        &self,
        last_timestamp: i64,
        dominant_frequencies: &[f64],
        phases: &[f64],
        horizon: usize,
    ) -> Result<Vec<f64>, EngineError> {
        projection::predict_offsets(last_timestamp, dominant_frequencies, phases, horizon)
    }
}

// =============================================================================
// Spectrum summaries
// =============================================================================

/// Indices of bins whose amplitude strictly exceeds `peak * threshold`.
///
/// An all-zero spectrum has threshold 0 and therefore no dominant bins.
pub fn dominant_bins(amplitudes: &[f64], threshold: f64) -> Vec<usize> {
    let Some(peak) = highest(amplitudes) else {
        return Vec::new();
    };
    let cut = peak * threshold;
    amplitudes
        .iter()
        .enumerate()
        .filter(|(_, &a)| a > cut)
        .map(|(i, _)| i)
        .collect()
}

/// Ratios `f_j / f_i` for `i < j` that lie within `tolerance` of an integer.
///
/// Pairs with `f_i == 0` (the DC bin) are skipped.
pub fn harmonic_relations(frequencies: &[f64], tolerance: f64) -> Vec<f64> {
    let mut relations = Vec::new();
    for (i, &base) in frequencies.iter().enumerate() {
        if base == 0.0 {
            continue;
        }
        for &other in &frequencies[i + 1..] {
            let ratio = other / base;
            if ratio.is_finite() && (ratio - ratio.round()).abs() < tolerance {
                relations.push(ratio);
            }
        }
    }
    relations
}

/// `1 - mean(|Δphase|) / π` over successive bins, each difference folded
/// into `[0, π]`.
///
/// `None` with fewer than two phases (no difference to average).
pub fn phase_consistency(phases: &[f64]) -> Option<f64> {
    if phases.len() < 2 {
        return None;
    }
    let diffs: Vec<f64> = phases
        .windows(2)
        .map(|w| {
            let diff = (w[1] - w[0]).abs();
            if diff > PI {
                2.0 * PI - diff
            } else {
                diff
            }
        })
        .collect();
    let mean_diff = diffs.iter().sum::<f64>() / diffs.len() as f64;
    Some(1.0 - mean_diff / PI)
}

/// Amplitude share of bins with `frequency > cutoff`; `0` when the spectrum
/// carries no energy.
pub fn seasonal_strength(amplitudes: &[f64], frequencies: &[f64], cutoff: f64) -> f64 {
    let total: f64 = amplitudes.iter().sum();
    if total == 0.0 {
        return 0.0;
    }
    let seasonal: f64 = amplitudes
        .iter()
        .zip(frequencies.iter())
        .filter(|(_, &f)| f > cutoff)
        .map(|(a, _)| a)
        .sum();
    seasonal / total
}

/// Amplitude share outside the dominant bins; `0` on zero energy.
fn noise_level(amplitudes: &[f64], dominant_bins: &[usize]) -> f64 {
    let total: f64 = amplitudes.iter().sum();
    if total == 0.0 {
        return 0.0;
    }
    let dominant: f64 = dominant_bins.iter().map(|&i| amplitudes[i]).sum();
    ((total - dominant) / total).clamp(0.0, 1.0)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn sine_window(n: usize, freqs: &[f64]) -> Vec<TimeSeriesSample> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                let price = freqs.iter().map(|f| (2.0 * PI * f * t).sin()).sum();
                TimeSeriesSample::new(i as i64, price)
            })
            .collect()
    }

    fn engine(window: usize) -> SpectralEngine {
        SpectralEngine::new(SpectralConfig::with_window(window, 1.0)).unwrap()
    }

    // ---- analyze ---------------------------------------------------------

    #[test]
    fn output_lengths_are_half_window() {
        let result = engine(1024).analyze(&sine_window(1024, &[0.1])).unwrap();
        assert_eq!(result.frequencies.len(), 512);
        assert_eq!(result.amplitudes.len(), 512);
        assert_eq!(result.phases.len(), 512);
        assert_eq!(result.components.len(), 512);
    }

    #[test]
    fn bin_frequencies_scale_with_sampling_rate() {
        let e = SpectralEngine::new(SpectralConfig::with_window(8, 4.0)).unwrap();
        assert_eq!(e.bin_frequencies(), vec![0.0, 0.5, 1.0, 1.5]);
    }

    #[test]
    fn sine_peak_within_one_bin() {
        let result = engine(1024).analyze(&sine_window(1024, &[0.1])).unwrap();
        let peak = result.strongest_dominant_frequency().unwrap();
        assert!((peak - 0.1).abs() <= result.bin_width().unwrap(), "peak at {peak}");
        let strongest = result.strongest_component().unwrap();
        assert_eq!(strongest.frequency, peak);
    }

    #[test]
    fn scores_in_unit_interval_for_sine() {
        let result = engine(1024).analyze(&sine_window(1024, &[0.1])).unwrap();
        assert!(result.phase_consistency > 0.0 && result.phase_consistency <= 1.0);
        assert!(result.seasonal_strength > 0.0 && result.seasonal_strength <= 1.0);
        assert!((0.0..=1.0).contains(&result.noise_level));
        assert!((result.trend_strength + result.seasonal_strength - 1.0).abs() < 1e-12);
    }

    #[test]
    fn two_tones_produce_octave_relation() {
        let result = engine(1024).analyze(&sine_window(1024, &[0.1, 0.2])).unwrap();
        assert!(!result.harmonic_relations.is_empty());
        assert!(result.harmonic_relations.iter().all(|&r| r > 0.0));
        assert!(result
            .harmonic_relations
            .iter()
            .any(|&r| (r - 2.0).abs() < 0.1));
    }

    #[test]
    fn all_zero_input_is_degenerate() {
        let samples: Vec<TimeSeriesSample> =
            (0..64).map(|i| TimeSeriesSample::new(i, 0.0)).collect();
        let result = engine(64).analyze(&samples).unwrap();
        assert!(result.is_degenerate());
        assert!(result.dominant_frequencies.is_empty());
        assert!(result.harmonic_relations.is_empty());
        assert!(result.dominant_cycles.is_empty());
        assert_eq!(result.phase_consistency, 0.0);
        assert_eq!(result.seasonal_strength, 0.0);
        assert_eq!(result.trend_strength, 0.0);
        assert_eq!(result.noise_level, 0.0);
    }

    #[test]
    fn empty_input_matches_zero_window() {
        let e = engine(16);
        let empty = e.analyze(&[]).unwrap();
        let zeros = e.analyze_prices(&[0.0; 16]).unwrap();
        assert_eq!(empty, zeros);
        assert_eq!(empty.frequencies.len(), 8);
    }

    #[test]
    fn wrong_length_is_rejected() {
        let err = engine(64).analyze(&sine_window(63, &[0.1])).unwrap_err();
        assert_eq!(
            err,
            EngineError::WindowLengthMismatch {
                expected: 64,
                actual: 63
            }
        );
    }

    #[test]
    fn trailing_window_uses_latest_samples() {
        let e = engine(64);
        let long = sine_window(100, &[0.125]);
        let trailing = e.analyze_trailing(&long).unwrap();
        let direct = e.analyze(&long[36..]).unwrap();
        assert_eq!(trailing, direct);
        assert!(e.analyze_trailing(&long[..10]).is_err());
    }

    #[test]
    fn dominant_cycles_are_reciprocal_periods() {
        let result = engine(256).analyze(&sine_window(256, &[0.125])).unwrap();
        let nonzero: Vec<f64> = result
            .dominant_frequencies
            .iter()
            .copied()
            .filter(|&f| f > 0.0)
            .collect();
        assert_eq!(nonzero.len(), result.dominant_cycles.len());
        for (f, cycle) in nonzero.iter().zip(result.dominant_cycles.iter()) {
            assert!((f * cycle - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn dominant_phases_align_with_frequencies() {
        let result = engine(128).analyze(&sine_window(128, &[0.25])).unwrap();
        let phases = result.dominant_phases();
        assert_eq!(phases.len(), result.dominant_frequencies.len());
        for (&bin, &phase) in result.dominant_bins.iter().zip(phases.iter()) {
            assert_eq!(phase, result.phases[bin]);
        }
    }

    #[test]
    fn new_rejects_invalid_window() {
        assert!(SpectralEngine::new(SpectralConfig::with_window(100, 1.0)).is_err());
    }

    // ---- summaries -------------------------------------------------------

    #[test]
    fn dominant_threshold_is_strict() {
        // Peak 10 => cut 1.0; a bin at exactly 1.0 is excluded.
        let bins = dominant_bins(&[10.0, 1.0, 1.5, 0.5], 0.1);
        assert_eq!(bins, vec![0, 2]);
    }

    #[test]
    fn dominant_bins_empty_spectrum() {
        assert!(dominant_bins(&[], 0.1).is_empty());
        assert!(dominant_bins(&[0.0, 0.0], 0.1).is_empty());
    }

    #[test]
    fn harmonic_relations_skip_dc() {
        let rel = harmonic_relations(&[0.0, 0.1, 0.2, 0.305], 0.1);
        assert_eq!(rel.len(), 2);
        assert!((rel[0] - 2.0).abs() < 1e-12);
        assert!((rel[1] - 3.05).abs() < 1e-12);
        assert!(rel.iter().all(|&r| r > 0.0));
    }

    #[test]
    fn harmonic_relations_reject_far_ratios() {
        assert!(harmonic_relations(&[0.1, 0.25], 0.1).is_empty());
    }

    #[test]
    fn phase_consistency_locked_phases() {
        assert_eq!(phase_consistency(&[0.3; 10]), Some(1.0));
    }

    #[test]
    fn phase_consistency_alternating_opposites() {
        // Differences of exactly π => consistency 0.
        let phases: Vec<f64> = (0..10).map(|i| if i % 2 == 0 { 0.0 } else { PI }).collect();
        assert!(phase_consistency(&phases).unwrap().abs() < 1e-12);
    }

    #[test]
    fn phase_consistency_wraps_large_jumps() {
        // |−3 − 3| = 6 > π => folded to 2π − 6.
        let c = phase_consistency(&[3.0, -3.0]).unwrap();
        assert!((c - (1.0 - (2.0 * PI - 6.0) / PI)).abs() < 1e-12);
    }

    #[test]
    fn phase_consistency_single_bin_undefined() {
        assert!(phase_consistency(&[1.0]).is_none());
        assert!(phase_consistency(&[]).is_none());
    }

    #[test]
    fn seasonal_strength_split() {
        let s = seasonal_strength(&[1.0, 1.0, 2.0], &[0.0, 0.1, 0.2], 0.1);
        assert!((s - 0.5).abs() < 1e-12);
        assert_eq!(seasonal_strength(&[0.0, 0.0], &[0.0, 0.5], 0.1), 0.0);
    }
}

#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn pure_sinusoid_peak_within_one_bin(f0 in 0.02f64..0.45) {
            let n = 512;
            let samples: Vec<TimeSeriesSample> = (0..n)
                .map(|i| TimeSeriesSample::new(i as i64, (2.0 * PI * f0 * i as f64).sin()))
                .collect();
            let e = SpectralEngine::new(SpectralConfig::with_window(n, 1.0)).unwrap();
            let result = e.analyze(&samples).unwrap();
            let peak = result.strongest_dominant_frequency().unwrap();
            prop_assert!((peak - f0).abs() <= result.bin_width().unwrap(),
                "f0={} peak={}", f0, peak);
        }

        #[test]
        fn scores_bounded(values in proptest::collection::vec(-1000.0f64..1000.0, 256)) {
            let e = SpectralEngine::new(SpectralConfig::with_window(256, 1.0)).unwrap();
            let result = e.analyze_prices(&values).unwrap();
            prop_assert!((0.0..=1.0).contains(&result.phase_consistency),
                "phase_consistency={}", result.phase_consistency);
            prop_assert!((0.0..=1.0).contains(&result.seasonal_strength),
                "seasonal_strength={}", result.seasonal_strength);
            prop_assert!((0.0..=1.0).contains(&result.noise_level));
            prop_assert!(result.harmonic_relations.iter().all(|&r| r > 0.0));
        }
    }
}
