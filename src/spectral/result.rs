use serde::{Deserialize, Serialize};

/// One frequency bin of the decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyComponent {
    pub frequency: f64,
    pub amplitude: f64,
    pub phase: f64,
}

/// Immutable output of [`SpectralEngine::analyze`](super::SpectralEngine::analyze).
///
/// `frequencies`, `amplitudes`, `phases` and `components` all have one entry
/// per retained bin (`window_size / 2`), bin 0 being DC. The extended fields
/// are always populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralResult {
    pub frequencies: Vec<f64>,
    pub amplitudes: Vec<f64>,
    pub phases: Vec<f64>,

    /// Frequencies of bins whose amplitude strictly exceeds the threshold.
    pub dominant_frequencies: Vec<f64>,

    /// Bin indices of `dominant_frequencies`, same order.
    pub dominant_bins: Vec<usize>,

    /// Near-integer ratios `f_j / f_i` between dominant frequencies.
    pub harmonic_relations: Vec<f64>,

    /// 1 = phase advances uniformly across bins, 0 = incoherent.
    pub phase_consistency: f64,

    /// Share of amplitude above the seasonal cutoff frequency.
    pub seasonal_strength: f64,

    pub components: Vec<FrequencyComponent>,

    /// Period (1 / f) of every non-DC dominant frequency, in time units.
    pub dominant_cycles: Vec<f64>,

    /// Share of amplitude at or below the seasonal cutoff frequency.
    pub trend_strength: f64,

    /// Share of amplitude outside the dominant bins.
    pub noise_level: f64,
}

impl SpectralResult {
    /// Phases of the dominant bins, aligned 1:1 with `dominant_frequencies`.
    pub fn dominant_phases(&self) -> Vec<f64> {
        self.dominant_bins.iter().map(|&bin| self.phases[bin]).collect()
    }

    /// Component with the largest amplitude (the later one on ties).
    pub fn strongest_component(&self) -> Option<FrequencyComponent> {
        self.components
            .iter()
            .copied()
            .max_by(|a, b| a.amplitude.total_cmp(&b.amplitude))
    }

    /// Dominant frequency with the largest amplitude.
    pub fn strongest_dominant_frequency(&self) -> Option<f64> {
        self.dominant_bins
            .iter()
            .copied()
            .max_by(|&a, &b| self.amplitudes[a].total_cmp(&self.amplitudes[b]))
            .map(|bin| self.frequencies[bin])
    }

    /// True when the transform saw no energy at all.
    pub fn is_degenerate(&self) -> bool {
        self.dominant_frequencies.is_empty()
    }

    /// Frequency spacing between adjacent bins.
    pub fn bin_width(&self) -> Option<f64> {
        match self.frequencies.as_slice() {
            [first, second, ..] => Some(second - first),
            _ => None,
        }
    }
}
