// =============================================================================
// Spectral Analysis Module
// =============================================================================
//
// Frequency-domain decomposition of a price window:
// - Radix-2 FFT over a Hann-windowed series
// - Dominant bins, harmonic ratios, phase consistency, seasonal strength
// - Harmonic projection of future offsets from the dominant components
// - Regime shift detection between successive decompositions

pub mod engine;
pub mod fft;
pub mod projection;
pub mod regime;
pub mod result;

pub use engine::SpectralEngine;
pub use projection::{cycle_phase, predict_offsets, project_horizons};
pub use regime::{detect_regime_change, RegimeShift};
pub use result::{FrequencyComponent, SpectralResult};
