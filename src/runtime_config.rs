// =============================================================================
// Engine Configuration: spectral window, indicator periods, thresholds
// =============================================================================
//
// Every tunable of both engines lives here. All fields carry
// `#[serde(default)]` so a partial JSON file (or `{}`) loads with the stock
// values. Persistence uses an atomic tmp + rename write.
//
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::EngineError;
use crate::spectral::regime::DEFAULT_REGIME_THRESHOLD;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_window_size() -> usize {
    1024
}

fn default_sampling_rate() -> f64 {
    1.0
}

fn default_dominant_threshold() -> f64 {
    0.1
}

fn default_harmonic_tolerance() -> f64 {
    0.1
}

fn default_seasonal_cutoff() -> f64 {
    0.1
}

fn default_period() -> usize {
    14
}

fn default_macd_fast() -> usize {
    12
}

fn default_macd_slow() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

fn default_kdj_period() -> usize {
    9
}

fn default_bollinger_width() -> f64 {
    2.0
}

fn default_regime_change_threshold() -> f64 {
    DEFAULT_REGIME_THRESHOLD
}

// =============================================================================
// SpectralConfig
// =============================================================================

/// Parameters of the Fourier decomposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralConfig {
    /// Number of samples per analysis window. Power of two, at least 4.
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Samples per unit time; scales bin frequencies.
    #[serde(default = "default_sampling_rate")]
    pub sampling_rate: f64,

    /// Fraction of the peak amplitude a bin must exceed to be dominant.
    #[serde(default = "default_dominant_threshold")]
    pub dominant_threshold: f64,

    /// Maximum distance from an integer for a frequency ratio to count as a
    /// harmonic.
    #[serde(default = "default_harmonic_tolerance")]
    pub harmonic_tolerance: f64,

    /// Bins strictly above this frequency count as seasonal; the rest as trend.
    #[serde(default = "default_seasonal_cutoff")]
    pub seasonal_cutoff: f64,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            sampling_rate: default_sampling_rate(),
            dominant_threshold: default_dominant_threshold(),
            harmonic_tolerance: default_harmonic_tolerance(),
            seasonal_cutoff: default_seasonal_cutoff(),
        }
    }
}

impl SpectralConfig {
    /// Config with the given window and sampling rate, other fields default.
    pub fn with_window(window_size: usize, sampling_rate: f64) -> Self {
        Self {
            window_size,
            sampling_rate,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.window_size < 4 || !self.window_size.is_power_of_two() {
            return Err(EngineError::invalid_config(format!(
                "window_size must be a power of two >= 4, got {}",
                self.window_size
            )));
        }
        if !(self.sampling_rate.is_finite() && self.sampling_rate > 0.0) {
            return Err(EngineError::invalid_config(format!(
                "sampling_rate must be positive and finite, got {}",
                self.sampling_rate
            )));
        }
        if !(0.0..1.0).contains(&self.dominant_threshold) {
            return Err(EngineError::invalid_config(format!(
                "dominant_threshold must be in [0, 1), got {}",
                self.dominant_threshold
            )));
        }
        if !(self.harmonic_tolerance > 0.0 && self.harmonic_tolerance <= 0.5) {
            return Err(EngineError::invalid_config(format!(
                "harmonic_tolerance must be in (0, 0.5], got {}",
                self.harmonic_tolerance
            )));
        }
        if !(self.seasonal_cutoff.is_finite() && self.seasonal_cutoff >= 0.0) {
            return Err(EngineError::invalid_config(format!(
                "seasonal_cutoff must be non-negative, got {}",
                self.seasonal_cutoff
            )));
        }
        Ok(())
    }
}

// =============================================================================
// IndicatorConfig
// =============================================================================

/// Look-back periods of the indicator basket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    /// Minimum bar count, EMA smoothing period, RSI and ATR tail length.
    #[serde(default = "default_period")]
    pub period: usize,

    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,

    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,

    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,

    /// RSV look-back for KDJ.
    #[serde(default = "default_kdj_period")]
    pub kdj_period: usize,

    /// Bollinger band half-width in standard deviations.
    #[serde(default = "default_bollinger_width")]
    pub bollinger_width: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            period: default_period(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
            kdj_period: default_kdj_period(),
            bollinger_width: default_bollinger_width(),
        }
    }
}

impl IndicatorConfig {
    /// Config with the given period, other fields default.
    pub fn with_period(period: usize) -> Self {
        Self {
            period,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let periods = [
            ("period", self.period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("kdj_period", self.kdj_period),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, p)| *p == 0) {
            return Err(EngineError::invalid_config(format!("{name} must be at least 1")));
        }
        if !(self.bollinger_width.is_finite() && self.bollinger_width >= 0.0) {
            return Err(EngineError::invalid_config(format!(
                "bollinger_width must be non-negative, got {}",
                self.bollinger_width
            )));
        }
        Ok(())
    }
}

// =============================================================================
// EngineConfig
// =============================================================================

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub spectral: SpectralConfig,

    #[serde(default)]
    pub indicators: IndicatorConfig,

    /// Relative change in any spectral summary that flags a regime shift.
    #[serde(default = "default_regime_change_threshold")]
    pub regime_change_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            spectral: SpectralConfig::default(),
            indicators: IndicatorConfig::default(),
            regime_change_threshold: default_regime_change_threshold(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        self.spectral.validate()?;
        self.indicators.validate()?;
        if !(self.regime_change_threshold.is_finite() && self.regime_change_threshold >= 0.0) {
            return Err(EngineError::invalid_config(format!(
                "regime_change_threshold must be non-negative, got {}",
                self.regime_change_threshold
            )));
        }
        Ok(())
    }

    /// Load configuration from a JSON file at `path`.
    ///
    /// Missing files are an error so the caller can fall back to defaults
    /// with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse engine config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("invalid engine config in {}", path.display()))?;

        info!(
            path = %path.display(),
            window_size = config.spectral.window_size,
            period = config.indicators.period,
            "engine config loaded"
        );

        Ok(config)
    }

    /// Load from `explicit` when given, otherwise from `default_path`.
    ///
    /// Only a missing default file falls back to [`EngineConfig::default`].
    /// An explicit path must exist and hold a valid config.
    pub fn load_or_default(explicit: Option<&Path>, default_path: impl AsRef<Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let default_path = default_path.as_ref();
        if !default_path.exists() {
            warn!(path = %default_path.display(), "No engine config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(default_path)
    }

    /// Persist the configuration to `path` (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise engine config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "engine config saved (atomic)");
        Ok(())
    }
}
