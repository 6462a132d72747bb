//! Spectral decomposition and technical indicators for price time series.
//!
//! Two stateless engines sit at the core:
//! - [`SpectralEngine`] windows, transforms and scores a price series and can
//!   project the dominant cycles forward.
//! - [`IndicatorEngine`] computes a fixed basket of technical indicators over
//!   a slice of [`PriceBar`]s.
//!
//! Both are immutable after construction and safe to share behind `Arc`.

pub mod error;
pub mod export;
pub mod indicators;
pub mod runtime_config;
pub mod spectral;
pub mod stats;
pub mod types;

pub use error::EngineError;
pub use indicators::{IndicatorEngine, IndicatorResult, Kdj};
pub use runtime_config::{EngineConfig, IndicatorConfig, SpectralConfig};
pub use spectral::{
    cycle_phase, detect_regime_change, predict_offsets, project_horizons, FrequencyComponent,
    RegimeShift, SpectralEngine, SpectralResult,
};
pub use types::{BarRange, PriceBar, TimeSeriesSample};
