// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free indicator functions plus the `IndicatorEngine` that
// assembles them into one `IndicatorResult`. Every public function returns
// `Option<T>` so callers handle insufficient data explicitly.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod engine;
pub mod kdj;
pub mod macd;
pub mod rsi;

pub use engine::{IndicatorEngine, IndicatorResult};
pub use kdj::Kdj;
