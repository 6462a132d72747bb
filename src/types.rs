// =============================================================================
// Shared input types consumed by the spectral and indicator engines
// =============================================================================

use serde::{Deserialize, Serialize};

/// One point of a price time series.
///
/// Samples are expected in ascending timestamp order. The engines never
/// resample, so gaps and duplicates are the caller's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesSample {
    /// Seconds or milliseconds; the unit only has to be consistent per call.
    pub timestamp: i64,
    pub price: f64,
}

impl TimeSeriesSample {
    pub fn new(timestamp: i64, price: f64) -> Self {
        Self { timestamp, price }
    }
}

/// High/low/close information attached to a bar.
///
/// `PriceOnly` bars substitute the bar's `price` for all three values. This
/// keeps ATR and KDJ computable on tick-style data but flattens the true
/// range, so the engine counts such bars in `IndicatorResult::degraded_bars`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BarRange {
    Full { high: f64, low: f64, close: f64 },
    PriceOnly,
}

impl BarRange {
    pub fn is_price_only(&self) -> bool {
        matches!(self, Self::PriceOnly)
    }
}

/// Indicator input bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPriceBar", into = "RawPriceBar")]
pub struct PriceBar {
    pub timestamp: i64,
    pub price: f64,
    pub volume: f64,
    pub range: BarRange,
    /// True when at least one of high/low/close was missing on input and was
    /// filled from `price`.
    pub degraded: bool,
}

impl PriceBar {
    /// Bar with a full high/low/close range.
    pub fn full(timestamp: i64, price: f64, volume: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            price,
            volume,
            range: BarRange::Full { high, low, close },
            degraded: false,
        }
    }

    /// Bar that only carries a traded price.
    pub fn price_only(timestamp: i64, price: f64, volume: f64) -> Self {
        Self {
            timestamp,
            price,
            volume,
            range: BarRange::PriceOnly,
            degraded: true,
        }
    }

    /// Build a bar from optional range fields, filling gaps from `price`.
    ///
    /// - all three present => `Full`
    /// - none present      => `PriceOnly`
    /// - some present      => `Full` with the missing ones set to `price`,
    ///   flagged as degraded
    pub fn from_parts(
        timestamp: i64,
        price: f64,
        volume: f64,
        high: Option<f64>,
        low: Option<f64>,
        close: Option<f64>,
    ) -> Self {
        match (high, low, close) {
            (Some(high), Some(low), Some(close)) => {
                Self::full(timestamp, price, volume, high, low, close)
            }
            (None, None, None) => Self::price_only(timestamp, price, volume),
            (high, low, close) => Self {
                timestamp,
                price,
                volume,
                range: BarRange::Full {
                    high: high.unwrap_or(price),
                    low: low.unwrap_or(price),
                    close: close.unwrap_or(price),
                },
                degraded: true,
            },
        }
    }

    pub fn high(&self) -> f64 {
        match self.range {
            BarRange::Full { high, .. } => high,
            BarRange::PriceOnly => self.price,
        }
    }

    pub fn low(&self) -> f64 {
        match self.range {
            BarRange::Full { low, .. } => low,
            BarRange::PriceOnly => self.price,
        }
    }

    pub fn close(&self) -> f64 {
        match self.range {
            BarRange::Full { close, .. } => close,
            BarRange::PriceOnly => self.price,
        }
    }

    pub fn sample(&self) -> TimeSeriesSample {
        TimeSeriesSample::new(self.timestamp, self.price)
    }
}

/// Flat wire shape with optional range fields, as market-data suppliers send it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawPriceBar {
    timestamp: i64,
    price: f64,
    volume: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    close: Option<f64>,
}

impl From<RawPriceBar> for PriceBar {
    fn from(raw: RawPriceBar) -> Self {
        PriceBar::from_parts(raw.timestamp, raw.price, raw.volume, raw.high, raw.low, raw.close)
    }
}

impl From<PriceBar> for RawPriceBar {
    fn from(bar: PriceBar) -> Self {
        let (high, low, close) = match bar.range {
            BarRange::Full { high, low, close } => (Some(high), Some(low), Some(close)),
            BarRange::PriceOnly => (None, None, None),
        };
        Self {
            timestamp: bar.timestamp,
            price: bar.price,
            volume: bar.volume,
            high,
            low,
            close,
        }
    }
}
