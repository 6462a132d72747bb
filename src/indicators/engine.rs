// =============================================================================
// Indicator Engine: fixed technical indicator basket
// =============================================================================
//
// Computes SMA, EMA, RSI, MACD, Bollinger Bands, Volume SMA, ATR and KDJ over
// the whole bar slice the caller supplies. The basket is all-or-nothing:
// fewer than `period` bars yields `None`, never a partially filled record.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::atr::calculate_atr;
use super::bollinger::calculate_bollinger;
use super::ema::scalar_ema;
use super::kdj::{calculate_kdj, Kdj};
use super::macd::calculate_macd;
use super::rsi::trailing_rsi;
use crate::error::EngineError;
use crate::runtime_config::IndicatorConfig;
use crate::stats::mean;
use crate::types::PriceBar;

/// Final values of the indicator basket for one bar slice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorResult {
    pub sma: f64,
    pub ema: f64,
    pub rsi: f64,
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
    pub upper_band: f64,
    pub middle_band: f64,
    pub lower_band: f64,
    pub volume_sma: f64,
    pub atr: f64,
    pub kdj: Kdj,
    /// Bars whose high/low/close were (partly) substituted by `price`.
    pub degraded_bars: usize,
}

/// Stateless indicator calculator holding only its validated periods.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    config: IndicatorConfig,
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self {
            config: IndicatorConfig::default(),
        }
    }
}

impl IndicatorEngine {
    /// Build an engine, rejecting zero periods.
    pub fn new(config: IndicatorConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    pub fn period(&self) -> usize {
        self.config.period
    }

    /// Compute the full basket.
    ///
    /// Returns `None` iff `bars.len() < period`; with at least `period` bars
    /// a result is always produced.
    pub fn compute(&self, bars: &[PriceBar]) -> Option<IndicatorResult> {
        let cfg = &self.config;
        if bars.len() < cfg.period {
            debug!(
                available = bars.len(),
                period = cfg.period,
                "Indicators: insufficient bars"
            );
            return None;
        }

        let prices: Vec<f64> = bars.iter().map(|b| b.price).collect();
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();

        let sma = mean(&prices)?;
        let ema = scalar_ema(&prices, cfg.period)?;
        let rsi = trailing_rsi(&prices, cfg.period)?;
        let macd = calculate_macd(&prices, cfg.macd_fast, cfg.macd_slow, cfg.macd_signal)?;
        let bands = calculate_bollinger(&prices, cfg.bollinger_width)?;
        let volume_sma = mean(&volumes)?;
        let atr = calculate_atr(bars, cfg.period)?;
        let kdj = calculate_kdj(bars, cfg.kdj_period)?;

        let degraded_bars = bars.iter().filter(|b| b.degraded).count();
        if degraded_bars > 0 {
            debug!(
                degraded_bars,
                total = bars.len(),
                "Indicators: high/low/close fell back to price"
            );
        }

        trace!(
            bars = bars.len(),
            sma = format!("{:.4}", sma),
            rsi = format!("{:.2}", rsi),
            atr = format!("{:.4}", atr),
            "Indicator basket computed"
        );

        Some(IndicatorResult {
            sma,
            ema,
            rsi,
            macd: macd.macd,
            signal: macd.signal,
            histogram: macd.histogram,
            upper_band: bands.upper,
            middle_band: bands.middle,
            lower_band: bands.lower,
            volume_sma,
            atr,
            kdj,
            degraded_bars,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn engine(period: usize) -> IndicatorEngine {
        IndicatorEngine::new(IndicatorConfig::with_period(period)).unwrap()
    }

    /// The five-bar BTC fixture used across the indicator tests.
    fn five_bars() -> Vec<PriceBar> {
        [
            (50_000.0, 51_000.0, 49_000.0),
            (51_000.0, 52_000.0, 50_000.0),
            (49_000.0, 51_000.0, 48_000.0),
            (50_000.0, 51_000.0, 49_000.0),
            (51_000.0, 52_000.0, 50_000.0),
        ]
        .iter()
        .enumerate()
        .map(|(i, &(p, h, l))| PriceBar::full(i as i64, p, 10.0 + i as f64, h, l, p))
        .collect()
    }

    #[test]
    fn five_bar_scenario() {
        let r = engine(3).compute(&five_bars()).unwrap();
        assert_eq!(r.sma, 50_200.0);
        assert_eq!(r.middle_band, r.sma);
        assert!(r.upper_band > r.middle_band && r.middle_band > r.lower_band);
        assert!(r.atr > 0.0);
        assert!(r.kdj.k >= 0.0);
        assert!(r.kdj.d >= 0.0);
        assert!(r.kdj.j.is_finite());
        assert_eq!(r.volume_sma, 12.0);
        assert_eq!(r.degraded_bars, 0);
    }

    #[test]
    fn five_bar_atr_by_hand() {
        // TR = [2000, 2000, 3000, 2000, 2000]; last 3 => 7000 / 3
        let r = engine(3).compute(&five_bars()).unwrap();
        assert!((r.atr - 7000.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn five_bar_rsi_by_hand() {
        // Changes: +1000, -2000, +1000, +1000 ; last 3 => gains 2000, losses 2000
        let r = engine(3).compute(&five_bars()).unwrap();
        assert!((r.rsi - 50.0).abs() < 1e-9);
    }

    #[test]
    fn empty_input_is_absent() {
        assert!(engine(3).compute(&[]).is_none());
    }

    #[test]
    fn absent_below_period_present_at_period() {
        let bars = five_bars();
        let e = engine(5);
        assert!(e.compute(&bars[..4]).is_none());
        assert!(e.compute(&bars).is_some());
    }

    #[test]
    fn price_only_bars_do_not_fail() {
        let bars = vec![
            PriceBar::price_only(0, 50_000.0, 1.0),
            PriceBar::from_parts(1, 51_000.0, 1.0, Some(52_000.0), None, None),
            PriceBar::from_parts(2, 49_000.0, 1.0, None, Some(48_000.0), None),
            PriceBar::from_parts(3, 50_000.0, 1.0, None, None, Some(50_000.0)),
            PriceBar::price_only(4, 51_000.0, 1.0),
        ];
        let r = engine(3).compute(&bars).unwrap();
        assert_eq!(r.sma, 50_200.0);
        assert_eq!(r.degraded_bars, 5);
        assert!(r.atr.is_finite());
        assert!(r.kdj.k.is_finite() && r.kdj.d.is_finite() && r.kdj.j.is_finite());
    }

    #[test]
    fn flat_series_saturates_rsi_and_collapses_bands() {
        let bars: Vec<PriceBar> = (0..20).map(|i| PriceBar::price_only(i, 100.0, 5.0)).collect();
        let r = engine(14).compute(&bars).unwrap();
        assert_eq!(r.rsi, 100.0);
        assert_eq!(r.upper_band, r.lower_band);
        assert_eq!(r.macd, 0.0);
        assert_eq!(r.atr, 0.0);
    }

    #[test]
    fn new_rejects_zero_period() {
        assert!(IndicatorEngine::new(IndicatorConfig::with_period(0)).is_err());
    }
}

#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    fn bars_strategy() -> impl Strategy<Value = Vec<PriceBar>> {
        proptest::collection::vec((1.0f64..1000.0, 0.0f64..50.0, 0.0f64..50.0, 0.0f64..100.0), 0..60)
            .prop_map(|rows| {
                rows.into_iter()
                    .enumerate()
                    .map(|(i, (price, up, down, volume))| {
                        PriceBar::full(i as i64, price, volume, price + up, price - down, price)
                    })
                    .collect()
            })
    }

    proptest! {
        #[test]
        fn absent_iff_shorter_than_period(bars in bars_strategy(), period in 1usize..30) {
            let e = IndicatorEngine::new(IndicatorConfig::with_period(period)).unwrap();
            prop_assert_eq!(e.compute(&bars).is_none(), bars.len() < period);
        }

        #[test]
        fn basket_invariants(bars in bars_strategy(), period in 1usize..20) {
            let e = IndicatorEngine::new(IndicatorConfig::with_period(period)).unwrap();
            if let Some(r) = e.compute(&bars) {
                prop_assert!((0.0..=100.0).contains(&r.rsi), "rsi={}", r.rsi);
                prop_assert!(r.upper_band >= r.middle_band && r.middle_band >= r.lower_band);
                prop_assert!(r.atr >= 0.0);
                prop_assert!(r.kdj.k.is_finite() && r.kdj.d.is_finite() && r.kdj.j.is_finite());
                prop_assert!(r.kdj.k >= 0.0 && r.kdj.d >= 0.0);
            }
        }
    }
}
