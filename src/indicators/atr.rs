// =============================================================================
// Average True Range (ATR): trailing simple average
// =============================================================================
//
// True Range (TR) for each bar:
//   TR_0 = H - L                                   (no previous close)
//   TR_i = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR = sum of the last `period` TR values / period.
//
// `PriceOnly` bars contribute H = L = C = price, so their TR reduces to the
// gap from the previous close.
// =============================================================================

use crate::stats::tail;
use crate::types::PriceBar;

/// True range of every bar, oldest first.
pub fn true_ranges(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let hl = bar.high() - bar.low();
            match i.checked_sub(1).map(|p| bars[p].close()) {
                None => hl,
                Some(prev_close) => {
                    let hc = (bar.high() - prev_close).abs();
                    let lc = (bar.low() - prev_close).abs();
                    hl.max(hc).max(lc)
                }
            }
        })
        .collect()
}

/// ATR over the last `period` true ranges.
///
/// `None` when `period` is zero.
pub fn calculate_atr(bars: &[PriceBar], period: usize) -> Option<f64> {
    if period == 0 {
        return None;
    }
    let tr = true_ranges(bars);
    Some(tail(&tr, period).iter().sum::<f64>() / period as f64)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn bar(price: f64, high: f64, low: f64, close: f64) -> PriceBar {
        PriceBar::full(0, price, 100.0, high, low, close)
    }

    #[test]
    fn atr_period_zero() {
        let bars = vec![bar(100.0, 105.0, 95.0, 102.0); 20];
        assert!(calculate_atr(&bars, 0).is_none());
    }

    #[test]
    fn first_bar_uses_high_low() {
        let tr = true_ranges(&[bar(100.0, 105.0, 95.0, 100.0)]);
        assert_eq!(tr, vec![10.0]);
    }

    #[test]
    fn true_range_uses_prev_close() {
        // Gap scenario: |H - prevClose| = |115 - 95| = 20 > H - L = 7
        let bars = vec![
            bar(95.0, 105.0, 95.0, 95.0),
            bar(112.0, 115.0, 108.0, 112.0),
        ];
        assert_eq!(true_ranges(&bars), vec![10.0, 20.0]);
    }

    #[test]
    fn atr_constant_range() {
        let bars: Vec<PriceBar> = (0..30)
            .map(|i| {
                let base = 100.0 + i as f64 * 0.1;
                bar(base, base + 5.0, base - 5.0, base)
            })
            .collect();
        let atr = calculate_atr(&bars, 14).unwrap();
        assert!((atr - 10.0).abs() < 1e-9, "expected ATR 10.0, got {atr}");
    }

    #[test]
    fn atr_short_input_divides_by_period() {
        // Two bars, TR = [10, 10], period 4 => 20 / 4
        let bars = vec![bar(100.0, 105.0, 95.0, 100.0); 2];
        assert_eq!(calculate_atr(&bars, 4), Some(5.0));
    }

    #[test]
    fn price_only_bars_measure_gaps() {
        let bars = vec![
            PriceBar::price_only(0, 100.0, 1.0),
            PriceBar::price_only(1, 103.0, 1.0),
            PriceBar::price_only(2, 101.0, 1.0),
        ];
        assert_eq!(true_ranges(&bars), vec![0.0, 3.0, 2.0]);
        assert_eq!(calculate_atr(&bars, 2), Some(2.5));
    }

    #[test]
    fn atr_result_is_positive() {
        let bars: Vec<PriceBar> = (0..50)
            .map(|i| {
                let base = 100.0 + (i as f64 * 0.5).sin() * 10.0;
                bar(base, base + 2.0, base - 2.0, base + 0.5)
            })
            .collect();
        assert!(calculate_atr(&bars, 14).unwrap() > 0.0);
    }
}
