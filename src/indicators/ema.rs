// =============================================================================
// Exponential Moving Average (EMA): scalar accumulator form
// =============================================================================
//
// Formula:
//   multiplier = 2 / (period + 1)
//   v_0        = price_0
//   v_i        = (price_i - v_{i-1}) * multiplier + v_{i-1}
//
// Only the final accumulator is returned. The seed is the first price, not
// the SMA of the first `period` prices, so the value differs from a textbook
// EMA series on short inputs. MACD reuses this recurrence with its own
// periods.
// =============================================================================

/// Smoothing factor `2 / (period + 1)`.
#[inline]
pub fn multiplier(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// Final EMA value of `prices` for `period`.
///
/// # Edge cases
/// - empty input => `None`
/// - single price => that price
pub fn scalar_ema(prices: &[f64], period: usize) -> Option<f64> {
    let (&seed, rest) = prices.split_first()?;
    let alpha = multiplier(period);
    Some(rest.iter().fold(seed, |prev, &price| (price - prev) * alpha + prev))
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_empty_input() {
        assert!(scalar_ema(&[], 5).is_none());
    }

    #[test]
    fn ema_single_price_is_seed() {
        assert_eq!(scalar_ema(&[42.0], 14), Some(42.0));
    }

    #[test]
    fn ema_known_values() {
        // period 3 => alpha 0.5: 2 -> 3 -> 4.5
        let ema = scalar_ema(&[2.0, 4.0, 6.0], 3).unwrap();
        assert!((ema - 4.5).abs() < 1e-12);
    }

    #[test]
    fn ema_flat_series() {
        let ema = scalar_ema(&[100.0; 30], 14).unwrap();
        assert!((ema - 100.0).abs() < 1e-12);
    }

    #[test]
    fn ema_lags_rising_series() {
        let closes: Vec<f64> = (1..=50).map(|x| x as f64).collect();
        let ema = scalar_ema(&closes, 10).unwrap();
        assert!(ema < 50.0 && ema > 40.0, "got {ema}");
    }

    #[test]
    fn multiplier_values() {
        assert!((multiplier(14) - 2.0 / 15.0).abs() < 1e-15);
        assert!((multiplier(9) - 0.2).abs() < 1e-15);
    }
}
