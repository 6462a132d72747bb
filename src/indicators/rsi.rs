// =============================================================================
// Relative Strength Index (RSI): trailing simple average
// =============================================================================
//
// Step 1: First-difference the prices into gains and losses.
// Step 2: Sum the last `period` gains and losses and divide by `period`
//          (the divisor stays `period` even when fewer differences exist).
// Step 3: RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// avg_loss == 0 saturates at 100, including a perfectly flat market.
// =============================================================================

use crate::stats::tail;

/// RSI of the last `period` price changes.
///
/// Returns `None` when `period` is zero. Fewer than two prices means no
/// changes at all and therefore RSI 100.
pub fn trailing_rsi(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 {
        return None;
    }

    let (gains, losses): (Vec<f64>, Vec<f64>) = prices
        .windows(2)
        .map(|w| {
            let change = w[1] - w[0];
            (change.max(0.0), (-change).max(0.0))
        })
        .unzip();

    let period_f = period as f64;
    let avg_gain = tail(&gains, period).iter().sum::<f64>() / period_f;
    let avg_loss = tail(&losses, period).iter().sum::<f64>() / period_f;

    Some(rsi_from_averages(avg_gain, avg_loss))
}

/// Convert average gain / average loss into an RSI value in [0, 100].
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}
