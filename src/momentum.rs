//! Momentum indicators
//!
//! Indicators that measure the rate of change or strength of price movements.

use crate::common::{closes, has_enough_data};
use crate::moving_averages::ema_values;
use crate::types::{Candle, MacdPoint};

/// MACD - Moving Average Convergence Divergence
///
/// Formula:
/// - MACD Line = EMA(fast) - EMA(slow)
/// - Signal Line = EMA(MACD Line, signal)
/// - Histogram = MACD Line - Signal Line
///
/// Both EMAs are standard EMAs seeded from their own first `period` closes.
/// The MACD line starts where the later of the two becomes valid (the slow
/// EMA in normal use). The signal line is seeded from the SMA of the first
/// `signal` MACD values and output is aligned to it, so the first point lands
/// on `candles[max(fast, slow) + signal - 2]`.
///
/// Returns an empty series if `candles.len() < slow` or the MACD line is
/// shorter than `signal`.
pub fn macd(candles: &[Candle], fast: usize, slow: usize, signal: usize) -> Vec<MacdPoint> {
    let n = candles.len();
    let longest = fast.max(slow);
    if fast == 0 || slow == 0 || signal == 0 || !has_enough_data(n, longest) {
        return vec![];
    }

    let closes = closes(candles);
    let fast_ema = ema_values(&closes, fast);
    let slow_ema = ema_values(&closes, slow);

    // Index k of the MACD line belongs to candle `start + k`
    let start = longest - 1;
    let macd_line: Vec<f64> = (start..n)
        .map(|i| fast_ema[i + 1 - fast] - slow_ema[i + 1 - slow])
        .collect();

    let signal_line = ema_values(&macd_line, signal);
    if signal_line.is_empty() {
        return vec![];
    }

    let offset = signal - 1;
    signal_line
        .iter()
        .enumerate()
        .map(|(k, &sig)| {
            let line = macd_line[offset + k];
            MacdPoint {
                time: candles[start + offset + k].time,
                macd: line,
                signal: sig,
                histogram: line - sig,
            }
        })
        .collect()
}
