//! Oscillator Indicators
//!
//! This module provides oscillator calculations:
//! - RSI: Relative Strength Index (Wilder)
//! - KDJ: Stochastic K/D with the J line

use crate::common::{align, closes, diff, gains_losses, has_enough_data, max, min};
use crate::types::{Candle, KdjPoint, Point};

/// Starting value of the K and D recursions.
///
/// A fixed design constant, not derived from data: every call starts from it.
pub const KDJ_SEED: f64 = 50.0;

#[inline]
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}

/// Relative Strength Index (Wilder's RSI)
///
/// Measures momentum by comparing magnitude of recent gains vs losses.
///
/// # Formula
/// Seed averages = simple mean of the first `period` single-step gains/losses
/// Avg = (Avg[1] × (period - 1) + current) / period
/// RSI = 100 - (100 / (1 + Avg Gain / Avg Loss)), or 100 when Avg Loss is 0
///
/// # Returns
/// `n - period` values between 0 and 100, the first at `candles[period]`
pub fn rsi(candles: &[Candle], period: usize) -> Vec<Point> {
    let changes = diff(&closes(candles));
    if !has_enough_data(changes.len(), period) {
        return vec![];
    }

    let (gains, losses) = gains_losses(&changes);
    let p = period as f64;

    let mut avg_gain = gains[..period].iter().sum::<f64>() / p;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / p;

    let mut values = Vec::with_capacity(changes.len() - period + 1);
    values.push(rsi_from_averages(avg_gain, avg_loss));

    for i in period..changes.len() {
        avg_gain = (avg_gain * (p - 1.0) + gains[i]) / p;
        avg_loss = (avg_loss * (p - 1.0) + losses[i]) / p;
        values.push(rsi_from_averages(avg_gain, avg_loss));
    }

    align(candles, period, &values)
}

/// KDJ with the standard seed of [`KDJ_SEED`] for both K and D.
pub fn kdj(candles: &[Candle], period: usize, k_smooth: usize, d_smooth: usize) -> Vec<KdjPoint> {
    kdj_seeded(candles, period, k_smooth, d_smooth, KDJ_SEED)
}

/// KDJ
///
/// # Formula
/// RSV = (Close - Lowest Low) / (Highest High - Lowest Low) × 100,
///       or 50 when the window has no range
/// K = (K[1] × (k_smooth - 1) + RSV) / k_smooth
/// D = (D[1] × (d_smooth - 1) + K) / d_smooth
/// J = 3K - 2D
///
/// K and D both start from `seed` before the first RSV.
pub fn kdj_seeded(
    candles: &[Candle],
    period: usize,
    k_smooth: usize,
    d_smooth: usize,
    seed: f64,
) -> Vec<KdjPoint> {
    let n = candles.len();
    if !has_enough_data(n, period) || k_smooth == 0 || d_smooth == 0 {
        return vec![];
    }

    let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
    let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();
    let ks = k_smooth as f64;
    let ds = d_smooth as f64;

    let mut k = seed;
    let mut d = seed;
    let mut result = Vec::with_capacity(n - period + 1);

    for i in (period - 1)..n {
        let highest = max(&highs[(i + 1 - period)..=i]);
        let lowest = min(&lows[(i + 1 - period)..=i]);

        let rsv = if highest != lowest {
            (candles[i].close - lowest) / (highest - lowest) * 100.0
        } else {
            50.0
        };

        k = (k * (ks - 1.0) + rsv) / ks;
        d = (d * (ds - 1.0) + k) / ds;

        result.push(KdjPoint {
            time: candles[i].time,
            k,
            d,
            j: 3.0 * k - 2.0 * d,
        });
    }

    result
}
