//! Moving Average Indicators
//!
//! - MA: Simple Moving Average of close
//! - EMA: Exponential Moving Average of close
//!
//! The `*_values` variants work on bare slices and are reused by MACD and
//! Bollinger Bands. They return only the valid suffix: index `k` of the
//! result belongs to input index `period - 1 + k`.

use crate::common::{align, closes, has_enough_data, mean};
use crate::types::{Candle, Point};

/// Simple moving average over a slice, valid values only.
pub fn sma_values(values: &[f64], period: usize) -> Vec<f64> {
    if !has_enough_data(values.len(), period) {
        return vec![];
    }
    values.windows(period).map(mean).collect()
}

/// Exponential moving average over a slice, valid values only.
///
/// # Formula
/// Seed = SMA of the first `period` values
/// Multiplier = 2 / (period + 1)
/// EMA = (Value - Previous EMA) × Multiplier + Previous EMA
pub fn ema_values(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    if !has_enough_data(n, period) {
        return vec![];
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut result = Vec::with_capacity(n - period + 1);

    let mut prev = mean(&values[..period]);
    result.push(prev);

    for &value in &values[period..] {
        prev = (value - prev) * multiplier + prev;
        result.push(prev);
    }

    result
}

/// Simple Moving Average (MA) of close
///
/// # Formula
/// MA = (C1 + C2 + ... + Cn) / n
///
/// # Returns
/// `n - period + 1` points, the first at `candles[period - 1].time`.
/// Empty when fewer than `period` candles are supplied.
///
/// # Example
/// ```
/// use candle_indicators::{ma, Candle};
/// let candles: Vec<Candle> = [1.0, 2.0, 3.0, 4.0]
///     .iter()
///     .enumerate()
///     .map(|(i, &c)| Candle::new(i as i64, c, c, c, c, 0.0))
///     .collect();
/// let result = ma(&candles, 2);
/// assert_eq!(result.len(), 3);
/// assert_eq!(result[0].value, 1.5);
/// assert_eq!(result[0].time, 1);
/// ```
pub fn ma(candles: &[Candle], period: usize) -> Vec<Point> {
    let values = sma_values(&closes(candles), period);
    if values.is_empty() {
        return vec![];
    }
    align(candles, period - 1, &values)
}

/// Exponential Moving Average (EMA) of close
///
/// Seeded with the simple average of the first `period` closes, emitted at
/// `candles[period - 1]`.
pub fn ema(candles: &[Candle], period: usize) -> Vec<Point> {
    let values = ema_values(&closes(candles), period);
    if values.is_empty() {
        return vec![];
    }
    align(candles, period - 1, &values)
}
