//! Common utilities shared across indicator modules

use crate::types::{Candle, Point};

/// Check if we have enough data for the given period.
///
/// A zero period never has enough data, so raw indicator functions return an
/// empty series instead of dividing by zero.
#[inline]
pub fn has_enough_data(len: usize, period: usize) -> bool {
    len >= period && period > 0
}

/// Calculate the sum of a slice
#[inline]
pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// Calculate the mean of a slice
#[inline]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    sum(values) / values.len() as f64
}

/// Population standard deviation (divides by `len`, not `len - 1`)
#[inline]
pub fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Find the maximum value in a slice
#[inline]
pub fn max(values: &[f64]) -> f64 {
    values.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
}

/// Find the minimum value in a slice
#[inline]
pub fn min(values: &[f64]) -> f64 {
    values.iter().cloned().fold(f64::INFINITY, f64::min)
}

/// Closing prices of a candle slice
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// Compute pairwise differences (like np.diff)
pub fn diff(values: &[f64]) -> Vec<f64> {
    if values.len() < 2 {
        return vec![];
    }
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Separate gains and losses from price changes
pub fn gains_losses(changes: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let gains: Vec<f64> = changes.iter().map(|&c| if c > 0.0 { c } else { 0.0 }).collect();
    let losses: Vec<f64> = changes.iter().map(|&c| if c < 0.0 { -c } else { 0.0 }).collect();
    (gains, losses)
}

/// Pair values with the times of `candles[offset..]`.
///
/// Values are right-aligned: `values[k]` belongs to `candles[offset + k]`.
pub fn align(candles: &[Candle], offset: usize, values: &[f64]) -> Vec<Point> {
    candles[offset..]
        .iter()
        .zip(values)
        .map(|(c, &value)| Point { time: c.time, value })
        .collect()
}
