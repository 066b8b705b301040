//! Volatility indicators
//!
//! Indicators that measure the degree of price variation over time.

use crate::common::{align, closes, has_enough_data, mean, population_std_dev};
use crate::types::{BollPoint, Candle, Point};

/// True Range
///
/// The greatest of:
/// - Current High - Current Low
/// - |Current High - Previous Close|
/// - |Current Low - Previous Close|
///
/// Defined from the second candle on; index `k` of the result belongs to
/// `candles[k + 1]`.
pub fn true_range(candles: &[Candle]) -> Vec<f64> {
    candles
        .windows(2)
        .map(|w| {
            let (prev, cur) = (&w[0], &w[1]);
            let h_l = cur.high - cur.low;
            let h_c = (cur.high - prev.close).abs();
            let l_c = (cur.low - prev.close).abs();
            h_l.max(h_c).max(l_c)
        })
        .collect()
}

/// ATR - Average True Range
///
/// Seeded with the simple average of the first `period` true ranges, then
/// Wilder smoothing: `ATR = (ATR[1] × (period - 1) + TR) / period`.
///
/// Needs `period + 1` candles; returns `n - period` points starting at
/// `candles[period]`.
pub fn atr(candles: &[Candle], period: usize) -> Vec<Point> {
    let tr = true_range(candles);
    if !has_enough_data(tr.len(), period) {
        return vec![];
    }

    let p = period as f64;
    let mut values = Vec::with_capacity(tr.len() - period + 1);
    let mut current = mean(&tr[..period]);
    values.push(current);

    for &range in &tr[period..] {
        current = (current * (p - 1.0) + range) / p;
        values.push(current);
    }

    align(candles, period, &values)
}

/// Bollinger Bands
///
/// Formula:
/// - Middle = SMA(close, period)
/// - σ = population standard deviation of the same window
/// - Upper = Middle + std_mult × σ
/// - Lower = Middle - std_mult × σ
pub fn boll(candles: &[Candle], period: usize, std_mult: f64) -> Vec<BollPoint> {
    let n = candles.len();
    if !has_enough_data(n, period) {
        return vec![];
    }

    let closes = closes(candles);
    closes
        .windows(period)
        .zip(&candles[(period - 1)..])
        .map(|(window, candle)| {
            let middle = mean(window);
            let sigma = population_std_dev(window, middle);
            BollPoint {
                time: candle.time,
                upper: middle + std_mult * sigma,
                middle,
                lower: middle - std_mult * sigma,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{assert_approx_eq, from_closes, from_hlcv};

    fn ohlc() -> Vec<Candle> {
        from_hlcv(&[
            (12.0, 10.0, 11.0, 0.0),
            (13.0, 11.0, 12.0, 0.0),
            (15.0, 12.5, 14.0, 0.0),
            (14.5, 11.0, 12.0, 0.0),
            (13.0, 12.0, 12.5, 0.0),
        ])
    }

    #[test]
    fn test_true_range() {
        let tr = true_range(&ohlc());
        // bar 1: hl=2, |13-11|=2, |11-11|=0
        // bar 2: hl=2.5, |15-12|=3, |12.5-12|=0.5
        // bar 3: hl=3.5, |14.5-14|=0.5, |11-14|=3
        // bar 4: hl=1, |13-12|=1, |12-12|=0
        assert_eq!(tr, vec![2.0, 3.0, 3.5, 1.0]);
    }

    #[test]
    fn test_true_range_gap_down() {
        let candles = from_hlcv(&[(50.0, 48.0, 50.0, 0.0), (30.0, 5.0, 20.0, 0.0)]);
        // |5 - 50| = 45 dominates hl = 25
        assert_eq!(true_range(&candles), vec![45.0]);
    }

    #[test]
    fn test_atr_wilder() {
        let candles = ohlc();
        let result = atr(&candles, 2);

        assert_eq!(result.len(), 3);
        assert_eq!(result[0].time, candles[2].time);
        assert_approx_eq(result[0].value, 2.5); // (2 + 3) / 2
        assert_approx_eq(result[1].value, 3.0); // (2.5 + 3.5) / 2
        assert_approx_eq(result[2].value, 2.0); // (3.0 + 1.0) / 2
    }

    #[test]
    fn test_atr_needs_period_plus_one() {
        let candles = ohlc();
        assert_eq!(atr(&candles, 4).len(), 1);
        assert!(atr(&candles, 5).is_empty());
        assert!(atr(&candles, 0).is_empty());
    }

    #[test]
    fn test_boll_basic() {
        let candles = from_closes(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let result = boll(&candles, 8, 2.0);

        assert_eq!(result.len(), 1);
        assert_approx_eq(result[0].middle, 5.0);
        assert_approx_eq(result[0].upper, 9.0); // 5 + 2 * 2
        assert_approx_eq(result[0].lower, 1.0);
        assert_eq!(result[0].time, 8);
    }

    #[test]
    fn test_boll_constant_price() {
        let candles = from_closes(&[100.0; 25]);
        let result = boll(&candles, 20, 2.0);

        assert_eq!(result.len(), 6);
        for p in &result {
            assert_eq!(p.upper, p.middle);
            assert_eq!(p.lower, p.middle);
        }
    }

    #[test]
    fn test_boll_zero_multiplier() {
        let candles = from_closes(&[1.0, 3.0, 2.0, 5.0, 4.0]);
        for p in boll(&candles, 3, 0.0) {
            assert_eq!(p.upper, p.middle);
            assert_eq!(p.lower, p.middle);
        }
    }

    #[test]
    fn test_boll_ordering() {
        let closes: Vec<f64> = (0..50).map(|x| (x as f64 * 0.7).cos() * 3.0 + 20.0).collect();
        for p in boll(&from_closes(&closes), 10, 2.0) {
            assert!(p.lower <= p.middle && p.middle <= p.upper);
        }
    }
}
