//! Volume indicators
//!
//! Indicators that incorporate trading volume to analyze price movements.
//! VWAP, OBV and VPT are cumulative from the first candle supplied, so moving
//! the start of the window changes every value.

use crate::common::{align, has_enough_data};
use crate::types::{Candle, Point, VolumePoint};

/// VOL - raw volume bars
///
/// One point per candle; `rising` marks candles that closed at or above
/// their open.
pub fn vol(candles: &[Candle]) -> Vec<VolumePoint> {
    candles
        .iter()
        .map(|c| VolumePoint {
            time: c.time,
            value: c.volume,
            rising: c.close >= c.open,
        })
        .collect()
}

/// VWAP - Volume Weighted Average Price
///
/// Formula: Cumulative(Typical Price × Volume) / Cumulative(Volume)
/// where Typical Price = (High + Low + Close) / 3
///
/// While cumulative volume is zero the typical price itself is used.
pub fn vwap(candles: &[Candle]) -> Vec<Point> {
    let mut cumulative_tpv = 0.0;
    let mut cumulative_vol = 0.0;

    candles
        .iter()
        .map(|c| {
            let typical_price = c.typical_price();
            cumulative_tpv += typical_price * c.volume;
            cumulative_vol += c.volume;

            let value = if cumulative_vol != 0.0 {
                cumulative_tpv / cumulative_vol
            } else {
                typical_price
            };
            Point { time: c.time, value }
        })
        .collect()
}

/// OBV - On Balance Volume
///
/// Formula:
/// - OBV starts at 0 on the first candle
/// - If Close > Close[1]: OBV = OBV[1] + Volume
/// - If Close < Close[1]: OBV = OBV[1] - Volume
/// - If Close = Close[1]: OBV = OBV[1]
pub fn obv(candles: &[Candle]) -> Vec<Point> {
    let Some(first) = candles.first() else {
        return vec![];
    };

    let mut result = Vec::with_capacity(candles.len());
    let mut current = 0.0;
    result.push(Point { time: first.time, value: current });

    for w in candles.windows(2) {
        let (prev, cur) = (&w[0], &w[1]);
        if cur.close > prev.close {
            current += cur.volume;
        } else if cur.close < prev.close {
            current -= cur.volume;
        }
        result.push(Point { time: cur.time, value: current });
    }
    result
}

/// MFI - Money Flow Index
///
/// Volume-weighted RSI.
///
/// # Formula
/// Typical Price = (High + Low + Close) / 3
/// Raw Money Flow = Typical Price × Volume, positive when the typical price
/// rose from the previous candle, negative when it fell, neither when equal
/// MFI = 100 - (100 / (1 + Positive Flow / Negative Flow)) over the last
/// `period` flows, or 100 when Negative Flow is 0
///
/// Needs `period + 1` candles; returns `n - period` points starting at
/// `candles[period]`.
pub fn mfi(candles: &[Candle], period: usize) -> Vec<Point> {
    let n = candles.len();
    if !has_enough_data(n.saturating_sub(1), period) {
        return vec![];
    }

    // Flow k belongs to candle k + 1
    let (positive, negative): (Vec<f64>, Vec<f64>) = candles
        .windows(2)
        .map(|w| {
            let prev_tp = w[0].typical_price();
            let tp = w[1].typical_price();
            let raw = tp * w[1].volume;
            if tp > prev_tp {
                (raw, 0.0)
            } else if tp < prev_tp {
                (0.0, raw)
            } else {
                (0.0, 0.0)
            }
        })
        .unzip();

    let values: Vec<f64> = positive
        .windows(period)
        .zip(negative.windows(period))
        .map(|(pos, neg)| {
            let pos_flow: f64 = pos.iter().sum();
            let neg_flow: f64 = neg.iter().sum();
            if neg_flow == 0.0 {
                100.0
            } else {
                100.0 - (100.0 / (1.0 + pos_flow / neg_flow))
            }
        })
        .collect();

    align(candles, period, &values)
}

/// VPT - Volume Price Trend
///
/// Formula:
/// - VPT starts at 0 on the first candle
/// - VPT = VPT[1] + Volume × (Close - Close[1]) / Close[1]
///
/// A zero previous close is not guarded: the division yields an infinite or
/// NaN step and every later value inherits it.
pub fn vpt(candles: &[Candle]) -> Vec<Point> {
    let Some(first) = candles.first() else {
        return vec![];
    };

    let mut result = Vec::with_capacity(candles.len());
    let mut current = 0.0;
    result.push(Point { time: first.time, value: current });

    for w in candles.windows(2) {
        let (prev, cur) = (&w[0], &w[1]);
        current += (cur.close - prev.close) / prev.close * cur.volume;
        result.push(Point { time: cur.time, value: current });
    }
    result
}
