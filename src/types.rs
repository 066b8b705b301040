// src/types.rs
// Candle input and derived point types shared by the engine and its consumers

use serde::{Deserialize, Serialize};

/// Epoch milliseconds.
pub type Timestamp = i64;

// ============================================================================
// Input
// ============================================================================

/// One OHLCV bar.
///
/// `low <= open, close <= high` is expected but not checked. Sequences are
/// supplied in strictly ascending `time`; indicators never sort.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Candle {
    pub time: Timestamp,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Candle {
    pub fn new(time: Timestamp, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self { time, open, high, low, close, volume }
    }

    /// Typical price: `(high + low + close) / 3`
    #[inline]
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

// ============================================================================
// Derived points
// ============================================================================

/// Single-value point (MA, EMA, RSI, ATR, VWAP, OBV, MFI, VPT)
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Point {
    pub time: Timestamp,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct MacdPoint {
    pub time: Timestamp,
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct BollPoint {
    pub time: Timestamp,
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct KdjPoint {
    pub time: Timestamp,
    pub k: f64,
    pub d: f64,
    pub j: f64,
}

/// Volume bar. `rising` is set when the candle closed at or above its open.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct VolumePoint {
    pub time: Timestamp,
    pub value: f64,
    pub rising: bool,
}
