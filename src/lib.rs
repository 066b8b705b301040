//! # Candle Indicators
//!
//! Technical indicators computed over OHLCV candle series.
//!
//! ## Features
//! - MA, EMA, MACD, BOLL, RSI, KDJ, ATR, VOL, VWAP, OBV, MFI and VPT
//! - Outputs are time-aligned with the input: one point per candle after the
//!   warm-up, each carrying the time of the candle it belongs to
//! - Too little data yields an empty series, never an error
//! - Typed configuration with validation and chart overlay output
//! - Compiles to native and WASM
//!
//! ## Example
//! ```
//! use candle_indicators::{Candle, IndicatorConfig, MacdParams, ma};
//!
//! let candles: Vec<Candle> = (0..40)
//!     .map(|i| {
//!         let c = 100.0 + (i as f64 * 0.3).sin();
//!         Candle::new(i * 60_000, c, c + 0.5, c - 0.5, c, 1_000.0)
//!     })
//!     .collect();
//!
//! let sma = ma(&candles, 20);
//! assert_eq!(sma.len(), 21);
//! assert_eq!(sma[0].time, candles[19].time);
//!
//! let macd = IndicatorConfig::Macd(MacdParams::default()).compute(&candles).unwrap();
//! assert_eq!(macd.len(), 40 - 33);
//! ```

pub mod api;
pub mod common;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod momentum;
pub mod moving_averages;
pub mod oscillators;
pub mod overlay;
pub mod settings;
pub mod types;
pub mod volatility;
pub mod volume;

#[cfg(test)]
mod test_util;

// Re-export commonly used items at crate root
pub use config::{
    parse_list, AtrParams, BollParams, EmaParams, IndicatorConfig, IndicatorSeries, KdjParams, MaParams, MacdParams,
    MfiParams, RsiParams,
};
pub use error::{IndicatorError, LoadError};
pub use momentum::macd;
pub use moving_averages::{ema, ma};
pub use oscillators::{kdj, kdj_seeded, rsi, KDJ_SEED};
pub use overlay::{build_overlays, default_overlays, Overlay, OverlayLine, Pane};
pub use types::{BollPoint, Candle, KdjPoint, MacdPoint, Point, Timestamp, VolumePoint};
pub use volatility::{atr, boll, true_range};
pub use volume::{mfi, obv, vol, vpt, vwap};

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

/// WASM bindings for browser use.
///
/// Candles and configurations cross the boundary as JSON text.
#[cfg(feature = "wasm")]
#[wasm_bindgen]
pub struct Indicators;

#[cfg(feature = "wasm")]
fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[cfg(feature = "wasm")]
#[wasm_bindgen]
impl Indicators {
    /// Compute one indicator; returns the serialized [`IndicatorSeries`].
    #[wasm_bindgen]
    pub fn compute(candles_json: &str, config_json: &str) -> Result<String, JsValue> {
        let candles = loader::candles_from_json(candles_json.as_bytes()).map_err(js_error)?;
        let config: IndicatorConfig = serde_json::from_str(config_json).map_err(js_error)?;
        let series = config.compute(&candles).map_err(js_error)?;
        serde_json::to_string(&series).map_err(js_error)
    }

    /// Compute a list of overlay slots; returns the serialized overlays.
    #[wasm_bindgen]
    pub fn overlays(candles_json: &str, configs_json: &str) -> Result<String, JsValue> {
        let candles = loader::candles_from_json(candles_json.as_bytes()).map_err(js_error)?;
        let slots: Vec<IndicatorConfig> = serde_json::from_str(configs_json).map_err(js_error)?;
        let overlays = build_overlays(&candles, &slots).map_err(js_error)?;
        serde_json::to_string(&overlays).map_err(js_error)
    }
}
