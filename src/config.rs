// src/config.rs
// Indicator configuration: one variant per indicator, each with its own
// strongly-typed parameter record

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IndicatorError;
use crate::types::{BollPoint, Candle, KdjPoint, MacdPoint, Point, VolumePoint};
use crate::{momentum, moving_averages, oscillators, volatility, volume};

// ============================================================================
// Parameter records
// ============================================================================

macro_rules! period_params {
    ($(#[$meta:meta])* $name:ident, $default:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
        #[serde(default)]
        pub struct $name {
            pub period: usize,
        }

        impl Default for $name {
            fn default() -> Self {
                Self { period: $default }
            }
        }
    };
}

period_params!(
    /// Simple moving average window
    MaParams,
    20
);
period_params!(
    /// Exponential moving average period
    EmaParams,
    20
);
period_params!(RsiParams, 14);
period_params!(AtrParams, 14);
period_params!(MfiParams, 14);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self { fast: 12, slow: 26, signal: 9 }
    }
}

/// Bollinger Bands window and band width in standard deviations
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BollParams {
    pub period: usize,
    pub std_dev: f64,
}

impl Default for BollParams {
    fn default() -> Self {
        Self { period: 20, std_dev: 2.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KdjParams {
    pub period: usize,
    pub k_smooth: usize,
    pub d_smooth: usize,
}

impl Default for KdjParams {
    fn default() -> Self {
        Self { period: 9, k_smooth: 3, d_smooth: 3 }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// An indicator together with its parameters.
///
/// Serialized with an internal `type` tag, e.g.
/// `{"type":"MACD","fast":12,"slow":26,"signal":9}`. Missing parameters
/// take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum IndicatorConfig {
    Ma(MaParams),
    Ema(EmaParams),
    Macd(MacdParams),
    Boll(BollParams),
    Rsi(RsiParams),
    Kdj(KdjParams),
    Atr(AtrParams),
    Vol,
    Vwap,
    Obv,
    Mfi(MfiParams),
    Vpt,
}

/// Output of [`IndicatorConfig::compute`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", content = "points", rename_all = "lowercase")]
pub enum IndicatorSeries {
    Line(Vec<Point>),
    Macd(Vec<MacdPoint>),
    Boll(Vec<BollPoint>),
    Kdj(Vec<KdjPoint>),
    Volume(Vec<VolumePoint>),
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        match self {
            Self::Line(p) => p.len(),
            Self::Macd(p) => p.len(),
            Self::Boll(p) => p.len(),
            Self::Kdj(p) => p.len(),
            Self::Volume(p) => p.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn at_least(indicator: &'static str, param: &'static str, value: usize, min: usize) -> Result<(), IndicatorError> {
    if value < min {
        return Err(IndicatorError::ParameterTooSmall { indicator, param, min, value });
    }
    Ok(())
}

impl IndicatorConfig {
    /// Short upper-case name, matching the serialized `type` tag
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ma(_) => "MA",
            Self::Ema(_) => "EMA",
            Self::Macd(_) => "MACD",
            Self::Boll(_) => "BOLL",
            Self::Rsi(_) => "RSI",
            Self::Kdj(_) => "KDJ",
            Self::Atr(_) => "ATR",
            Self::Vol => "VOL",
            Self::Vwap => "VWAP",
            Self::Obv => "OBV",
            Self::Mfi(_) => "MFI",
            Self::Vpt => "VPT",
        }
    }

    /// Reject periods and smoothing factors below 1 and band multipliers that
    /// are negative or not finite.
    pub fn validate(&self) -> Result<(), IndicatorError> {
        let name = self.name();
        match self {
            Self::Ma(MaParams { period })
            | Self::Ema(EmaParams { period })
            | Self::Rsi(RsiParams { period })
            | Self::Atr(AtrParams { period })
            | Self::Mfi(MfiParams { period }) => at_least(name, "period", *period, 1),
            Self::Macd(p) => {
                at_least(name, "fast", p.fast, 1)?;
                at_least(name, "slow", p.slow, 1)?;
                at_least(name, "signal", p.signal, 1)
            }
            Self::Boll(p) => {
                at_least(name, "period", p.period, 1)?;
                if !p.std_dev.is_finite() || p.std_dev < 0.0 {
                    return Err(IndicatorError::InvalidMultiplier { indicator: name, param: "stdDev", value: p.std_dev });
                }
                Ok(())
            }
            Self::Kdj(p) => {
                at_least(name, "period", p.period, 1)?;
                at_least(name, "kSmooth", p.k_smooth, 1)?;
                at_least(name, "dSmooth", p.d_smooth, 1)
            }
            Self::Vol | Self::Vwap | Self::Obv | Self::Vpt => Ok(()),
        }
    }

    /// Warm-up length: the fewest candles that produce one output point
    pub fn min_candles(&self) -> usize {
        match self {
            Self::Ma(MaParams { period }) | Self::Ema(EmaParams { period }) => *period,
            Self::Boll(p) => p.period,
            Self::Kdj(p) => p.period,
            Self::Rsi(RsiParams { period }) | Self::Atr(AtrParams { period }) | Self::Mfi(MfiParams { period }) => {
                period.saturating_add(1)
            }
            Self::Macd(p) => p.fast.max(p.slow).saturating_add(p.signal).saturating_sub(1),
            Self::Vol | Self::Vwap | Self::Obv | Self::Vpt => 1,
        }
    }

    /// Validate, then run the indicator over `candles`.
    ///
    /// Too few candles is not an error: the series comes back empty.
    pub fn compute(&self, candles: &[Candle]) -> Result<IndicatorSeries, IndicatorError> {
        self.validate()?;

        let series = match *self {
            Self::Ma(p) => IndicatorSeries::Line(moving_averages::ma(candles, p.period)),
            Self::Ema(p) => IndicatorSeries::Line(moving_averages::ema(candles, p.period)),
            Self::Macd(p) => IndicatorSeries::Macd(momentum::macd(candles, p.fast, p.slow, p.signal)),
            Self::Boll(p) => IndicatorSeries::Boll(volatility::boll(candles, p.period, p.std_dev)),
            Self::Rsi(p) => IndicatorSeries::Line(oscillators::rsi(candles, p.period)),
            Self::Kdj(p) => IndicatorSeries::Kdj(oscillators::kdj(candles, p.period, p.k_smooth, p.d_smooth)),
            Self::Atr(p) => IndicatorSeries::Line(volatility::atr(candles, p.period)),
            Self::Vol => IndicatorSeries::Volume(volume::vol(candles)),
            Self::Vwap => IndicatorSeries::Line(volume::vwap(candles)),
            Self::Obv => IndicatorSeries::Line(volume::obv(candles)),
            Self::Mfi(p) => IndicatorSeries::Line(volume::mfi(candles, p.period)),
            Self::Vpt => IndicatorSeries::Line(volume::vpt(candles)),
        };
        Ok(series)
    }
}

impl fmt::Display for IndicatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        match self {
            Self::Ma(MaParams { period })
            | Self::Ema(EmaParams { period })
            | Self::Rsi(RsiParams { period })
            | Self::Atr(AtrParams { period })
            | Self::Mfi(MfiParams { period }) => write!(f, "{name}({period})"),
            Self::Macd(p) => write!(f, "{name}({},{},{})", p.fast, p.slow, p.signal),
            Self::Boll(p) => write!(f, "{name}({},{})", p.period, p.std_dev),
            Self::Kdj(p) => write!(f, "{name}({},{},{})", p.period, p.k_smooth, p.d_smooth),
            Self::Vol | Self::Vwap | Self::Obv | Self::Vpt => f.write_str(name),
        }
    }
}

fn parse_arg<T: FromStr>(indicator: &str, args: &[&str], index: usize, default: T) -> Result<T, IndicatorError> {
    match args.get(index) {
        None | Some(&"") => Ok(default),
        Some(raw) => raw.parse().map_err(|_| IndicatorError::InvalidParameters {
            indicator: indicator.to_string(),
            reason: format!("`{raw}` is not a valid number"),
        }),
    }
}

/// Parses `NAME[:p1,p2,...]`, case-insensitive. Omitted trailing parameters
/// and empty slots take their defaults: `macd:5,35` is MACD(5,35,9) and
/// `macd:12,,5` is MACD(12,26,5).
impl FromStr for IndicatorConfig {
    type Err = IndicatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, rest) = s.trim().split_once(':').unwrap_or((s.trim(), ""));
        let name = name.trim().to_ascii_uppercase();
        // Slots keep their position; `name:` alone means no parameters
        let rest = rest.trim();
        let args: Vec<&str> = if rest.is_empty() { vec![] } else { rest.split(',').map(str::trim).collect() };

        let arity = match name.as_str() {
            "MA" | "EMA" | "RSI" | "ATR" | "MFI" => 1,
            "BOLL" => 2,
            "MACD" | "KDJ" => 3,
            "VOL" | "VWAP" | "OBV" | "VPT" => 0,
            _ => return Err(IndicatorError::UnknownIndicator(name)),
        };
        if args.len() > arity {
            return Err(IndicatorError::InvalidParameters {
                reason: format!("expected at most {arity} parameters, got {}", args.len()),
                indicator: name,
            });
        }

        let n = name.as_str();
        let config = match n {
            "MA" => Self::Ma(MaParams { period: parse_arg(n, &args, 0, MaParams::default().period)? }),
            "EMA" => Self::Ema(EmaParams { period: parse_arg(n, &args, 0, EmaParams::default().period)? }),
            "RSI" => Self::Rsi(RsiParams { period: parse_arg(n, &args, 0, RsiParams::default().period)? }),
            "ATR" => Self::Atr(AtrParams { period: parse_arg(n, &args, 0, AtrParams::default().period)? }),
            "MFI" => Self::Mfi(MfiParams { period: parse_arg(n, &args, 0, MfiParams::default().period)? }),
            "MACD" => {
                let d = MacdParams::default();
                Self::Macd(MacdParams {
                    fast: parse_arg(n, &args, 0, d.fast)?,
                    slow: parse_arg(n, &args, 1, d.slow)?,
                    signal: parse_arg(n, &args, 2, d.signal)?,
                })
            }
            "BOLL" => {
                let d = BollParams::default();
                Self::Boll(BollParams {
                    period: parse_arg(n, &args, 0, d.period)?,
                    std_dev: parse_arg(n, &args, 1, d.std_dev)?,
                })
            }
            "KDJ" => {
                let d = KdjParams::default();
                Self::Kdj(KdjParams {
                    period: parse_arg(n, &args, 0, d.period)?,
                    k_smooth: parse_arg(n, &args, 1, d.k_smooth)?,
                    d_smooth: parse_arg(n, &args, 2, d.d_smooth)?,
                })
            }
            "VOL" => Self::Vol,
            "VWAP" => Self::Vwap,
            "OBV" => Self::Obv,
            _ => Self::Vpt,
        };
        Ok(config)
    }
}

/// Parse a `;`-separated list of indicator specs, e.g. `ma:20;rsi:14`
pub fn parse_list(s: &str) -> Result<Vec<IndicatorConfig>, IndicatorError> {
    s.split(';').map(str::trim).filter(|spec| !spec.is_empty()).map(str::parse).collect()
}
