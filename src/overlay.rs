//! Chart overlay adapter
//!
//! Maps indicator results onto named line series keyed by slot index, the
//! shape a charting layer plots directly.

use serde::{Deserialize, Serialize};

use crate::config::{BollParams, EmaParams, IndicatorConfig, IndicatorSeries, MaParams, MacdParams, RsiParams};
use crate::error::IndicatorError;
use crate::types::{Candle, Point};

/// Where the chart draws an overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pane {
    /// On top of the candles, sharing the price scale
    Price,
    /// In its own panel below the candles
    Separate,
}

impl Pane {
    pub fn for_config(config: &IndicatorConfig) -> Self {
        match config {
            IndicatorConfig::Ma(_) | IndicatorConfig::Ema(_) | IndicatorConfig::Boll(_) | IndicatorConfig::Vwap => {
                Pane::Price
            }
            _ => Pane::Separate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OverlayLine {
    pub name: String,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Overlay {
    pub slot: usize,
    pub label: String,
    pub pane: Pane,
    pub lines: Vec<OverlayLine>,
}

fn line<T>(name: &str, points: &[T], value: impl Fn(&T) -> Point) -> OverlayLine {
    OverlayLine {
        name: name.to_string(),
        points: points.iter().map(value).collect(),
    }
}

impl IndicatorSeries {
    /// Split the series into single-value lines.
    ///
    /// `name` labels the single line of a [`IndicatorSeries::Line`].
    pub fn into_lines(self, name: &str) -> Vec<OverlayLine> {
        match self {
            IndicatorSeries::Line(points) => vec![OverlayLine { name: name.to_string(), points }],
            IndicatorSeries::Macd(points) => vec![
                line("macd", &points, |p| Point { time: p.time, value: p.macd }),
                line("signal", &points, |p| Point { time: p.time, value: p.signal }),
                line("histogram", &points, |p| Point { time: p.time, value: p.histogram }),
            ],
            IndicatorSeries::Boll(points) => vec![
                line("upper", &points, |p| Point { time: p.time, value: p.upper }),
                line("middle", &points, |p| Point { time: p.time, value: p.middle }),
                line("lower", &points, |p| Point { time: p.time, value: p.lower }),
            ],
            IndicatorSeries::Kdj(points) => vec![
                line("k", &points, |p| Point { time: p.time, value: p.k }),
                line("d", &points, |p| Point { time: p.time, value: p.d }),
                line("j", &points, |p| Point { time: p.time, value: p.j }),
            ],
            IndicatorSeries::Volume(points) => {
                vec![line("volume", &points, |p| Point { time: p.time, value: p.value })]
            }
        }
    }
}

/// Compute every slot over the same candles.
///
/// The slot index is the position in `slots`. The first invalid configuration
/// aborts the whole set.
pub fn build_overlays(candles: &[Candle], slots: &[IndicatorConfig]) -> Result<Vec<Overlay>, IndicatorError> {
    slots
        .iter()
        .enumerate()
        .map(|(slot, config)| {
            let series = config.compute(candles)?;
            Ok(Overlay {
                slot,
                label: config.to_string(),
                pane: Pane::for_config(config),
                lines: series.into_lines(&config.name().to_ascii_lowercase()),
            })
        })
        .collect()
}

/// Overlays shown on a fresh chart
pub fn default_overlays() -> Vec<IndicatorConfig> {
    vec![
        IndicatorConfig::Ma(MaParams { period: 20 }),
        IndicatorConfig::Ema(EmaParams { period: 50 }),
        IndicatorConfig::Boll(BollParams::default()),
        IndicatorConfig::Vol,
        IndicatorConfig::Macd(MacdParams::default()),
        IndicatorConfig::Rsi(RsiParams::default()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KdjParams;
    use crate::test_util::from_closes;

    #[test]
    fn test_slots_follow_position() {
        let closes: Vec<f64> = (1..=40).map(|x| x as f64).collect();
        let candles = from_closes(&closes);
        let overlays = build_overlays(&candles, &default_overlays()).unwrap();

        assert_eq!(overlays.len(), 6);
        for (i, overlay) in overlays.iter().enumerate() {
            assert_eq!(overlay.slot, i);
        }
        assert_eq!(overlays[0].label, "MA(20)");
        assert_eq!(overlays[0].pane, Pane::Price);
        assert_eq!(overlays[0].lines[0].name, "ma");
        assert_eq!(overlays[0].lines[0].points.len(), 21);
        // EMA(50) has no output on 40 candles but still occupies its slot
        assert!(overlays[1].lines[0].points.is_empty());
        assert_eq!(overlays[3].lines[0].name, "volume");
        assert_eq!(overlays[5].pane, Pane::Separate);
    }

    #[test]
    fn test_multi_field_lines() {
        let closes: Vec<f64> = (1..=40).map(|x| (x as f64).sqrt()).collect();
        let candles = from_closes(&closes);
        let slots = [IndicatorConfig::Macd(MacdParams::default()), IndicatorConfig::Kdj(KdjParams::default())];
        let overlays = build_overlays(&candles, &slots).unwrap();

        let names: Vec<&str> = overlays[0].lines.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["macd", "signal", "histogram"]);
        let names: Vec<&str> = overlays[1].lines.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["k", "d", "j"]);
        assert_eq!(overlays[0].lines[0].points.len(), overlays[0].lines[2].points.len());
    }

    #[test]
    fn test_invalid_slot_aborts() {
        let candles = from_closes(&[1.0; 5]);
        let slots = [IndicatorConfig::Vol, IndicatorConfig::Ma(MaParams { period: 0 })];
        assert!(build_overlays(&candles, &slots).is_err());
    }
}
