//! CLI tool for computing indicators over a candle file
//!
//! Usage: indicators [--input FILE | --parquet FILE] [--limit N] [--overlays] SPEC...
//!
//! Specs look like `ma:20`, `macd:12,26,9` or `boll:20,2.5`. Candles are read
//! as JSON from stdin when no file is given. Output is JSON on stdout.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use candle_indicators::loader::{candles_from_json, ensure_ascending, read_parquet, tail};
use candle_indicators::logging::init_tracing;
use candle_indicators::{build_overlays, Candle, IndicatorConfig, IndicatorSeries};

#[derive(Parser)]
#[command(name = "indicators", about = "Compute technical indicators over OHLCV candles")]
struct Cli {
    /// JSON candle file: an array of candle objects or kline rows.
    #[arg(long, conflicts_with = "parquet")]
    input: Option<PathBuf>,

    /// Parquet candle file.
    #[arg(long)]
    parquet: Option<PathBuf>,

    /// Only use the last N candles.
    #[arg(long)]
    limit: Option<usize>,

    /// Emit chart overlays (named lines per slot) instead of raw series.
    #[arg(long, default_value_t = false)]
    overlays: bool,

    /// Pretty-print the JSON output.
    #[arg(long, default_value_t = false)]
    pretty: bool,

    /// Indicator specs, e.g. ma:20 rsi:14 macd:12,26,9 boll:20,2.5 vwap.
    #[arg(required = true)]
    specs: Vec<IndicatorConfig>,
}

#[derive(Serialize)]
struct SeriesOutput {
    label: String,
    config: IndicatorConfig,
    series: IndicatorSeries,
}

fn load_candles(cli: &Cli) -> Result<Vec<Candle>> {
    let candles = match (&cli.parquet, &cli.input) {
        (Some(path), _) => read_parquet(path).with_context(|| format!("reading {}", path.display()))?,
        (None, Some(path)) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            candles_from_json(BufReader::new(file)).with_context(|| format!("reading {}", path.display()))?
        }
        (None, None) => candles_from_json(io::stdin().lock()).context("reading candles from stdin")?,
    };
    ensure_ascending(&candles)?;
    Ok(candles)
}

fn write_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let mut out = io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, value)?;
    } else {
        serde_json::to_writer(&mut out, value)?;
    }
    writeln!(out)?;
    Ok(())
}

fn main() -> Result<()> {
    init_tracing("warn");
    let cli = Cli::parse();

    let all = load_candles(&cli)?;
    let candles = tail(&all, cli.limit.unwrap_or(usize::MAX));
    info!(candles = candles.len(), indicators = cli.specs.len(), "computing");

    if cli.overlays {
        let overlays = build_overlays(candles, &cli.specs)?;
        return write_json(&overlays, cli.pretty);
    }

    let outputs = cli
        .specs
        .iter()
        .map(|config| {
            Ok(SeriesOutput {
                label: config.to_string(),
                config: *config,
                series: config.compute(candles)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    write_json(&outputs, cli.pretty)
}
