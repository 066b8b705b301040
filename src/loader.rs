// src/loader.rs
// Candle input: JSON (candle objects or exchange kline rows) and parquet files

use std::fs::File;
use std::io::Read;
use std::path::Path;

use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::LoadError;
use crate::types::{Candle, Timestamp};

// ============================================================================
// JSON
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCandle {
    Object(Candle),
    /// `[openTime, "open", "high", "low", "close", "volume", ...]`
    Kline(Vec<Value>),
}

fn kline_number(row: &[Value], field: usize, index: usize) -> Result<f64, LoadError> {
    let bad = |reason: String| LoadError::BadKline { index, reason };
    match row.get(field) {
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| bad(format!("field {field} out of range"))),
        Some(Value::String(s)) => s.parse().map_err(|_| bad(format!("field {field} is not numeric: {s:?}"))),
        Some(other) => Err(bad(format!("field {field} is not numeric: {other}"))),
        None => Err(bad(format!("missing field {field}"))),
    }
}

fn kline_to_candle(row: &[Value], index: usize) -> Result<Candle, LoadError> {
    let time = row
        .first()
        .and_then(Value::as_i64)
        .ok_or_else(|| LoadError::BadKline { index, reason: "open time is not an integer".to_string() })?;

    Ok(Candle {
        time,
        open: kline_number(row, 1, index)?,
        high: kline_number(row, 2, index)?,
        low: kline_number(row, 3, index)?,
        close: kline_number(row, 4, index)?,
        volume: kline_number(row, 5, index)?,
    })
}

/// Read a JSON array of candles.
///
/// Elements may be candle objects or exchange kline rows; the two can mix.
pub fn candles_from_json<R: Read>(reader: R) -> Result<Vec<Candle>, LoadError> {
    let raw: Vec<RawCandle> = serde_json::from_reader(reader)?;
    raw.into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            RawCandle::Object(candle) => Ok(candle),
            RawCandle::Kline(row) => kline_to_candle(&row, index),
        })
        .collect()
}

// ============================================================================
// Parquet
// ============================================================================

const TIME_COLUMNS: &[&str] = &["time", "Time", "timestamp", "open_time", "Date", "date"];

fn find_column<'a>(batch: &'a RecordBatch, names: &[&str]) -> Option<&'a ArrayRef> {
    names.iter().find_map(|name| batch.column_by_name(name))
}

/// Parse `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` or RFC 3339 into epoch ms (UTC)
pub fn parse_timestamp(s: &str) -> Result<Timestamp, LoadError> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.timestamp_millis());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.and_utc().timestamp_millis());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
        .ok_or_else(|| LoadError::BadTimestamp(s.to_string()))
}

fn int_values(array: &ArrayRef, column: &str) -> Result<Vec<Timestamp>, LoadError> {
    let ints = cast(array.as_ref(), &DataType::Int64)?;
    let arr = ints
        .as_any()
        .downcast_ref::<Int64Array>()
        .ok_or_else(|| LoadError::UnsupportedColumn { column: column.to_string(), data_type: "Int64".to_string() })?;

    (0..arr.len())
        .map(|i| {
            if arr.is_null(i) {
                Err(LoadError::BadTimestamp(format!("null {column} at row {i}")))
            } else {
                Ok(arr.value(i))
            }
        })
        .collect()
}

fn time_values(batch: &RecordBatch) -> Result<Vec<Timestamp>, LoadError> {
    let col = find_column(batch, TIME_COLUMNS).ok_or_else(|| LoadError::MissingColumn("time".to_string()))?;

    match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
            let strings = cast(col.as_ref(), &DataType::Utf8)?;
            let arr = strings.as_any().downcast_ref::<StringArray>().ok_or_else(|| {
                LoadError::UnsupportedColumn { column: "time".to_string(), data_type: col.data_type().to_string() }
            })?;
            (0..arr.len())
                .map(|i| {
                    if arr.is_null(i) {
                        Err(LoadError::BadTimestamp(format!("null time at row {i}")))
                    } else {
                        parse_timestamp(arr.value(i))
                    }
                })
                .collect()
        }
        DataType::Timestamp(_, _) => {
            let millis = cast(col.as_ref(), &DataType::Timestamp(TimeUnit::Millisecond, None))?;
            int_values(&millis, "time")
        }
        DataType::Date32 | DataType::Date64 => {
            let millis = cast(col.as_ref(), &DataType::Date64)?;
            int_values(&millis, "time")
        }
        dt if dt.is_integer() => int_values(col, "time"),
        other => Err(LoadError::UnsupportedColumn { column: "time".to_string(), data_type: other.to_string() }),
    }
}

fn f64_values(batch: &RecordBatch, names: &[&str], null_value: f64) -> Result<Vec<f64>, LoadError> {
    let col = find_column(batch, names).ok_or_else(|| LoadError::MissingColumn(names[0].to_string()))?;
    let floats = cast(col.as_ref(), &DataType::Float64)?;
    let arr = floats.as_any().downcast_ref::<Float64Array>().ok_or_else(|| LoadError::UnsupportedColumn {
        column: names[0].to_string(),
        data_type: col.data_type().to_string(),
    })?;

    Ok((0..arr.len())
        .map(|i| if arr.is_null(i) { null_value } else { arr.value(i) })
        .collect())
}

fn candles_from_batch(batch: &RecordBatch) -> Result<Vec<Candle>, LoadError> {
    let times = time_values(batch)?;
    let opens = f64_values(batch, &["open", "Open"], f64::NAN)?;
    let highs = f64_values(batch, &["high", "High"], f64::NAN)?;
    let lows = f64_values(batch, &["low", "Low"], f64::NAN)?;
    let closes = f64_values(batch, &["close", "Close"], f64::NAN)?;
    let volumes = f64_values(batch, &["volume", "Volume"], 0.0)?;

    Ok((0..batch.num_rows())
        .map(|i| Candle {
            time: times[i],
            open: opens[i],
            high: highs[i],
            low: lows[i],
            close: closes[i],
            volume: volumes[i],
        })
        .collect())
}

/// Read OHLCV candles from a parquet file.
///
/// Column names may be lower-case or capitalised. Missing prices read as
/// NaN and missing volume as 0.
pub fn read_parquet(path: &Path) -> Result<Vec<Candle>, LoadError> {
    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut candles = Vec::new();
    for batch in reader {
        candles.extend(candles_from_batch(&batch?)?);
    }

    debug!(path = %path.display(), count = candles.len(), "read parquet candles");
    Ok(candles)
}

/// File stems of every `.parquet` file in `dir`, sorted
pub fn list_symbols(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut symbols: Vec<String> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let path = e.path();
            if path.extension().is_some_and(|ext| ext == "parquet") {
                path.file_stem().and_then(|s| s.to_str()).map(|s| s.to_string())
            } else {
                None
            }
        })
        .collect();
    symbols.sort();
    Ok(symbols)
}

// ============================================================================
// Window helpers
// ============================================================================

/// Check that times strictly increase.
///
/// Indicators assume ascending input and never check it themselves.
pub fn ensure_ascending(candles: &[Candle]) -> Result<(), LoadError> {
    match candles.windows(2).position(|w| w[1].time <= w[0].time) {
        Some(i) => Err(LoadError::OutOfOrder { index: i + 1, time: candles[i + 1].time }),
        None => Ok(()),
    }
}

/// The last `limit` candles
pub fn tail(candles: &[Candle], limit: usize) -> &[Candle] {
    &candles[candles.len().saturating_sub(limit)..]
}
