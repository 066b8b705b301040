use crate::types::Candle;

/// Candles with `open == high == low == close`, unit volume and times `1, 2, 3, ...`
pub fn from_closes(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Candle::new(i as i64 + 1, c, c, c, c, 1.0))
        .collect()
}

/// Candles from `(high, low, close, volume)` rows; open equals close.
pub fn from_hlcv(rows: &[(f64, f64, f64, f64)]) -> Vec<Candle> {
    rows.iter()
        .enumerate()
        .map(|(i, &(h, l, c, v))| Candle::new(i as i64 + 1, c, h, l, c, v))
        .collect()
}

pub const EPSILON: f64 = 1e-10;

pub fn assert_approx_eq(a: f64, b: f64) {
    if a.is_nan() && b.is_nan() {
        return;
    }
    assert!((a - b).abs() < EPSILON, "Values differ: {} vs {}", a, b);
}

/// Write candles to a parquet file with lower-case OHLCV columns and an
/// Int64 `time` column.
pub fn write_parquet(path: &std::path::Path, candles: &[Candle]) {
    use arrow::array::{ArrayRef, Float64Array, Int64Array};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use std::sync::Arc;

    let floats = |f: fn(&Candle) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from(candles.iter().map(f).collect::<Vec<f64>>()))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("time", DataType::Int64, false),
        Field::new("open", DataType::Float64, false),
        Field::new("high", DataType::Float64, false),
        Field::new("low", DataType::Float64, false),
        Field::new("close", DataType::Float64, false),
        Field::new("volume", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(candles.iter().map(|c| c.time).collect::<Vec<i64>>())) as ArrayRef,
            floats(|c| c.open),
            floats(|c| c.high),
            floats(|c| c.low),
            floats(|c| c.close),
            floats(|c| c.volume),
        ],
    )
    .unwrap();

    let file = std::fs::File::create(path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
}
