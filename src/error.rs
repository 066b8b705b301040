use thiserror::Error;

/// Rejected indicator configuration.
///
/// Raw indicator functions never return these: they treat unusable periods
/// as insufficient data. Only the typed configuration layer validates.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("{indicator}: {param} must be at least {min}, got {value}")]
    ParameterTooSmall {
        indicator: &'static str,
        param: &'static str,
        min: usize,
        value: usize,
    },

    #[error("{indicator}: {param} must be a finite, non-negative number, got {value}")]
    InvalidMultiplier {
        indicator: &'static str,
        param: &'static str,
        value: f64,
    },

    #[error("unknown indicator: {0}")]
    UnknownIndicator(String),

    #[error("invalid parameter list for {indicator}: {reason}")]
    InvalidParameters { indicator: String, reason: String },
}

/// Failure while reading candles from JSON or parquet.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("missing column: {0}")]
    MissingColumn(String),

    #[error("unsupported type for column {column}: {data_type}")]
    UnsupportedColumn { column: String, data_type: String },

    #[error("unparsable timestamp: {0}")]
    BadTimestamp(String),

    #[error("unparsable kline row {index}: {reason}")]
    BadKline { index: usize, reason: String },

    #[error("candle {index} is not after its predecessor (time {time})")]
    OutOfOrder { index: usize, time: i64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),
}
