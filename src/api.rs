//! HTTP service
//!
//! Serves candles from a directory of `{symbol}.parquet` files and computes
//! indicators and chart overlays, either over those files or over candles
//! posted in the request body.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn};

use crate::config::{parse_list, IndicatorConfig, IndicatorSeries};
use crate::error::{IndicatorError, LoadError};
use crate::loader::{ensure_ascending, list_symbols, read_parquet, tail};
use crate::overlay::{build_overlays, default_overlays, Overlay};
use crate::settings::ServerConfig;
use crate::types::Candle;

// ============================================================================
// State & Errors
// ============================================================================

pub struct AppState {
    pub candle_dir: PathBuf,
    pub body_limit_bytes: usize,
}

impl AppState {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            candle_dir: config.candle_dir.clone(),
            body_limit_bytes: config.body_limit_bytes,
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<IndicatorError> for ApiError {
    fn from(e: IndicatorError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

/// Undecodable bodies, including malformed indicator configurations, map to 400.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Read `{symbol}.parquet` off the runtime's worker threads.
///
/// A stored file with out-of-order times is a server-side data fault (500).
async fn load_symbol(state: &AppState, symbol: &str) -> Result<Vec<Candle>, ApiError> {
    if !is_valid_symbol(symbol) {
        return Err(ApiError::BadRequest(format!("invalid symbol: {symbol:?}")));
    }

    let path = state.candle_dir.join(format!("{symbol}.parquet"));
    let loaded = tokio::task::spawn_blocking(move || {
        let candles = read_parquet(&path)?;
        ensure_ascending(&candles)?;
        Ok::<_, LoadError>(candles)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("candle loader failed: {e}")))?;

    loaded.map_err(|e| match e {
        LoadError::Io(ref io) if io.kind() == std::io::ErrorKind::NotFound => {
            ApiError::NotFound(format!("unknown symbol: {symbol}"))
        }
        other => {
            warn!(symbol, error = %other, "failed to read candles");
            ApiError::Internal(other.to_string())
        }
    })
}

/// Posted candles must already be in ascending time order.
fn check_posted(candles: &[Candle]) -> Result<(), ApiError> {
    ensure_ascending(candles).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Symbols map straight to file names, so only plain names are accepted.
fn is_valid_symbol(symbol: &str) -> bool {
    !symbol.is_empty()
        && !symbol.starts_with('.')
        && symbol.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    server_time: i64,
}

#[derive(Serialize)]
struct SymbolListResponse {
    symbols: Vec<String>,
    count: usize,
}

#[derive(Deserialize)]
struct WindowQuery {
    limit: Option<usize>,
    indicators: Option<String>,
}

#[derive(Serialize)]
struct CandlesResponse {
    symbol: String,
    candles: Vec<Candle>,
}

#[derive(Serialize)]
struct SymbolOverlaysResponse {
    symbol: String,
    bars: usize,
    overlays: Vec<Overlay>,
    compute_ms: f64,
}

#[derive(Deserialize)]
struct ComputeRequest {
    candles: Vec<Candle>,
    indicators: Vec<IndicatorConfig>,
}

#[derive(Serialize)]
struct ComputeResult {
    label: String,
    config: IndicatorConfig,
    series: IndicatorSeries,
}

#[derive(Serialize)]
struct ComputeResponse {
    results: Vec<ComputeResult>,
    compute_ms: f64,
}

#[derive(Deserialize)]
struct OverlaysRequest {
    candles: Vec<Candle>,
    slots: Vec<IndicatorConfig>,
}

#[derive(Serialize)]
struct OverlaysResponse {
    overlays: Vec<Overlay>,
    compute_ms: f64,
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

async fn get_symbols(State(state): State<Arc<AppState>>) -> Result<Json<SymbolListResponse>, ApiError> {
    let symbols = list_symbols(&state.candle_dir).map_err(|e| {
        warn!(dir = %state.candle_dir.display(), error = %e, "failed to list symbols");
        ApiError::Internal(e.to_string())
    })?;
    let count = symbols.len();
    Ok(Json(SymbolListResponse { symbols, count }))
}

async fn get_candles(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<CandlesResponse>, ApiError> {
    let candles = load_symbol(&state, &symbol).await?;
    let window = tail(&candles, query.limit.unwrap_or(usize::MAX)).to_vec();
    Ok(Json(CandlesResponse { symbol, candles: window }))
}

async fn get_indicators(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<SymbolOverlaysResponse>, ApiError> {
    let slots = match query.indicators.as_deref() {
        Some(list) => parse_list(list)?,
        None => default_overlays(),
    };

    let candles = load_symbol(&state, &symbol).await?;
    let window = tail(&candles, query.limit.unwrap_or(usize::MAX));

    let start = Instant::now();
    let overlays = build_overlays(window, &slots)?;
    let compute_ms = elapsed_ms(start);

    debug!(symbol = %symbol, bars = window.len(), slots = slots.len(), compute_ms, "computed overlays");
    Ok(Json(SymbolOverlaysResponse {
        symbol,
        bars: window.len(),
        overlays,
        compute_ms,
    }))
}

async fn compute(payload: Result<Json<ComputeRequest>, JsonRejection>) -> Result<Json<ComputeResponse>, ApiError> {
    let Json(req) = payload?;
    check_posted(&req.candles)?;
    let start = Instant::now();

    let results = req
        .indicators
        .into_iter()
        .map(|config| {
            let series = config.compute(&req.candles)?;
            Ok(ComputeResult { label: config.to_string(), config, series })
        })
        .collect::<Result<Vec<_>, IndicatorError>>()?;

    let compute_ms = elapsed_ms(start);
    debug!(bars = req.candles.len(), indicators = results.len(), compute_ms, "computed indicators");
    Ok(Json(ComputeResponse { results, compute_ms }))
}

async fn overlays(payload: Result<Json<OverlaysRequest>, JsonRejection>) -> Result<Json<OverlaysResponse>, ApiError> {
    let Json(req) = payload?;
    check_posted(&req.candles)?;
    let start = Instant::now();
    let overlays = build_overlays(&req.candles, &req.slots)?;
    let compute_ms = elapsed_ms(start);

    debug!(bars = req.candles.len(), slots = overlays.len(), compute_ms, "computed overlays");
    Ok(Json(OverlaysResponse { overlays, compute_ms }))
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    info!(candle_dir = %state.candle_dir.display(), "building router");

    Router::new()
        .route("/health", get(health))
        .route("/symbols", get(get_symbols))
        .route("/candles/{symbol}", get(get_candles))
        .route("/indicators/{symbol}", get(get_indicators))
        .route("/compute", post(compute))
        .route("/overlays", post(overlays))
        .layer(DefaultBodyLimit::max(state.body_limit_bytes))
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{self, from_closes};
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("candle-indicators-api-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn app(dir: PathBuf) -> Router {
        router(Arc::new(AppState { candle_dir: dir, body_limit_bytes: 1024 * 1024 }))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn ramp(n: usize) -> Vec<Candle> {
        let closes: Vec<f64> = (1..=n).map(|x| x as f64).collect();
        from_closes(&closes)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(app(temp_dir("health")), get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body["server_time"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_symbols_and_candles() {
        let dir = temp_dir("symbols");
        test_util::write_parquet(&dir.join("BTCUSDT.parquet"), &ramp(30));
        test_util::write_parquet(&dir.join("ETHUSDT.parquet"), &ramp(10));
        std::fs::write(dir.join("notes.txt"), "not candles").unwrap();

        let (status, body) = send(app(dir.clone()), get_request("/symbols")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["symbols"], json!(["BTCUSDT", "ETHUSDT"]));
        assert_eq!(body["count"], 2);

        let (status, body) = send(app(dir.clone()), get_request("/candles/BTCUSDT?limit=5")).await;
        assert_eq!(status, StatusCode::OK);
        let candles = body["candles"].as_array().unwrap();
        assert_eq!(candles.len(), 5);
        assert_eq!(candles[0]["time"], 26);
        assert_eq!(candles[4]["close"], 30.0);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_unknown_and_invalid_symbols() {
        let dir = temp_dir("unknown");

        let (status, body) = send(app(dir.clone()), get_request("/candles/NOPE")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("NOPE"));

        let (status, _) = send(app(dir.clone()), get_request("/candles/..%2Fsecret")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_symbol_indicators() {
        let dir = temp_dir("indicators");
        test_util::write_parquet(&dir.join("AAA.parquet"), &ramp(60));

        let (status, body) =
            send(app(dir.clone()), get_request("/indicators/AAA?limit=40&indicators=ma:5;rsi:14")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["bars"], 40);
        let overlays = body["overlays"].as_array().unwrap();
        assert_eq!(overlays.len(), 2);
        assert_eq!(overlays[0]["label"], "MA(5)");
        assert_eq!(overlays[0]["lines"][0]["points"].as_array().unwrap().len(), 36);
        assert_eq!(overlays[1]["pane"], "separate");

        let (status, body) = send(app(dir.clone()), get_request("/indicators/AAA")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["overlays"].as_array().unwrap().len(), default_overlays().len());

        let (status, _) = send(app(dir.clone()), get_request("/indicators/AAA?indicators=ma:0")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(app(dir.clone()), get_request("/indicators/AAA?indicators=zigzag")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_compute() {
        let request = json!({
            "candles": ramp(10),
            "indicators": [
                {"type": "MA", "period": 3},
                {"type": "MACD", "fast": 2, "slow": 3, "signal": 2},
                {"type": "OBV"}
            ]
        });
        let (status, body) = send(app(temp_dir("compute")), post_json("/compute", request)).await;
        assert_eq!(status, StatusCode::OK);

        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0]["label"], "MA(3)");
        assert_eq!(results[0]["series"]["kind"], "line");
        assert_eq!(results[0]["series"]["points"].as_array().unwrap().len(), 8);
        assert_eq!(results[0]["series"]["points"][0]["value"], 2.0);
        assert_eq!(results[1]["series"]["kind"], "macd");
        assert!(results[1]["series"]["points"][0]["histogram"].as_f64().unwrap().abs() < 1e-9);
        assert_eq!(results[2]["config"]["type"], "OBV");
        assert!(body["compute_ms"].as_f64().unwrap() >= 0.0);
    }

    #[tokio::test]
    async fn test_compute_rejects_invalid_parameters() {
        let request = json!({
            "candles": ramp(10),
            "indicators": [{"type": "BOLL", "period": 20, "stdDev": -1.0}]
        });
        let (status, body) = send(app(temp_dir("invalid")), post_json("/compute", request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("BOLL"));
    }

    #[tokio::test]
    async fn test_malformed_config_is_bad_request() {
        let request = json!({
            "candles": ramp(10),
            "indicators": [{"type": "MA", "period": -1}]
        });
        let response = app(temp_dir("malformed")).oneshot(post_json("/compute", request)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["content-type"], "application/json");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string());

        let request = json!({"candles": ramp(10), "slots": [{"type": "ZIGZAG"}]});
        let (status, body) = send(app(temp_dir("malformed")), post_json("/overlays", request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_unsorted_candles_rejected() {
        let dir = temp_dir("unsorted");
        let times = [1, 4, 3, 2, 5];
        let candles: Vec<Candle> = times.iter().map(|&t| Candle::new(t, 1.0, 1.0, 1.0, 1.0, 1.0)).collect();
        test_util::write_parquet(&dir.join("UNSORTED.parquet"), &candles);

        let (status, body) = send(app(dir.clone()), get_request("/indicators/UNSORTED?indicators=ma:2")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("not after"));

        let (status, _) = send(app(dir.clone()), get_request("/candles/UNSORTED")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let request = json!({"candles": candles, "indicators": [{"type": "MA", "period": 2}]});
        let (status, _) = send(app(dir.clone()), post_json("/compute", request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let request = json!({"candles": candles, "slots": [{"type": "OBV"}]});
        let (status, _) = send(app(dir.clone()), post_json("/overlays", request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_overlays() {
        let request = json!({
            "candles": ramp(30),
            "slots": [{"type": "BOLL"}, {"type": "KDJ"}]
        });
        let (status, body) = send(app(temp_dir("overlays")), post_json("/overlays", request)).await;
        assert_eq!(status, StatusCode::OK);

        let overlays = body["overlays"].as_array().unwrap();
        assert_eq!(overlays[0]["slot"], 0);
        assert_eq!(overlays[0]["pane"], "price");
        assert_eq!(overlays[0]["lines"][0]["name"], "upper");
        assert_eq!(overlays[1]["slot"], 1);
        assert_eq!(overlays[1]["lines"][2]["name"], "j");
    }
}
