//! HTTP server for candle indicators
//!
//! Run: CANDLE_DIR=./data/candles cargo run --release --bin server
//!
//! Settings come from the environment (or a `.env` file): INDICATORS_HOST,
//! INDICATORS_PORT, CANDLE_DIR and INDICATORS_BODY_LIMIT_MB.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use candle_indicators::api::{router, AppState};
use candle_indicators::logging::init_tracing;
use candle_indicators::settings::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing("info");

    let config = ServerConfig::from_env()?;
    let addr = config.addr();
    let app = router(Arc::new(AppState::from_config(&config)));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    info!(%addr, candle_dir = %config.candle_dir.display(), "candle indicators server listening");
    info!("  GET  /health");
    info!("  GET  /symbols              - list symbols");
    info!("  GET  /candles/{{symbol}}     - OHLCV data");
    info!("  GET  /indicators/{{symbol}}  - overlays for a symbol");
    info!("  POST /compute              - compute indicators over posted candles");
    info!("  POST /overlays             - chart overlays over posted candles");

    axum::serve(listener, app).await?;
    Ok(())
}
