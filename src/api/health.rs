//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::error::ApiResult;
use crate::{db, AppState};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_seconds: u64,
    /// Catalog size, for quick diagnostics
    pub songs: i64,
    pub files: i64,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    let uptime_seconds = uptime.num_seconds().max(0) as u64;

    let songs = db::songs::count_songs(&state.db).await?;
    let files = db::files::count_files(&state.db).await?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        service: "tunedex".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        songs,
        files,
    }))
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
