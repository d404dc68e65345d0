//! Song CRUD API handlers
//!
//! GET/POST /api/songs, GET/PUT/DELETE /api/songs/:id

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::Value;

use crate::api::negotiate;
use crate::db::songs::UpdateOutcome;
use crate::error::{ApiError, ApiResult};
use crate::{db, uploads, validate, AppState};

/// GET /api/songs
///
/// All songs with their files, ascending id order.
pub async fn list_songs(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let songs = db::songs::list_songs(&state.db).await?;
    Ok(Json(songs))
}

/// GET /api/songs/:id
pub async fn get_song(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let song = db::songs::get_song(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Could not find song with id {}", id)))?;

    Ok(Json(song))
}

/// POST /api/songs
///
/// Creates a song referencing an existing file. 422 on a malformed body,
/// 404 when the referenced file does not exist.
pub async fn create_song(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<impl IntoResponse> {
    let body = validate::song_body(&body)?;

    let song = db::songs::create_song(&state.db, body.file.id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Could not find file with id {}", body.file.id))
        })?;

    tracing::info!(song_id = song.id, file_id = song.file.id, "Song created");

    Ok((StatusCode::CREATED, Json(song)))
}

/// PUT /api/songs/:id
///
/// Repoints the song at a different file.
pub async fn update_song(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> ApiResult<impl IntoResponse> {
    let body = validate::song_body(&body)?;

    match db::songs::update_song(&state.db, id, body.file.id).await? {
        UpdateOutcome::Updated(song) => {
            tracing::info!(song_id = song.id, file_id = song.file.id, "Song updated");
            Ok(Json(song))
        }
        UpdateOutcome::SongMissing => Err(ApiError::NotFound(format!(
            "Could not find song with id {}",
            id
        ))),
        UpdateOutcome::FileMissing => Err(ApiError::NotFound(format!(
            "Could not find file with id {}",
            body.file.id
        ))),
    }
}

/// DELETE /api/songs/:id
///
/// Deletes the song and the file it references, returning a snapshot of
/// the deleted song. The uploaded bytes are removed best-effort once the
/// rows are gone.
pub async fn delete_song(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let deleted = db::songs::delete_song(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Could not find song with id {}", id)))?;

    if deleted.file_row_deleted {
        let path = uploads::upload_path(&state.config.uploads_dir(), Some(&deleted.song.file.name));
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Failed to remove uploaded bytes");
            }
        }
    }

    tracing::info!(song_id = id, "Song deleted");

    Ok(Json(deleted.song))
}

/// Build song CRUD routes
///
/// Read routes carry the Accept guard; body-carrying routes additionally
/// require a JSON content type.
pub fn song_routes() -> Router<AppState> {
    let reads = Router::new()
        .route("/api/songs", get(list_songs))
        .route("/api/songs/:id", get(get_song))
        .route_layer(middleware::from_fn(negotiate::accept_json));

    let writes = Router::new()
        .route("/api/songs", post(create_song))
        .route("/api/songs/:id", put(update_song).delete(delete_song))
        .route_layer(middleware::from_fn(negotiate::require_json))
        .route_layer(middleware::from_fn(negotiate::accept_json));

    reads.merge(writes)
}
