//! File upload API handlers
//!
//! POST /api/files accepts a multipart form with a `file` part and stores
//! its bytes in the uploads directory; GET /uploads/:filename serves them
//! back with a content type inferred from the name.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::api::negotiate;
use crate::error::{ApiError, ApiResult};
use crate::{db, uploads, AppState};

const MAX_UPLOAD_BYTES: usize = 256 * 1024 * 1024;

/// GET /uploads/:filename
///
/// Serves previously uploaded bytes. The filename goes through the same
/// sanitization as at upload time, so it resolves inside the uploads
/// directory or not at all.
pub async fn get_upload(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let path = uploads::upload_path(&state.config.uploads_dir(), Some(&filename));

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound(format!(
                "Could not find file {}",
                filename
            )));
        }
        Err(err) => return Err(err.into()),
    };

    let mime = mime_guess::from_path(&path).first_or_octet_stream();

    Ok(([(header::CONTENT_TYPE, mime.to_string())], bytes))
}

/// POST /api/files
///
/// Stores the `file` part of a multipart form and records it in the
/// catalog. 422 when the form has no usable file part.
pub async fn create_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let uploads_dir = state.config.uploads_dir();
    let mut stored_name: Option<String> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::Validation(format!("Could not read multipart body: {}", err)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let Some(original_name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let name = uploads::sanitize_filename(&original_name);

        // Stream to a temp name first so a half-received upload never
        // appears under its final name.
        let temp_path = uploads_dir.join(format!(".upload-{}", Uuid::new_v4()));
        let mut out = tokio::fs::File::create(&temp_path).await?;
        let write_result = async {
            while let Some(chunk) = field.chunk().await.map_err(|err| {
                ApiError::Validation(format!("Could not read multipart body: {}", err))
            })? {
                out.write_all(&chunk).await?;
            }
            out.flush().await?;
            Ok::<(), ApiError>(())
        }
        .await;

        if let Err(err) = write_result {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(err);
        }

        tokio::fs::rename(&temp_path, uploads::upload_path(&uploads_dir, Some(&name))).await?;
        stored_name = Some(name);
        break;
    }

    let name = stored_name
        .ok_or_else(|| ApiError::Validation("Could not find file in request".to_string()))?;

    let file = db::files::create_file(&state.db, &name).await?;

    tracing::info!(file_id = file.id, name = %file.name, "File uploaded");

    Ok((StatusCode::CREATED, Json(file)))
}

/// Build upload routes
pub fn upload_routes() -> Router<AppState> {
    let serve = Router::new().route("/uploads/:filename", get(get_upload));

    let upload = Router::new()
        .route("/api/files", post(create_file))
        .route_layer(middleware::from_fn(negotiate::require_multipart))
        .route_layer(middleware::from_fn(negotiate::accept_json))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES));

    serve.merge(upload)
}
