//! Content negotiation guards
//!
//! Header checks composed around route handlers via
//! `axum::middleware::from_fn`. Each guard short-circuits with a JSON
//! error before the handler runs; none of them touch the body.

use axum::{extract::Request, http::header, middleware::Next, response::Response};

use crate::error::ApiError;

const JSON: &str = "application/json";
const MULTIPART: &str = "multipart/form-data";

/// Reject with 406 unless the client accepts JSON responses
pub async fn accept_json(request: Request, next: Next) -> Result<Response, ApiError> {
    let acceptable = match request.headers().get(header::ACCEPT) {
        // An absent Accept header accepts anything
        None => true,
        Some(value) => value
            .to_str()
            .map(|value| accepts(value, JSON))
            .unwrap_or(false),
    };

    if !acceptable {
        return Err(ApiError::NotAcceptable(
            "Request must accept application/json data".to_string(),
        ));
    }

    Ok(next.run(request).await)
}

/// Reject with 415 unless the request body is JSON
pub async fn require_json(request: Request, next: Next) -> Result<Response, ApiError> {
    if !content_type_is(&request, JSON) {
        return Err(ApiError::UnsupportedMediaType(
            "Request must contain application/json data".to_string(),
        ));
    }

    Ok(next.run(request).await)
}

/// Reject with 415 unless the request body is a multipart form
pub async fn require_multipart(request: Request, next: Next) -> Result<Response, ApiError> {
    if !content_type_is(&request, MULTIPART) {
        return Err(ApiError::UnsupportedMediaType(
            "Request must contain multipart/form-data".to_string(),
        ));
    }

    Ok(next.run(request).await)
}

/// Whether an Accept header value admits `mime`
///
/// Matches the exact type, the `type/*` wildcard, or `*/*`; media-type
/// parameters (`;q=...`) are ignored.
fn accepts(accept: &str, mime: &str) -> bool {
    let wildcard = mime
        .split_once('/')
        .map(|(ty, _)| format!("{ty}/*"))
        .unwrap_or_default();

    accept
        .split(',')
        .map(|item| item.split(';').next().unwrap_or("").trim())
        .any(|essence| {
            essence.eq_ignore_ascii_case(mime)
                || essence.eq_ignore_ascii_case(&wildcard)
                || essence == "*/*"
        })
}

fn content_type_is(request: &Request, mime: &str) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .split(';')
                .next()
                .unwrap_or("")
                .trim()
                .eq_ignore_ascii_case(mime)
        })
        .unwrap_or(false)
}
