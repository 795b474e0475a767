//! HTTP handlers for the local development server.
//! Mirror the Lambda handlers so both pipelines can be exercised over plain HTTP.

use crate::{
    errors::AppError,
    models::events::{CORS_HEADERS, IngestResponse, S3Notification},
    services::AppState,
};
use axum::{
    Json,
    extract::{RawQuery, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;

/// First `q` parameter of a raw query string.
///
/// Decoding is lossy: bad percent escapes stay literal and repeated or
/// value-less keys are tolerated, so no query string is ever rejected.
fn query_text(raw: Option<&str>) -> String {
    raw.and_then(|raw| {
        form_urlencoded::parse(raw.as_bytes())
            .find(|(key, _)| key == "q")
            .map(|(_, value)| value.into_owned())
    })
    .unwrap_or_default()
}

/// `GET /search?q=...`
///
/// Always 200; failures surface as an empty `results` array.
pub async fn search_photos(State(state): State<AppState>, RawQuery(raw): RawQuery) -> Response {
    let query = query_text(raw.as_deref());
    let results = state.search.search(&query).await;

    (StatusCode::OK, cors_headers(), Json(results)).into_response()
}

/// `OPTIONS /search` — CORS preflight.
pub async fn search_preflight() -> Response {
    (StatusCode::OK, cors_headers()).into_response()
}

/// `POST /index` — body is an S3 notification batch.
pub async fn index_photos(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<IngestResponse>, AppError> {
    let event: S3Notification = serde_json::from_slice(&body)?;
    state.ingest.process_batch(&event).await;
    Ok(Json(IngestResponse::complete()))
}

fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in CORS_HEADERS {
        if let Ok(name) = HeaderName::from_bytes(name.as_bytes()) {
            headers.insert(name, HeaderValue::from_static(value));
        }
    }
    headers
}
