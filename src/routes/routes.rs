//! Defines routes for the local development server.
//!
//! ## Structure
//! - `GET     /healthz` — liveness
//! - `GET     /readyz`  — credentials + index reachability
//! - `GET     /search`  — natural-language search (`?q=`)
//! - `OPTIONS /search`  — CORS preflight
//! - `POST    /index`   — ingest an S3 notification batch

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        photo_handlers::{index_photos, search_photos, search_preflight},
    },
    services::AppState,
};
use axum::{
    Router,
    routing::{get, post},
};

/// Build and return the router for the photo endpoints.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/search", get(search_photos).options(search_preflight))
        .route("/index", post(index_photos))
}
