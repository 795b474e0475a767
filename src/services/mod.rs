//! Outbound integrations and the two handler pipelines built on them.

pub mod ingest_service;
pub mod intent;
pub mod labels;
pub mod metadata;
pub mod search_index;
pub mod search_service;
pub mod signing;

use ingest_service::IngestService;
use search_service::SearchService;

/// Shared state handed to every HTTP handler.
#[derive(Clone)]
pub struct AppState {
    pub ingest: IngestService,
    pub search: SearchService,
}
