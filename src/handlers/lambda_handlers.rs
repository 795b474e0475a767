//! Lambda entry points for the two handlers.
//!
//! Neither handler ever returns an error to the runtime: ingest always reports
//! completion and search always answers 200 with a (possibly empty) list.

use crate::{
    models::{
        events::{IngestResponse, ProxyResponse, S3Notification, SearchEvent},
        photo::SearchResults,
    },
    services::{ingest_service::IngestService, search_service::SearchService},
};
use lambda_runtime::{Error, LambdaEvent};
use tracing::{debug, info};

/// Storage notification → indexed documents.
pub async fn index_photos(
    service: &IngestService,
    event: LambdaEvent<S3Notification>,
) -> Result<IngestResponse, Error> {
    info!(request_id = %event.context.request_id, "index handler triggered");
    debug!(payload = ?event.payload, "received event");

    service.process_batch(&event.payload).await;
    Ok(IngestResponse::complete())
}

/// Query event → API-Gateway proxy response with CORS headers.
pub async fn search_photos(
    service: &SearchService,
    event: LambdaEvent<SearchEvent>,
) -> Result<ProxyResponse, Error> {
    info!(request_id = %event.context.request_id, "search handler triggered");
    debug!(payload = ?event.payload, "received event");

    let results = match event.payload.query() {
        Some(query) => service.search(query).await,
        None => SearchResults::empty(),
    };

    Ok(ProxyResponse::ok(&results))
}
