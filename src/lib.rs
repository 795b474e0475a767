//! Photo indexing and natural-language photo search.
//!
//! Two stateless handlers share one search index: the ingest handler labels
//! newly stored photos and writes them into the index, and the search handler
//! turns free text into label keywords and queries the index.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
