//! Core data models for photo indexing and search.
//!
//! `photo` holds the document stored in the index and the summary returned to
//! callers; `events` holds the trigger payloads and responses exchanged with
//! the invoking platform. Everything serializes as JSON via `serde`.

pub mod events;
pub mod photo;
