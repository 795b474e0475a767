//! Trigger payloads and responses exchanged with the invoking platform.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::photo::SearchResults;

/// CORS headers attached to every query response.
pub const CORS_HEADERS: [(&str, &str); 4] = [
    ("Access-Control-Allow-Origin", "*"),
    (
        "Access-Control-Allow-Headers",
        "Content-Type, X-Amz-Date, Authorization, X-Api-Key, x-amz-meta-customLabels, x-api-key",
    ),
    ("Access-Control-Allow-Methods", "OPTIONS,GET,PUT,POST,DELETE"),
    ("Access-Control-Max-Age", "3600"),
];

pub const INGEST_COMPLETE: &str = "Photo indexing complete!";

/// S3 "object created" notification batch.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct S3Notification {
    #[serde(rename = "Records", default)]
    pub records: Vec<NotificationRecord>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct NotificationRecord {
    pub s3: S3Entity,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct S3Object {
    /// Key exactly as delivered by the notification (not URL-decoded).
    pub key: String,
}

impl NotificationRecord {
    pub fn bucket(&self) -> &str {
        &self.s3.bucket.name
    }

    pub fn key(&self) -> &str {
        &self.s3.object.key
    }
}

/// Response returned to the storage trigger once a batch has been attempted.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    pub status_code: u16,
    pub body: String,
}

impl IngestResponse {
    pub fn complete() -> Self {
        Self {
            status_code: 200,
            body: INGEST_COMPLETE.to_string(),
        }
    }
}

/// HTTP-style query event.
///
/// API Gateway delivers `queryStringParameters` (possibly `null`); direct
/// invocations may carry a flat `q`. Both are kept as raw JSON so an odd
/// shape never fails deserialization. All other fields are ignored.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchEvent {
    #[serde(default)]
    pub query_string_parameters: Option<Value>,

    #[serde(default)]
    pub q: Option<Value>,
}

impl SearchEvent {
    /// The non-empty query text.
    ///
    /// A present parameter map is authoritative; the flat field is consulted
    /// only when the map is absent or `null`. Non-string values count as no
    /// query.
    pub fn query(&self) -> Option<&str> {
        let raw = match &self.query_string_parameters {
            Some(Value::Null) | None => self.q.as_ref(),
            Some(params) => params.get("q"),
        };
        raw.and_then(Value::as_str).filter(|q| !q.is_empty())
    }
}

/// API-Gateway proxy response carrying a JSON body string.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl ProxyResponse {
    pub fn ok(results: &SearchResults) -> Self {
        let headers = CORS_HEADERS
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        // Serializing plain strings and vectors cannot fail.
        let body = serde_json::to_string(results).unwrap_or_else(|_| r#"{"results":[]}"#.into());

        Self {
            status_code: 200,
            headers,
            body,
        }
    }
}
