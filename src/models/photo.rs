//! Represents a photo as it is stored in, and returned from, the search index.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The document written into the `photos` index for every uploaded image.
///
/// Labels keep the order in which they were collected: detected labels first,
/// then the user-supplied custom labels. Nothing is deduplicated or case-folded.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PhotoDocument {
    /// Object key within the bucket (natural key of the photo).
    pub object_key: String,

    /// Name of the bucket holding the image.
    pub bucket: String,

    /// Ingest time as an ISO-8601 UTC string.
    pub created_timestamp: String,

    /// Detected labels followed by custom labels.
    pub labels: Vec<String>,
}

impl PhotoDocument {
    pub fn new(
        object_key: impl Into<String>,
        bucket: impl Into<String>,
        labels: Vec<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            object_key: object_key.into(),
            bucket: bucket.into(),
            created_timestamp: created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            labels,
        }
    }
}

/// A single search result, restricted to the fields callers are allowed to see.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PhotoSummary {
    pub object_key: Option<String>,
    pub bucket: Option<String>,
    pub labels: Vec<String>,
}

impl PhotoSummary {
    /// Project a hit's stored `_source` onto the whitelisted fields.
    ///
    /// Missing or mistyped `objectKey`/`bucket` become `None`; missing labels
    /// become an empty list and non-string labels are skipped.
    pub fn from_source(source: &Value) -> Self {
        let text = |field: &str| source.get(field).and_then(Value::as_str).map(str::to_owned);

        let labels = source
            .get("labels")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            object_key: text("objectKey"),
            bucket: text("bucket"),
            labels,
        }
    }
}

/// Envelope returned by the query handler: `{"results": [...]}`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SearchResults {
    pub results: Vec<PhotoSummary>,
}

impl SearchResults {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn document_serializes_with_camel_case_fields() {
        let created = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap();
        let doc = PhotoDocument::new("dog.jpg", "photos-b2", vec!["Dog".into()], created);

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            value,
            json!({
                "objectKey": "dog.jpg",
                "bucket": "photos-b2",
                "createdTimestamp": "2025-03-01T12:30:00.000000Z",
                "labels": ["Dog"]
            })
        );
    }

    #[test]
    fn summary_keeps_only_whitelisted_fields() {
        let source = json!({
            "objectKey": "a.jpg",
            "bucket": "b1",
            "labels": ["dog"],
            "createdTimestamp": "2025-03-01T12:30:00Z",
            "extra": true
        });

        let summary = PhotoSummary::from_source(&source);
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            value,
            json!({ "objectKey": "a.jpg", "bucket": "b1", "labels": ["dog"] })
        );
    }

    #[test]
    fn summary_tolerates_sparse_source() {
        let summary = PhotoSummary::from_source(&json!({ "bucket": "b1" }));

        assert_eq!(summary.object_key, None);
        assert_eq!(summary.bucket.as_deref(), Some("b1"));
        assert!(summary.labels.is_empty());

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["objectKey"], Value::Null);
    }
}
