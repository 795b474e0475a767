//! User-supplied labels stored as object metadata (`x-amz-meta-customlabels`).

use async_trait::async_trait;
use aws_sdk_s3::Client;
use thiserror::Error;

/// Metadata key holding the comma-separated custom labels.
pub const CUSTOM_LABELS_KEY: &str = "customlabels";

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("could not read metadata for `{bucket}/{key}`: {message}")]
    HeadObject {
        bucket: String,
        key: String,
        message: String,
    },
}

/// Reads the raw custom-labels string attached to an object.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectMetadataSource: Send + Sync {
    /// `Ok(None)` when the object carries no custom labels.
    async fn custom_labels(&self, bucket: &str, key: &str)
    -> Result<Option<String>, MetadataError>;
}

#[derive(Clone)]
pub struct S3Metadata {
    client: Client,
}

impl S3Metadata {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectMetadataSource for S3Metadata {
    async fn custom_labels(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<String>, MetadataError> {
        let output = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| MetadataError::HeadObject {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: err.to_string(),
            })?;

        Ok(output
            .metadata()
            .and_then(|meta| meta.get(CUSTOM_LABELS_KEY))
            .cloned())
    }
}

/// Split a custom-labels string on commas and trim each part.
///
/// Empty input yields no labels. Interior empty parts (`"a,,b"`) are kept as
/// empty strings, matching how the labels were written by the uploader.
pub fn split_custom_labels(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|part| part.trim().to_string()).collect()
}
