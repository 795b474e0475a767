//! Label detection for stored images (Rekognition `DetectLabels`).

use async_trait::async_trait;
use aws_sdk_rekognition::{
    Client,
    types::{Image, S3Object},
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LabelError {
    #[error("label detection failed for `{bucket}/{key}`: {message}")]
    Detection {
        bucket: String,
        key: String,
        message: String,
    },
}

/// Detects object and scene labels for an image already in object storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LabelDetector: Send + Sync {
    /// Returns label names in the order the service ranked them.
    async fn detect_labels(
        &self,
        bucket: &str,
        key: &str,
        max_labels: i32,
    ) -> Result<Vec<String>, LabelError>;
}

#[derive(Clone)]
pub struct RekognitionLabels {
    client: Client,
}

impl RekognitionLabels {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LabelDetector for RekognitionLabels {
    async fn detect_labels(
        &self,
        bucket: &str,
        key: &str,
        max_labels: i32,
    ) -> Result<Vec<String>, LabelError> {
        let image = Image::builder()
            .s3_object(S3Object::builder().bucket(bucket).name(key).build())
            .build();

        let output = self
            .client
            .detect_labels()
            .image(image)
            .max_labels(max_labels)
            .send()
            .await
            .map_err(|err| LabelError::Detection {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: err.to_string(),
            })?;

        let labels: Vec<String> = output
            .labels()
            .iter()
            .filter_map(|label| label.name())
            .map(str::to_owned)
            .collect();

        debug!(bucket, key, count = labels.len(), "rekognition returned labels");
        Ok(labels)
    }
}
