//! IngestService — turns storage notifications into indexed photo documents.
//!
//! Records are handled one at a time, in order. Each outbound step returns a
//! typed error; this service decides explicitly to log it and carry on, so a
//! single bad record never aborts the rest of the batch.

use crate::{
    models::{events::S3Notification, photo::PhotoDocument},
    services::{
        labels::LabelDetector,
        metadata::{ObjectMetadataSource, split_custom_labels},
        search_index::{IndexError, IndexWrite, PhotoIndex},
        signing::{CredentialSource, RequestSigner, SigningError, SigningScope},
    },
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Maximum number of labels requested from label detection.
pub const DEFAULT_MAX_LABELS: i32 = 10;

/// Per-batch counters, logged once the batch has been attempted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    pub records: usize,
    pub indexed: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct IngestService {
    labels: Arc<dyn LabelDetector>,
    metadata: Arc<dyn ObjectMetadataSource>,
    index: Arc<dyn PhotoIndex>,
    credentials: Arc<dyn CredentialSource>,
    scope: SigningScope,
    max_labels: i32,
}

impl IngestService {
    pub fn new(
        labels: Arc<dyn LabelDetector>,
        metadata: Arc<dyn ObjectMetadataSource>,
        index: Arc<dyn PhotoIndex>,
        credentials: Arc<dyn CredentialSource>,
        scope: SigningScope,
    ) -> Self {
        Self {
            labels,
            metadata,
            index,
            credentials,
            scope,
            max_labels: DEFAULT_MAX_LABELS,
        }
    }

    pub fn with_max_labels(mut self, max_labels: i32) -> Self {
        self.max_labels = max_labels;
        self
    }

    /// Process every record of a notification batch.
    ///
    /// Credentials are fetched once at the start of the call. If that fails,
    /// each record is still processed and its write is reported as failed.
    pub async fn process_batch(&self, event: &S3Notification) -> IngestSummary {
        let signer = RequestSigner::for_invocation(self.credentials.as_ref(), &self.scope).await;
        if let Err(err) = &signer {
            error!(error = %err, "could not obtain signing credentials for this invocation");
        }

        let mut summary = IngestSummary::default();
        for record in &event.records {
            summary.records += 1;
            let bucket = record.bucket();
            let key = record.key();
            info!(bucket, key, "processing object");

            let doc = self.build_document(bucket, key).await;
            info!(document = ?doc, "document to index");

            match self.write_document(signer.as_ref(), &doc).await {
                Ok(write) if write.is_success() => {
                    info!(status = write.status, body = %write.body, "index response");
                    summary.indexed += 1;
                }
                Ok(write) => {
                    warn!(status = write.status, body = %write.body, "index rejected document");
                    summary.failed += 1;
                }
                Err(err) => {
                    error!(bucket, key, error = %err, "error indexing document");
                    summary.failed += 1;
                }
            }
        }

        info!(
            records = summary.records,
            indexed = summary.indexed,
            failed = summary.failed,
            "photo indexing complete"
        );
        summary
    }

    /// Collect detected and custom labels for one object.
    ///
    /// Detection failure leaves only the custom labels; a metadata failure
    /// keeps whatever was detected.
    pub async fn collect_labels(&self, bucket: &str, key: &str) -> Vec<String> {
        let mut labels = match self.labels.detect_labels(bucket, key, self.max_labels).await {
            Ok(detected) => {
                info!(labels = ?detected, "detected labels");
                detected
            }
            Err(err) => {
                warn!(error = %err, "error detecting labels");
                Vec::new()
            }
        };

        match self.metadata.custom_labels(bucket, key).await {
            Ok(custom) => {
                let raw = custom.unwrap_or_default();
                info!(custom_labels = %raw, "custom labels");
                labels.extend(split_custom_labels(&raw));
            }
            Err(err) => warn!(error = %err, "error reading custom labels"),
        }

        labels
    }

    async fn build_document(&self, bucket: &str, key: &str) -> PhotoDocument {
        let labels = self.collect_labels(bucket, key).await;
        PhotoDocument::new(key, bucket, labels, Utc::now())
    }

    async fn write_document(
        &self,
        signer: Result<&RequestSigner, &SigningError>,
        doc: &PhotoDocument,
    ) -> Result<IndexWrite, IndexError> {
        match signer {
            Ok(signer) => self.index.index_photo(signer, doc).await,
            Err(err) => Err(IndexError::Signing(SigningError::Credentials(err.to_string()))),
        }
    }
}
