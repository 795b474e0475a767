//! In-memory stand-ins for the outbound services.
//!
//! `MemoryIndex` answers the label query with OR semantics over lowercased
//! label words, the way the search domain's standard analyzer would.

#![allow(dead_code)]

use async_trait::async_trait;
use aws_credential_types::Credentials;
use photo_search::{
    models::{
        events::{NotificationRecord, S3Bucket, S3Entity, S3Notification, S3Object},
        photo::PhotoDocument,
    },
    services::{
        AppState,
        ingest_service::IngestService,
        intent::{IntentError, IntentRecognizer},
        labels::{LabelDetector, LabelError},
        metadata::{MetadataError, ObjectMetadataSource},
        search_index::{IndexError, IndexWrite, PhotoIndex},
        search_service::SearchService,
        signing::{CredentialSource, RequestSigner, SigningError, SigningScope},
    },
};
use serde_json::Value;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

pub fn scope() -> SigningScope {
    SigningScope {
        region: "us-east-1".into(),
        service: "es".into(),
    }
}

pub fn notification(objects: &[(&str, &str)]) -> S3Notification {
    S3Notification {
        records: objects
            .iter()
            .map(|(bucket, key)| NotificationRecord {
                s3: S3Entity {
                    bucket: S3Bucket {
                        name: bucket.to_string(),
                    },
                    object: S3Object {
                        key: key.to_string(),
                    },
                },
            })
            .collect(),
    }
}

pub struct StaticCredentials {
    pub fail: bool,
}

#[async_trait]
impl CredentialSource for StaticCredentials {
    async fn fetch(&self) -> Result<Credentials, SigningError> {
        if self.fail {
            return Err(SigningError::NoProvider);
        }
        Ok(Credentials::new("AKIDTEST", "secret", None, None, "static"))
    }
}

/// Labels keyed by object key; unknown keys fail detection.
#[derive(Default)]
pub struct FakeLabels {
    pub labels: HashMap<String, Vec<String>>,
}

#[async_trait]
impl LabelDetector for FakeLabels {
    async fn detect_labels(
        &self,
        bucket: &str,
        key: &str,
        _max_labels: i32,
    ) -> Result<Vec<String>, LabelError> {
        self.labels
            .get(key)
            .cloned()
            .ok_or_else(|| LabelError::Detection {
                bucket: bucket.into(),
                key: key.into(),
                message: "InvalidS3ObjectException".into(),
            })
    }
}

/// Custom-labels metadata keyed by object key; unknown keys have none.
#[derive(Default)]
pub struct FakeMetadata {
    pub custom: HashMap<String, String>,
}

#[async_trait]
impl ObjectMetadataSource for FakeMetadata {
    async fn custom_labels(
        &self,
        _bucket: &str,
        key: &str,
    ) -> Result<Option<String>, MetadataError> {
        Ok(self.custom.get(key).cloned())
    }
}

/// Keyword slot values keyed by the exact query text.
#[derive(Default)]
pub struct FakeIntents {
    pub keywords: HashMap<String, String>,
    pub fail: bool,
}

#[async_trait]
impl IntentRecognizer for FakeIntents {
    async fn extract_keywords(&self, text: &str) -> Result<Option<String>, IntentError> {
        if self.fail {
            return Err(IntentError::Recognize("AccessDeniedException".into()));
        }
        Ok(self.keywords.get(text).cloned())
    }
}

#[derive(Default)]
pub struct MemoryIndex {
    pub documents: Mutex<Vec<PhotoDocument>>,
    pub write_attempts: Mutex<usize>,
    pub reject_writes: bool,
}

impl MemoryIndex {
    pub fn documents(&self) -> Vec<PhotoDocument> {
        self.documents.lock().unwrap().clone()
    }

    pub fn write_attempts(&self) -> usize {
        *self.write_attempts.lock().unwrap()
    }

    fn keywords(query: &Value) -> Vec<String> {
        query["query"]["bool"]["should"]
            .as_array()
            .map(|clauses| {
                clauses
                    .iter()
                    .filter_map(|clause| clause["match"]["labels"].as_str())
                    .map(str::to_lowercase)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl PhotoIndex for MemoryIndex {
    async fn index_photo(
        &self,
        _signer: &RequestSigner,
        doc: &PhotoDocument,
    ) -> Result<IndexWrite, IndexError> {
        *self.write_attempts.lock().unwrap() += 1;
        if self.reject_writes {
            return Err(IndexError::Status {
                status: 503,
                body: "cluster_block_exception".into(),
            });
        }
        self.documents.lock().unwrap().push(doc.clone());
        Ok(IndexWrite {
            status: 201,
            body: r#"{"result":"created"}"#.into(),
        })
    }

    async fn search(&self, _signer: &RequestSigner, query: &Value) -> Result<Vec<Value>, IndexError> {
        let keywords = Self::keywords(query);
        let documents = self.documents.lock().unwrap();

        let hits = documents
            .iter()
            .filter(|doc| {
                doc.labels.iter().any(|label| {
                    label
                        .to_lowercase()
                        .split_whitespace()
                        .any(|word| keywords.iter().any(|kw| kw == word))
                })
            })
            .map(|doc| serde_json::to_value(doc).unwrap())
            .collect();
        Ok(hits)
    }

    async fn ping(&self, _signer: &RequestSigner) -> Result<(), IndexError> {
        Ok(())
    }
}

pub struct Fixture {
    pub index: Arc<MemoryIndex>,
    pub state: AppState,
}

pub struct FixtureBuilder {
    pub labels: FakeLabels,
    pub metadata: FakeMetadata,
    pub intents: FakeIntents,
    pub index: MemoryIndex,
    pub credentials_fail: bool,
}

impl FixtureBuilder {
    pub fn new() -> Self {
        Self {
            labels: FakeLabels::default(),
            metadata: FakeMetadata::default(),
            intents: FakeIntents::default(),
            index: MemoryIndex::default(),
            credentials_fail: false,
        }
    }

    pub fn detected(mut self, key: &str, labels: &[&str]) -> Self {
        self.labels
            .labels
            .insert(key.into(), labels.iter().map(|l| l.to_string()).collect());
        self
    }

    pub fn custom(mut self, key: &str, raw: &str) -> Self {
        self.metadata.custom.insert(key.into(), raw.into());
        self
    }

    pub fn keywords(mut self, query: &str, slot_value: &str) -> Self {
        self.intents.keywords.insert(query.into(), slot_value.into());
        self
    }

    pub fn build(self) -> Fixture {
        let index = Arc::new(self.index);
        let credentials = Arc::new(StaticCredentials {
            fail: self.credentials_fail,
        });

        let ingest = IngestService::new(
            Arc::new(self.labels),
            Arc::new(self.metadata),
            index.clone(),
            credentials.clone(),
            scope(),
        );
        let search = SearchService::new(
            Arc::new(self.intents),
            index.clone(),
            credentials,
            scope(),
        );

        Fixture {
            index,
            state: AppState { ingest, search },
        }
    }
}
