//! OpenSearch access: document writes and label queries over signed HTTPS.

use crate::{
    models::photo::PhotoDocument,
    services::signing::{RequestSigner, SigningError},
};
use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

/// Field the label query matches against.
pub const LABELS_FIELD: &str = "labels";

#[derive(Debug, Error)]
pub enum IndexError {
    #[error(transparent)]
    Signing(#[from] SigningError),
    #[error("index request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("index returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not encode or decode index payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("invalid index endpoint {0}")]
    Endpoint(String),
}

/// Raw outcome of a document write; non-2xx statuses are reported, not raised.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexWrite {
    pub status: u16,
    pub body: String,
}

impl IndexWrite {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The photo index, reached with a per-invocation signer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhotoIndex: Send + Sync {
    /// POST a document to `/{index}/_doc`.
    async fn index_photo(
        &self,
        signer: &RequestSigner,
        doc: &PhotoDocument,
    ) -> Result<IndexWrite, IndexError>;

    /// Run a query against `/{index}/_search` and return each hit's `_source`
    /// in the order the index ranked them.
    async fn search(&self, signer: &RequestSigner, query: &Value) -> Result<Vec<Value>, IndexError>;

    /// Cheap reachability check of the index endpoint.
    async fn ping(&self, signer: &RequestSigner) -> Result<(), IndexError>;
}

/// Build a disjunctive match query: a document matches when its labels match
/// at least one keyword.
pub fn label_match_query(keywords: &[String]) -> Value {
    let should: Vec<Value> = keywords
        .iter()
        .map(|keyword| json!({ "match": { LABELS_FIELD: keyword } }))
        .collect();

    json!({
        "query": {
            "bool": {
                "should": should,
                "minimum_should_match": 1
            }
        }
    })
}

#[derive(Deserialize, Default)]
struct SearchResponseBody {
    #[serde(default)]
    hits: HitsEnvelope,
}

#[derive(Deserialize, Default)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Deserialize)]
struct Hit {
    #[serde(rename = "_source", default)]
    source: Value,
}

/// Parse a `_search` response body into hit sources, preserving order.
pub fn hit_sources(body: &[u8]) -> Result<Vec<Value>, IndexError> {
    let parsed: SearchResponseBody = serde_json::from_slice(body)?;
    Ok(parsed.hits.hits.into_iter().map(|hit| hit.source).collect())
}

/// OpenSearch domain reached with SigV4-signed requests.
#[derive(Clone)]
pub struct OpenSearchIndex {
    http: reqwest::Client,
    base_url: String,
    /// Authority sent (and signed) as the `host` header.
    host: String,
    index: String,
}

impl OpenSearchIndex {
    /// Domain reached over HTTPS at `host`.
    pub fn new(http: reqwest::Client, host: impl Into<String>, index: impl Into<String>) -> Self {
        let host = host.into();
        Self {
            http,
            base_url: format!("https://{host}"),
            host,
            index: index.into(),
        }
    }

    /// Domain reached at an explicit `scheme://authority` base URL.
    pub fn with_base_url(
        http: reqwest::Client,
        base_url: &str,
        index: impl Into<String>,
    ) -> Result<Self, IndexError> {
        let uri: http::Uri = base_url
            .parse()
            .map_err(|_| IndexError::Endpoint(base_url.to_string()))?;
        let (Some(scheme), Some(authority)) = (uri.scheme_str(), uri.authority()) else {
            return Err(IndexError::Endpoint(base_url.to_string()));
        };

        Ok(Self {
            http,
            base_url: format!("{scheme}://{authority}"),
            host: authority.to_string(),
            index: index.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Sign and send one request; the body is signed exactly as sent.
    async fn send_signed(
        &self,
        signer: &RequestSigner,
        method: Method,
        path: &str,
        body: Bytes,
    ) -> Result<reqwest::Response, IndexError> {
        let url = self.url(path);
        let unsigned = [
            ("host", self.host.as_str()),
            ("content-type", "application/json"),
        ];
        let signed = signer.sign(method.as_str(), &url, &unsigned, &body)?;

        let mut request = self
            .http
            .request(method, &url)
            .header(http::header::CONTENT_TYPE, "application/json");
        for (name, value) in signed {
            request = request.header(name, value);
        }

        Ok(request.body(body).send().await?)
    }
}

#[async_trait]
impl PhotoIndex for OpenSearchIndex {
    async fn index_photo(
        &self,
        signer: &RequestSigner,
        doc: &PhotoDocument,
    ) -> Result<IndexWrite, IndexError> {
        let body = Bytes::from(serde_json::to_vec(doc)?);
        let path = format!("{}/_doc", self.index);

        let response = self.send_signed(signer, Method::POST, &path, body).await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(IndexWrite { status, body })
    }

    async fn search(&self, signer: &RequestSigner, query: &Value) -> Result<Vec<Value>, IndexError> {
        let body = Bytes::from(serde_json::to_vec(query)?);
        let path = format!("{}/_search", self.index);

        let response = self.send_signed(signer, Method::POST, &path, body).await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(IndexError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let sources = hit_sources(&bytes)?;
        debug!(hits = sources.len(), "index search returned");
        Ok(sources)
    }

    async fn ping(&self, signer: &RequestSigner) -> Result<(), IndexError> {
        let response = self
            .send_signed(signer, Method::GET, "", Bytes::new())
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(IndexError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            })
        }
    }
}
