//! SearchService — natural-language photo search.
//!
//! Free text goes to the intent bot, the keywords slot is tokenized, and the
//! tokens are matched against the `labels` field of the photo index. Every
//! failure along the way degrades to an empty result list.

use crate::{
    models::photo::{PhotoSummary, SearchResults},
    services::{
        intent::IntentRecognizer,
        search_index::{PhotoIndex, label_match_query},
        signing::{CredentialSource, RequestSigner, SigningScope},
    },
};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Split extracted keyword text into lowercase search tokens.
///
/// Commas count as whitespace; empty tokens are dropped.
pub fn tokenize_keywords(text: &str) -> Vec<String> {
    text.replace(',', " ")
        .split_whitespace()
        .map(|word| word.trim().to_lowercase())
        .filter(|word| !word.is_empty())
        .collect()
}

#[derive(Clone)]
pub struct SearchService {
    intents: Arc<dyn IntentRecognizer>,
    index: Arc<dyn PhotoIndex>,
    credentials: Arc<dyn CredentialSource>,
    scope: SigningScope,
}

impl SearchService {
    pub fn new(
        intents: Arc<dyn IntentRecognizer>,
        index: Arc<dyn PhotoIndex>,
        credentials: Arc<dyn CredentialSource>,
        scope: SigningScope,
    ) -> Self {
        Self {
            intents,
            index,
            credentials,
            scope,
        }
    }

    /// Answer one query. Never fails: every miss is an empty result list.
    pub async fn search(&self, query: &str) -> SearchResults {
        if query.is_empty() {
            return SearchResults::empty();
        }

        let keywords_text = match self.intents.extract_keywords(query).await {
            Ok(Some(text)) => text,
            Ok(None) => {
                info!(query, "no keywords interpreted from query");
                return SearchResults::empty();
            }
            Err(err) => {
                error!(error = %err, "lex error");
                return SearchResults::empty();
            }
        };

        let keywords = tokenize_keywords(&keywords_text);
        info!(keywords = ?keywords, "extracted keywords");
        if keywords.is_empty() {
            return SearchResults::empty();
        }

        let signer = match RequestSigner::for_invocation(self.credentials.as_ref(), &self.scope).await
        {
            Ok(signer) => signer,
            Err(err) => {
                error!(error = %err, "could not obtain signing credentials");
                return SearchResults::empty();
            }
        };

        let query = label_match_query(&keywords);
        debug!(query = %query, "index query");

        match self.index.search(&signer, &query).await {
            Ok(sources) => SearchResults {
                results: sources.iter().map(PhotoSummary::from_source).collect(),
            },
            Err(err) => {
                error!(error = %err, "opensearch error");
                SearchResults::empty()
            }
        }
    }

    /// Resolve credentials and reach the index; used by readiness checks.
    pub async fn readiness(&self) -> Readiness {
        let signer = match RequestSigner::for_invocation(self.credentials.as_ref(), &self.scope).await
        {
            Ok(signer) => signer,
            Err(err) => {
                return Readiness {
                    credentials: Err(err.to_string()),
                    index: Err("skipped: no credentials".into()),
                };
            }
        };

        Readiness {
            credentials: Ok(()),
            index: self.index.ping(&signer).await.map_err(|err| err.to_string()),
        }
    }
}

/// Outcome of each readiness check; `Err` carries a printable reason.
#[derive(Debug)]
pub struct Readiness {
    pub credentials: Result<(), String>,
    pub index: Result<(), String>,
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        self.credentials.is_ok() && self.index.is_ok()
    }
}
