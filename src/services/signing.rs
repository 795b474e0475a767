//! Request-scoped SigV4 signing for calls to the search index.
//!
//! Credentials are fetched once per invocation through a [`CredentialSource`]
//! and wrapped in a [`RequestSigner`] that lives only as long as that
//! invocation. Nothing here is cached across invocations.

use async_trait::async_trait;
use aws_credential_types::{
    Credentials,
    provider::{ProvideCredentials, SharedCredentialsProvider},
};
use aws_sigv4::{
    http_request::{SignableBody, SignableRequest, SigningParams, SigningSettings, sign},
    sign::v4,
};
use aws_smithy_runtime_api::client::identity::Identity;
use std::time::SystemTime;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SigningError {
    #[error("no credentials provider configured")]
    NoProvider,
    #[error("could not load credentials: {0}")]
    Credentials(String),
    #[error("could not sign request: {0}")]
    Sign(String),
}

/// Supplies short-lived credentials at the start of each invocation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn fetch(&self) -> Result<Credentials, SigningError>;
}

/// Credential source backed by the SDK's default provider chain.
#[derive(Clone)]
pub struct SdkCredentialSource {
    provider: Option<SharedCredentialsProvider>,
}

impl SdkCredentialSource {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            provider: sdk_config.credentials_provider(),
        }
    }
}

#[async_trait]
impl CredentialSource for SdkCredentialSource {
    async fn fetch(&self) -> Result<Credentials, SigningError> {
        let provider = self.provider.as_ref().ok_or(SigningError::NoProvider)?;
        provider
            .provide_credentials()
            .await
            .map_err(|err| SigningError::Credentials(err.to_string()))
    }
}

/// Region and service name the index expects signatures for.
#[derive(Clone, Debug)]
pub struct SigningScope {
    pub region: String,
    pub service: String,
}

/// Signs outbound index requests with one invocation's credentials.
#[derive(Clone, Debug)]
pub struct RequestSigner {
    credentials: Credentials,
    scope: SigningScope,
}

impl RequestSigner {
    pub fn new(credentials: Credentials, scope: SigningScope) -> Self {
        Self { credentials, scope }
    }

    /// Fetch fresh credentials and build a signer for the current invocation.
    pub async fn for_invocation(
        source: &dyn CredentialSource,
        scope: &SigningScope,
    ) -> Result<Self, SigningError> {
        let credentials = source.fetch().await?;
        Ok(Self::new(credentials, scope.clone()))
    }

    /// Compute the SigV4 headers for a request.
    ///
    /// `headers` must contain every header that will be sent and signed
    /// (at least `host` and `content-type`). Returns the headers to add.
    pub fn sign(
        &self,
        method: &str,
        url: &str,
        headers: &[(&str, &str)],
        body: &[u8],
    ) -> Result<Vec<(String, String)>, SigningError> {
        let identity: Identity = self.credentials.clone().into();
        let params: SigningParams<'_> = v4::SigningParams::builder()
            .identity(&identity)
            .region(&self.scope.region)
            .name(&self.scope.service)
            .time(SystemTime::now())
            .settings(SigningSettings::default())
            .build()
            .map_err(|err| SigningError::Sign(err.to_string()))?
            .into();

        let signable = SignableRequest::new(
            method,
            url,
            headers.iter().copied(),
            SignableBody::Bytes(body),
        )
        .map_err(|err| SigningError::Sign(err.to_string()))?;

        let (instructions, _signature) = sign(signable, &params)
            .map_err(|err| SigningError::Sign(err.to_string()))?
            .into_parts();

        Ok(instructions
            .headers()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect())
    }
}
