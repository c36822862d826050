//! # Credentials
//!
//! Resolution of OAuth2 bearer tokens for the Secret Manager API.
//!
//! The connector depends only on the [`CredentialProvider`] trait. Available
//! providers:
//!
//! - [`StaticToken`]: a pre-minted token (tests, `GOOGLE_OAUTH_ACCESS_TOKEN`)
//! - [`MetadataServerCredentials`]: GCE/GKE metadata server (Workload Identity)
//! - [`ServiceAccountCredentials`]: service account JSON key, self-signed JWT grant
//! - [`AuthorizedUserCredentials`]: gcloud user credentials, refresh token grant
//! - [`DefaultCredentials`]: the Application Default Credentials chain
//!
//! Tokens are resolved on every connection; nothing is cached.

mod adc;
mod authorized_user;
mod metadata;
mod service_account;

pub use adc::{CredentialsFile, DefaultCredentials};
pub use authorized_user::{AuthorizedUserCredentials, AuthorizedUserKey};
pub use metadata::MetadataServerCredentials;
pub use service_account::{ServiceAccountCredentials, ServiceAccountKey};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::fmt;
use zeroize::Zeroizing;

use crate::error::BackendError;

/// OAuth2 bearer token
///
/// Optionally carries the quota project that requests made with it are billed
/// to (`x-goog-user-project`).
#[derive(Clone)]
pub struct AccessToken {
    secret: Zeroizing<String>,
    quota_project: Option<String>,
}

impl AccessToken {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Zeroizing::new(secret.into()),
            quota_project: None,
        }
    }

    #[must_use]
    pub fn with_quota_project(mut self, quota_project: Option<String>) -> Self {
        self.quota_project = quota_project.filter(|p| !p.is_empty());
        self
    }

    /// Raw token value for the `Authorization` header
    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn quota_project(&self) -> Option<&str> {
        self.quota_project.as_deref()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"[REDACTED]")
            .field("quota_project", &self.quota_project)
            .finish()
    }
}

/// Source of credentials for connecting to the backend
#[async_trait]
pub trait CredentialProvider: Send + Sync + fmt::Debug {
    /// Resolve a bearer token
    ///
    /// # Errors
    /// Returns [`BackendError::Authentication`] when no usable credentials
    /// exist and [`BackendError::Connection`] when a token endpoint cannot be reached
    async fn resolve(&self) -> Result<AccessToken, BackendError>;
}

/// Provider handing out a fixed token
#[derive(Clone)]
pub struct StaticToken(AccessToken);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(AccessToken::new(token))
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StaticToken").field(&"[REDACTED]").finish()
    }
}

#[async_trait]
impl CredentialProvider for StaticToken {
    async fn resolve(&self) -> Result<AccessToken, BackendError> {
        if self.0.secret().is_empty() {
            return Err(BackendError::Authentication(
                "static access token is empty".to_string(),
            ));
        }
        Ok(self.0.clone())
    }
}

/// OAuth2 token endpoint response
///
/// Shared by the metadata server and the `oauth2.googleapis.com/token` grants.
#[derive(Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
}

/// Send a token request and decode the response
///
/// A token endpoint that cannot be reached, or that fails with a server error
/// or rate limit, is a [`BackendError::Connection`]. A grant the endpoint
/// rejects and a missing or malformed token are [`BackendError::Authentication`].
pub(crate) async fn fetch_token(
    request: reqwest::RequestBuilder,
    source: &str,
) -> Result<AccessToken, BackendError> {
    let response = request
        .send()
        .await
        .map_err(|e| BackendError::Connection(format!("{source} unreachable: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = format!("{source} returned HTTP {}: {}", status.as_u16(), body.trim());
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(BackendError::Connection(message));
        }
        return Err(BackendError::Authentication(message));
    }

    let token: TokenResponse = response.json().await.map_err(|e| {
        BackendError::Authentication(format!("{source} sent a malformed token: {e}"))
    })?;
    if token.access_token.is_empty() {
        return Err(BackendError::Authentication(format!(
            "{source} returned an empty access token"
        )));
    }
    Ok(AccessToken::new(token.access_token))
}
