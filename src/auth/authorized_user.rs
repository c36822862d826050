//! gcloud user credentials (`gcloud auth application-default login`)

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use tracing::debug;

use super::{fetch_token, AccessToken, CredentialProvider};
use crate::constants::DEFAULT_TOKEN_URI;
use crate::error::BackendError;

/// Fields of a `"type": "authorized_user"` credentials file
#[derive(Clone, Deserialize)]
pub struct AuthorizedUserKey {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_uri: Option<String>,
    /// Project billed for API calls, sent as `x-goog-user-project`
    #[serde(default)]
    pub quota_project_id: Option<String>,
}

impl fmt::Debug for AuthorizedUserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizedUserKey")
            .field("client_id", &self.client_id)
            .field("quota_project_id", &self.quota_project_id)
            .finish_non_exhaustive()
    }
}

/// Credentials refreshed through the OAuth2 refresh token grant
#[derive(Clone)]
pub struct AuthorizedUserCredentials {
    http_client: Client,
    key: AuthorizedUserKey,
}

impl AuthorizedUserCredentials {
    pub fn new(http_client: Client, key: AuthorizedUserKey) -> Self {
        Self { http_client, key }
    }

    fn token_uri(&self) -> &str {
        self.key.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI)
    }
}

impl fmt::Debug for AuthorizedUserCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizedUserCredentials")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CredentialProvider for AuthorizedUserCredentials {
    async fn resolve(&self) -> Result<AccessToken, BackendError> {
        debug!(client_id = %self.key.client_id, "Refreshing user access token");
        let request = self.http_client.post(self.token_uri()).form(&[
            ("grant_type", "refresh_token"),
            ("client_id", self.key.client_id.as_str()),
            ("client_secret", self.key.client_secret.as_str()),
            ("refresh_token", self.key.refresh_token.as_str()),
        ]);
        let token = fetch_token(request, "token endpoint").await?;
        Ok(token.with_quota_project(self.key.quota_project_id.clone()))
    }
}
