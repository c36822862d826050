//! Tokens from the GCE/GKE metadata server
//!
//! Endpoint: `http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token`
//!
//! API Reference: https://cloud.google.com/compute/docs/metadata/querying-metadata

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{fetch_token, AccessToken, CredentialProvider};
use crate::constants::METADATA_TOKEN_URL;
use crate::error::BackendError;

/// Credentials of the service account attached to the instance or pod
#[derive(Debug, Clone)]
pub struct MetadataServerCredentials {
    http_client: Client,
    token_url: String,
}

impl MetadataServerCredentials {
    pub fn new(http_client: Client) -> Self {
        Self {
            http_client,
            token_url: METADATA_TOKEN_URL.to_string(),
        }
    }

    /// Use another token endpoint (local emulation, tests)
    #[must_use]
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }
}

#[async_trait]
impl CredentialProvider for MetadataServerCredentials {
    async fn resolve(&self) -> Result<AccessToken, BackendError> {
        debug!(url = %self.token_url, "Requesting access token from metadata server");
        let request = self
            .http_client
            .get(&self.token_url)
            .header("Metadata-Flavor", "Google");
        fetch_token(request, "metadata server").await
    }
}
