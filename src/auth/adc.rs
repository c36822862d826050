//! Application Default Credentials
//!
//! Resolution order:
//!
//! 1. `GOOGLE_OAUTH_ACCESS_TOKEN`: a pre-minted token
//! 2. `GOOGLE_APPLICATION_CREDENTIALS`: path to a credentials JSON file
//! 3. the gcloud well-known file (`~/.config/gcloud/application_default_credentials.json`)
//! 4. the metadata server
//!
//! An explicitly configured source that fails is reported as is; the chain
//! only moves on when a source is absent.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{
    AccessToken, AuthorizedUserCredentials, AuthorizedUserKey, CredentialProvider,
    MetadataServerCredentials, ServiceAccountCredentials, ServiceAccountKey, StaticToken,
};
use crate::constants::env;
use crate::error::BackendError;

const WELL_KNOWN_FILE: &str = "application_default_credentials.json";

/// Supported credentials file formats, keyed by their `type` field
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialsFile {
    ServiceAccount(ServiceAccountKey),
    AuthorizedUser(AuthorizedUserKey),
}

impl CredentialsFile {
    /// Read and parse a credentials file
    ///
    /// # Errors
    /// Returns [`BackendError::Authentication`] if the file is unreadable or of an unsupported type
    pub fn load(path: &Path) -> Result<Self, BackendError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            BackendError::Authentication(format!(
                "cannot read credentials file {}: {e}",
                path.display()
            ))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            BackendError::Authentication(format!(
                "unsupported credentials file {}: {e}",
                path.display()
            ))
        })
    }

    /// Turn the parsed file into a provider
    ///
    /// # Errors
    /// Returns [`BackendError::Authentication`] if the key material is invalid
    pub fn into_provider(
        self,
        http_client: Client,
    ) -> Result<Box<dyn CredentialProvider>, BackendError> {
        Ok(match self {
            Self::ServiceAccount(key) => {
                Box::new(ServiceAccountCredentials::new(http_client, key)?)
            }
            Self::AuthorizedUser(key) => Box::new(AuthorizedUserCredentials::new(http_client, key)),
        })
    }
}

/// The Application Default Credentials chain
///
/// Environment lookups happen at construction; sources are consulted on each
/// [`resolve`](CredentialProvider::resolve).
#[derive(Debug)]
pub struct DefaultCredentials {
    http_client: Client,
    access_token: Option<StaticToken>,
    credentials_file: Option<PathBuf>,
    well_known_file: Option<PathBuf>,
    metadata: MetadataServerCredentials,
}

impl DefaultCredentials {
    pub fn from_env(http_client: Client) -> Self {
        Self::from_lookup(http_client, |name| std::env::var(name).ok())
    }

    /// Build the chain through an arbitrary variable lookup
    pub fn from_lookup<F>(http_client: Client, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());
        Self {
            access_token: non_empty(env::ACCESS_TOKEN).map(StaticToken::new),
            credentials_file: non_empty(env::APPLICATION_CREDENTIALS).map(PathBuf::from),
            well_known_file: well_known_file(),
            metadata: MetadataServerCredentials::new(http_client.clone()),
            http_client,
        }
    }

    /// Replace the gcloud well-known file location (`None` disables it)
    #[must_use]
    pub fn with_well_known_file(mut self, path: Option<PathBuf>) -> Self {
        self.well_known_file = path;
        self
    }

    /// Replace the metadata server fallback
    #[must_use]
    pub fn with_metadata(mut self, metadata: MetadataServerCredentials) -> Self {
        self.metadata = metadata;
        self
    }

    async fn resolve_file(&self, path: &Path) -> Result<AccessToken, BackendError> {
        CredentialsFile::load(path)?
            .into_provider(self.http_client.clone())?
            .resolve()
            .await
    }
}

#[async_trait]
impl CredentialProvider for DefaultCredentials {
    async fn resolve(&self) -> Result<AccessToken, BackendError> {
        if let Some(token) = &self.access_token {
            debug!("Using access token from {}", env::ACCESS_TOKEN);
            return token.resolve().await;
        }

        if let Some(path) = &self.credentials_file {
            debug!(
                path = %path.display(),
                "Using credentials file from {}",
                env::APPLICATION_CREDENTIALS
            );
            return self.resolve_file(path).await;
        }

        if let Some(path) = self.well_known_file.as_deref().filter(|p| p.is_file()) {
            debug!(path = %path.display(), "Using gcloud application default credentials");
            return self.resolve_file(path).await;
        }

        self.metadata.resolve().await.map_err(|e| {
            BackendError::Authentication(format!(
                "no application default credentials found ({} and {} are unset, \
                 no gcloud credentials file, {e})",
                env::ACCESS_TOKEN,
                env::APPLICATION_CREDENTIALS
            ))
        })
    }
}

/// Location gcloud writes application default credentials to
fn well_known_file() -> Option<PathBuf> {
    #[cfg(windows)]
    let base = dirs::config_dir();
    #[cfg(not(windows))]
    let base = dirs::home_dir().map(|home| home.join(".config"));

    base.map(|dir| dir.join("gcloud").join(WELL_KNOWN_FILE))
}
