//! Service account JSON key credentials
//!
//! Signs a short-lived RS256 assertion with the key's private key and trades it
//! for an access token (`urn:ietf:params:oauth:grant-type:jwt-bearer`).
//!
//! API Reference: https://developers.google.com/identity/protocols/oauth2/service-account#httprest

use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

use super::{fetch_token, AccessToken, CredentialProvider};
use crate::constants::{CLOUD_PLATFORM_SCOPE, DEFAULT_TOKEN_URI, JWT_ASSERTION_LIFETIME_SECS};
use crate::error::BackendError;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Fields of a `"type": "service_account"` key file used for token minting
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

/// Claims of the self-signed assertion
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: u64,
    pub exp: u64,
}

/// Credentials backed by a service account key
#[derive(Clone)]
pub struct ServiceAccountCredentials {
    http_client: Client,
    client_email: String,
    key_id: Option<String>,
    token_uri: String,
    encoding_key: EncodingKey,
}

impl fmt::Debug for ServiceAccountCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountCredentials")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountCredentials {
    /// Build credentials from a parsed key
    ///
    /// # Errors
    /// Returns [`BackendError::Authentication`] if the private key is not a valid RSA PEM key
    pub fn new(http_client: Client, key: ServiceAccountKey) -> Result<Self, BackendError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            BackendError::Authentication(format!(
                "invalid private key for {}: {e}",
                key.client_email
            ))
        })?;

        Ok(Self {
            http_client,
            client_email: key.client_email,
            key_id: key.private_key_id,
            token_uri: key
                .token_uri
                .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
            encoding_key,
        })
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    /// Sign the assertion presented to the token endpoint
    pub(crate) fn sign_assertion(&self) -> Result<String, BackendError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| BackendError::Authentication(format!("system clock error: {e}")))?
            .as_secs();

        let claims = AssertionClaims {
            iss: self.client_email.clone(),
            scope: CLOUD_PLATFORM_SCOPE.to_string(),
            aud: self.token_uri.clone(),
            iat: now,
            exp: now + JWT_ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid.clone_from(&self.key_id);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| BackendError::Authentication(format!("failed to sign assertion: {e}")))
    }
}

#[async_trait]
impl CredentialProvider for ServiceAccountCredentials {
    async fn resolve(&self) -> Result<AccessToken, BackendError> {
        debug!(
            client_email = %self.client_email,
            token_uri = %self.token_uri,
            "Exchanging service account assertion for an access token"
        );
        let assertion = self.sign_assertion()?;
        let request = self
            .http_client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)]);
        fetch_token(request, "token endpoint").await
    }
}
