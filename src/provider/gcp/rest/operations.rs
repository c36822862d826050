//! # Operations
//!
//! Implementation of [`SecretBackend`] for the GCP Secret Manager REST API.

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Method;
use std::str::FromStr;
use tracing::debug;

use super::requests::{AddVersionRequest, CreateSecretRequest};
use super::responses::{AccessSecretVersionResponse, ListSecretsResponse, Secret, SecretVersion};
use super::SecretManagerRest;
use crate::error::BackendError;
use crate::payload::SecretPayload;
use crate::paths::{ParentPath, PathError, SecretPath, VersionPath};
use crate::provider::{Expiration, SecretBackend, SecretPage};

/// Parse a resource name reported by the service
fn parse_name<T>(name: &str) -> Result<T, BackendError>
where
    T: FromStr<Err = PathError>,
{
    name.parse()
        .map_err(|e: PathError| BackendError::Decode(format!("unexpected resource name: {e}")))
}

/// Decode one element of a `secrets` array
fn decode_secret_record(record: &serde_json::Value) -> Result<SecretPath, BackendError> {
    let name = record
        .get("name")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| BackendError::Decode(format!("secret record without a name: {record}")))?;
    parse_name(name)
}

#[async_trait]
impl SecretBackend for SecretManagerRest {
    async fn create_secret(
        &self,
        secret: &SecretPath,
        expiration: &Expiration,
    ) -> Result<SecretPath, BackendError> {
        let path = format!("{}/secrets", secret.parent());
        let body = CreateSecretRequest::new(expiration.ttl_string());

        let request = self
            .make_request(Method::POST, &path)
            .query(&[("secretId", secret.secret_id())])
            .json(&body);
        let created: Secret = self.send(request).await?.json().await?;

        debug!(secret.name = %created.name, "Created secret");
        parse_name(&created.name)
    }

    async fn add_secret_version(
        &self,
        secret: &SecretPath,
        payload: &[u8],
    ) -> Result<VersionPath, BackendError> {
        let path = format!("{secret}:addVersion");
        let body = AddVersionRequest::new(general_purpose::STANDARD.encode(payload));

        let request = self.make_request(Method::POST, &path).json(&body);
        let version: SecretVersion = self.send(request).await?.json().await?;

        debug!(version.name = %version.name, "Added secret version");
        parse_name(&version.name)
    }

    async fn access_secret_version(
        &self,
        version: &VersionPath,
    ) -> Result<SecretPayload, BackendError> {
        let path = format!("{version}:access");

        let request = self.make_request(Method::GET, &path);
        let accessed: AccessSecretVersionResponse = self.send(request).await?.json().await?;

        let decoded = general_purpose::STANDARD
            .decode(accessed.payload.data.as_bytes())
            .map_err(|e| {
                BackendError::Decode(format!("payload of {} is not base64: {e}", accessed.name))
            })?;

        debug!(version.name = %accessed.name, "Accessed secret version");
        Ok(SecretPayload::new(decoded))
    }

    async fn delete_secret(&self, secret: &SecretPath) -> Result<(), BackendError> {
        let request = self.make_request(Method::DELETE, &secret.to_string());
        self.send(request).await?;
        debug!(secret.name = %secret, "Deleted secret");
        Ok(())
    }

    async fn list_secrets_page(
        &self,
        parent: &ParentPath,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<SecretPage, BackendError> {
        let path = format!("{parent}/secrets");

        let mut request = self
            .make_request(Method::GET, &path)
            .query(&[("pageSize", page_size)]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let page: ListSecretsResponse = self.send(request).await?.json().await?;
        debug!(
            parent = %parent,
            records = page.secrets.len(),
            has_next = page.next_page_token.as_deref().is_some_and(|t| !t.is_empty()),
            "Fetched secret listing page"
        );

        Ok(SecretPage {
            records: page.secrets.iter().map(decode_secret_record).collect(),
            next_page_token: page.next_page_token.filter(|t| !t.is_empty()),
        })
    }
}
