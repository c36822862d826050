//! # Response Types
//!
//! GCP Secret Manager REST API response structures.
//!
//! https://cloud.google.com/secret-manager/docs/reference/rest

use serde::{Deserialize, Serialize};

/// Replication configuration for a secret
///
/// API Reference: https://cloud.google.com/secret-manager/docs/reference/rest/v1/Replication
#[derive(Debug, Serialize, Deserialize)]
pub struct Replication {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automatic: Option<AutomaticReplication>,
}

/// Automatic replication: the secret is replicated without location restrictions
#[allow(
    clippy::empty_structs_with_brackets,
    reason = "Must serialize as an empty JSON object, not null"
)]
#[derive(Debug, Serialize, Deserialize)]
pub struct AutomaticReplication {}

/// Base64-encoded secret data
///
/// API Reference: https://cloud.google.com/secret-manager/docs/reference/rest/v1/SecretPayload
#[derive(Serialize, Deserialize)]
pub struct PayloadData {
    pub data: String,
}

impl std::fmt::Debug for PayloadData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadData")
            .field("data", &"[REDACTED]")
            .finish()
    }
}

/// Secret resource, as returned by create
#[derive(Debug, Deserialize)]
pub struct Secret {
    /// Resource name in the format `projects/*/secrets/*`
    pub name: String,
}

/// Secret version metadata, as returned by addVersion
#[derive(Debug, Deserialize)]
pub struct SecretVersion {
    /// Resource name in the format `projects/*/secrets/*/versions/*`
    pub name: String,
}

/// Response of `GET /v1/{name=projects/*/secrets/*/versions/*}:access`
#[derive(Debug, Deserialize)]
pub struct AccessSecretVersionResponse {
    /// Resolved version name (an ordinal even when `latest` was requested)
    pub name: String,
    pub payload: PayloadData,
}

/// Response of `GET /v1/{parent=projects/*}/secrets`
///
/// Secrets are kept as raw JSON so one undecodable record does not fail the
/// whole page.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSecretsResponse {
    #[serde(default)]
    pub secrets: Vec<serde_json::Value>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// GCP API error response wrapper
///
/// API Reference: https://cloud.google.com/apis/design/errors
#[derive(Debug, Deserialize)]
pub struct GcpErrorResponse {
    pub error: GcpError,
}

#[derive(Debug, Deserialize)]
pub struct GcpError {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    /// Canonical status (`NOT_FOUND`, `PERMISSION_DENIED`, ...)
    #[serde(default)]
    pub status: String,
}
