//! # Request Types
//!
//! GCP Secret Manager REST API request structures.
//!
//! https://cloud.google.com/secret-manager/docs/reference/rest

use serde::Serialize;

use super::responses::{AutomaticReplication, PayloadData, Replication};

/// Request body for creating a new secret
///
/// Used in `POST /v1/projects/{project}/secrets?secretId={id}`. This creates
/// the secret metadata only; values are added with [`AddVersionRequest`].
///
/// API Reference: https://cloud.google.com/secret-manager/docs/reference/rest/v1/projects.secrets/create
#[derive(Debug, Serialize)]
pub struct CreateSecretRequest {
    pub replication: Replication,
    /// Time-to-live in the protobuf duration format (`"60s"`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
}

impl CreateSecretRequest {
    /// Automatic replication with an optional TTL
    pub fn new(ttl: Option<String>) -> Self {
        Self {
            replication: Replication {
                automatic: Some(AutomaticReplication {}),
            },
            ttl,
        }
    }
}

/// Request body for `POST /v1/projects/{project}/secrets/{secret}:addVersion`
///
/// The payload data must be base64-encoded before sending.
#[derive(Debug, Serialize)]
pub struct AddVersionRequest {
    pub payload: PayloadData,
}

impl AddVersionRequest {
    pub fn new(encoded: String) -> Self {
        Self {
            payload: PayloadData { data: encoded },
        }
    }
}
