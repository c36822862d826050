//! # Provider Modules
//!
//! Backend seam of the façade.
//!
//! - [`Connector`] opens a connection (resolving credentials on the way)
//! - [`SecretBackend`] is one open connection to the secret store
//!
//! The façade opens a connection per call and drops it afterwards, so
//! backends never need to be shared across operations.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

use crate::error::BackendError;
use crate::payload::SecretPayload;
use crate::paths::{ParentPath, SecretPath, VersionPath};

pub mod gcp;

/// Lifetime policy applied to a new secret
///
/// Replication is always automatic; expiration is the only per-secret choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expiration {
    /// Secret lives until deleted
    #[default]
    Never,
    /// Secret is deleted by the backend once the TTL has elapsed
    Ttl(Duration),
}

impl Expiration {
    /// TTL in the `"{seconds}s"` duration format of the REST API
    pub fn ttl_string(&self) -> Option<String> {
        match self {
            Self::Never => None,
            Self::Ttl(ttl) => Some(format!("{}s", ttl.as_secs())),
        }
    }
}

/// One page of a secret listing
///
/// Records keep their backend order. A record that could not be decoded is
/// reported in place as an error.
#[derive(Debug, Default)]
pub struct SecretPage {
    pub records: Vec<Result<SecretPath, BackendError>>,
    /// Token for the next page; `None` on the last page
    pub next_page_token: Option<String>,
}

/// An open connection to a secret store
#[async_trait]
pub trait SecretBackend: Send + Sync + fmt::Debug {
    /// Create a secret with automatic replication, returning the name the store assigned
    async fn create_secret(
        &self,
        secret: &SecretPath,
        expiration: &Expiration,
    ) -> Result<SecretPath, BackendError>;

    /// Append a version, returning its name
    async fn add_secret_version(
        &self,
        secret: &SecretPath,
        payload: &[u8],
    ) -> Result<VersionPath, BackendError>;

    /// Read the payload of a version
    async fn access_secret_version(
        &self,
        version: &VersionPath,
    ) -> Result<SecretPayload, BackendError>;

    /// Delete a secret and all of its versions
    async fn delete_secret(&self, secret: &SecretPath) -> Result<(), BackendError>;

    /// Fetch one page of secrets under `parent`
    async fn list_secrets_page(
        &self,
        parent: &ParentPath,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<SecretPage, BackendError>;
}

/// Factory of backend connections
#[async_trait]
pub trait Connector: Send + Sync + fmt::Debug {
    /// Resolve credentials and open a connection
    ///
    /// # Errors
    /// Returns [`BackendError::Authentication`] when no usable credentials
    /// exist and a connection error for any other setup failure
    async fn connect(&self) -> Result<Box<dyn SecretBackend>, BackendError>;

    /// Page size requested when listing
    fn page_size(&self) -> u32;
}
