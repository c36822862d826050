//! # GCP Secret Manager
//!
//! [`Connector`] for Google Cloud Secret Manager over the REST API v1.
//!
//! A single `reqwest::Client` (and its connection pool) is kept by the
//! connector; every `connect` resolves a fresh token and hands out a
//! lightweight [`SecretManagerRest`] session bound to it.

pub mod rest;

pub use rest::SecretManagerRest;

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tracing::debug;

use crate::auth::CredentialProvider;
use crate::config::ClientConfig;
use crate::error::BackendError;
use crate::provider::{Connector, SecretBackend};

/// Build the HTTP client used for API and token requests
///
/// # Errors
/// Returns an error if the TLS backend cannot be initialised
pub fn http_client(config: &ClientConfig) -> Result<Client, BackendError> {
    let mut builder = Client::builder().user_agent(concat!("knock/", env!("CARGO_PKG_VERSION")));
    if let Some(timeout) = config.request_timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| BackendError::Connection(format!("failed to create HTTP client: {e}")))
}

/// Opens authenticated sessions against the Secret Manager REST API
#[derive(Debug, Clone)]
pub struct GcpConnector {
    config: ClientConfig,
    http_client: Client,
    credentials: Arc<dyn CredentialProvider>,
}

impl GcpConnector {
    /// Create a connector with its own HTTP client
    ///
    /// # Errors
    /// Returns a connection error if the configuration is invalid or the
    /// HTTP client cannot be built
    pub fn new(
        config: ClientConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, BackendError> {
        let http_client = http_client(&config)?;
        Self::with_client(config, http_client, credentials)
    }

    /// Create a connector sharing an existing HTTP client
    ///
    /// # Errors
    /// Returns a connection error if the configuration is invalid
    pub fn with_client(
        config: ClientConfig,
        http_client: Client,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, BackendError> {
        config
            .validate()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        Ok(Self {
            config,
            http_client,
            credentials,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl Connector for GcpConnector {
    async fn connect(&self) -> Result<Box<dyn SecretBackend>, BackendError> {
        let access_token = self.credentials.resolve().await?;
        debug!(endpoint = %self.config.endpoint, "Opened Secret Manager session");
        Ok(Box::new(SecretManagerRest::new(
            self.http_client.clone(),
            self.config.endpoint.clone(),
            access_token,
        )))
    }

    fn page_size(&self) -> u32 {
        self.config.page_size
    }
}
