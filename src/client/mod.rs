//! # Secret Client
//!
//! Lifecycle façade over a secret store: probe, create, add version, access,
//! delete and list.
//!
//! Every call opens its own connection through the injected [`Connector`] and
//! releases it before returning. Failures come back as [`SecretError`] with
//! the operation and the targeted path attached. Payloads are never logged.

mod listing;

pub use listing::SecretListing;

use futures::stream::BoxStream;
use futures::StreamExt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::field::Empty;
use tracing::{debug, info, info_span, warn, Instrument, Span};

use crate::auth::{CredentialProvider, DefaultCredentials};
use crate::config::ClientConfig;
use crate::constants::MAX_PAYLOAD_BYTES;
use crate::error::{BackendError, ErrorKind, Operation, SecretError};
use crate::observability::OperationTracker;
use crate::payload::SecretPayload;
use crate::paths::{ParentPath, SecretPath, VersionPath};
use crate::provider::gcp::{http_client, GcpConnector};
use crate::provider::{Connector, Expiration};

/// Open an `info` span with the outcome fields the tracker fills in
macro_rules! operation_span {
    ($name:literal $(, $($fields:tt)*)?) => {
        info_span!(
            $name,
            $($($fields)*,)?
            operation.success = Empty,
            operation.duration_ms = Empty,
            error.kind = Empty
        )
    };
}

/// Client for the secret lifecycle operations
#[derive(Debug, Clone)]
pub struct SecretClient {
    connector: Arc<dyn Connector>,
}

impl SecretClient {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }

    /// Client for GCP Secret Manager with explicit credentials
    ///
    /// # Errors
    /// Returns a connection error if the configuration is invalid
    pub fn gcp(
        config: ClientConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, BackendError> {
        Ok(Self::new(Arc::new(GcpConnector::new(config, credentials)?)))
    }

    /// Client for GCP Secret Manager configured from the environment,
    /// authenticating with Application Default Credentials
    ///
    /// # Errors
    /// Returns a connection error if the environment holds an invalid configuration
    pub fn from_env() -> Result<Self, BackendError> {
        let config =
            ClientConfig::from_env().map_err(|e| BackendError::Connection(e.to_string()))?;
        let http = http_client(&config)?;
        let credentials = Arc::new(DefaultCredentials::from_env(http.clone()));
        let connector = GcpConnector::with_client(config, http, credentials)?;
        Ok(Self::new(Arc::new(connector)))
    }

    /// Check that credentials resolve and a connection can be opened
    ///
    /// Nothing is read from or written to the store.
    ///
    /// # Errors
    /// `Authentication` when no usable credentials exist, `Connection` for any
    /// other setup failure
    pub async fn knock(&self) -> Result<(), SecretError> {
        let span = operation_span!("secret.probe");
        execute(Operation::Probe, "connection".to_string(), span, async {
            drop(self.connector.connect().await?);
            Ok(())
        })
        .await
    }

    /// Create a secret with automatic replication
    ///
    /// With `ttl` the secret expires after that many whole seconds; without it
    /// the secret is permanent. Returns the secret path reported by the store.
    ///
    /// # Errors
    /// `AlreadyExists` if the id is taken, `InvalidArgument` for a malformed
    /// id or a TTL that is zero or not a whole number of seconds
    pub async fn create_secret(
        &self,
        parent: &ParentPath,
        secret_id: &str,
        ttl: Option<Duration>,
    ) -> Result<SecretPath, SecretError> {
        let target = format!("{parent}/secrets/{secret_id}");
        let span = operation_span!(
            "secret.create",
            project.id = parent.project_id(),
            secret.name = %target
        );

        execute(Operation::CreateSecret, target, span, async {
            let secret = parent.secret(secret_id)?;
            let expiration = expiration(ttl)?;
            let backend = self.connector.connect().await?;
            let created = backend.create_secret(&secret, &expiration).await?;
            info!(secret.name = %created, ttl_secs = ttl.map(|t| t.as_secs()), "Created secret");
            Ok(created)
        })
        .await
    }

    /// Append a version holding `payload` to `secret`
    ///
    /// The store assigns the ordinal and moves `latest` to the new version.
    ///
    /// # Errors
    /// `NotFound` if the secret does not exist, `Permission` if access is
    /// denied, `InvalidArgument` for an empty or oversized payload
    pub async fn add_secret_version(
        &self,
        secret: &SecretPath,
        payload: &[u8],
    ) -> Result<VersionPath, SecretError> {
        let target = secret.to_string();
        let span = operation_span!(
            "secret.add_version",
            project.id = secret.parent().project_id(),
            secret.name = %target,
            payload.bytes = payload.len()
        );

        execute(Operation::AddSecretVersion, target, span, async {
            validate_payload(payload)?;
            let backend = self.connector.connect().await?;
            let version = backend.add_secret_version(secret, payload).await?;
            info!(version.name = %version, "Added secret version");
            Ok(version)
        })
        .await
    }

    /// Read the payload of a version (`.../versions/{n}` or `.../versions/latest`)
    ///
    /// # Errors
    /// `NotFound` if the version or its secret does not exist, `Permission`
    /// if access is denied
    pub async fn access_secret_version(
        &self,
        version: &VersionPath,
    ) -> Result<SecretPayload, SecretError> {
        let target = version.to_string();
        let span = operation_span!(
            "secret.access_version",
            project.id = version.secret().parent().project_id(),
            secret.name = %target
        );

        execute(Operation::AccessSecretVersion, target, span, async {
            let backend = self.connector.connect().await?;
            let payload = backend.access_secret_version(version).await?;
            debug!(payload.bytes = payload.len(), "Retrieved secret payload");
            Ok(payload)
        })
        .await
    }

    /// Irreversibly delete a secret and all of its versions
    ///
    /// # Errors
    /// `NotFound` if the secret does not exist
    pub async fn delete_secret(&self, secret: &SecretPath) -> Result<(), SecretError> {
        let target = secret.to_string();
        let span = operation_span!(
            "secret.delete",
            project.id = secret.parent().project_id(),
            secret.name = %target
        );

        execute(Operation::DeleteSecret, target, span, async {
            let backend = self.connector.connect().await?;
            backend.delete_secret(secret).await?;
            info!("Deleted secret");
            Ok(())
        })
        .await
    }

    /// Lazily enumerate the secrets under `parent`, one backend page at a time
    ///
    /// A record that cannot be decoded is yielded as an error in place and the
    /// enumeration continues. A failure to connect or to fetch a page, and
    /// cancellation through `cancel`, yield a final error and end the stream.
    /// Each call starts over from the first page.
    pub fn list_secrets_stream(
        &self,
        parent: &ParentPath,
        cancel: CancellationToken,
    ) -> BoxStream<'static, Result<SecretPath, SecretError>> {
        let connector = Arc::clone(&self.connector);
        let parent = parent.clone();
        let span = operation_span!(
            "secret.list",
            project.id = parent.project_id(),
            secrets.count = Empty
        );

        let stream = async_stream::stream! {
            let tracker = OperationTracker::new(Operation::ListSecrets, span.clone());
            let target = parent.to_string();
            let fail =
                |e: BackendError| SecretError::new(Operation::ListSecrets, target.clone(), e);

            let connected = tokio::select! {
                biased;
                () = cancel.cancelled() => Err(BackendError::Cancelled),
                connected = connector.connect().instrument(span.clone()) => connected,
            };
            let backend = match connected {
                Ok(backend) => backend,
                Err(e) => {
                    tracker.record_error(e.kind());
                    yield Err(fail(e));
                    return;
                }
            };

            let page_size = connector.page_size();
            let mut page_token: Option<String> = None;
            let mut count: u64 = 0;
            loop {
                let fetched = tokio::select! {
                    biased;
                    () = cancel.cancelled() => Err(BackendError::Cancelled),
                    page = backend
                        .list_secrets_page(&parent, page_size, page_token.as_deref())
                        .instrument(span.clone()) => page,
                };
                let page = match fetched {
                    Ok(page) => page,
                    Err(e) => {
                        span.record("secrets.count", count);
                        tracker.record_error(e.kind());
                        yield Err(fail(e));
                        return;
                    }
                };

                for record in page.records {
                    if cancel.is_cancelled() {
                        span.record("secrets.count", count);
                        tracker.record_error(ErrorKind::Cancelled);
                        yield Err(fail(BackendError::Cancelled));
                        return;
                    }
                    if let Err(e) = &record {
                        span.in_scope(|| warn!(error = %e, "Skipping undecodable secret record"));
                    }
                    count += 1;
                    yield record.map_err(&fail);
                }

                match page.next_page_token {
                    Some(token) => page_token = Some(token),
                    None => break,
                }
            }

            span.record("secrets.count", count);
            tracker.record_success();
        };

        stream.boxed()
    }

    /// Enumerate every secret under `parent`
    ///
    /// Returns positionally aligned names and errors; see [`SecretListing`].
    pub async fn list_secrets(
        &self,
        parent: &ParentPath,
        cancel: CancellationToken,
    ) -> SecretListing {
        let mut listing = SecretListing::default();
        let mut stream = self.list_secrets_stream(parent, cancel);
        while let Some(item) = stream.next().await {
            listing.push(item);
        }
        listing
    }
}

/// Run one façade operation inside `span`, recording its outcome
async fn execute<T, F>(
    operation: Operation,
    target: String,
    span: Span,
    work: F,
) -> Result<T, SecretError>
where
    F: Future<Output = Result<T, BackendError>>,
{
    let tracker = OperationTracker::new(operation, span.clone());
    let result = tracker.finish(work.instrument(span.clone()).await, BackendError::kind);
    result.map_err(|e| {
        span.in_scope(|| debug!(error = %e, kind = %e.kind(), "{operation} failed"));
        SecretError::new(operation, target, e)
    })
}

fn expiration(ttl: Option<Duration>) -> Result<Expiration, BackendError> {
    match ttl {
        None => Ok(Expiration::Never),
        Some(ttl) if ttl.is_zero() || ttl.subsec_nanos() != 0 => Err(BackendError::InvalidArgument(
            format!("ttl must be a positive whole number of seconds, got {ttl:?}"),
        )),
        Some(ttl) => Ok(Expiration::Ttl(ttl)),
    }
}

fn validate_payload(payload: &[u8]) -> Result<(), BackendError> {
    if payload.is_empty() {
        return Err(BackendError::InvalidArgument("payload is empty".to_string()));
    }
    if payload.len() > MAX_PAYLOAD_BYTES {
        return Err(BackendError::InvalidArgument(format!(
            "payload of {} bytes exceeds the {MAX_PAYLOAD_BYTES} byte limit",
            payload.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod fake;
