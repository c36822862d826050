//! In-memory backend for façade tests

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{BackendError, ErrorKind};
use crate::payload::SecretPayload;
use crate::paths::{ParentPath, SecretPath, VersionPath, VersionSpec};
use crate::provider::{Connector, Expiration, SecretBackend, SecretPage};

fn status(kind: ErrorKind, code: u16, status: &str, message: String) -> BackendError {
    BackendError::Status {
        kind,
        code,
        status: status.to_string(),
        message,
    }
}

fn not_found(name: impl std::fmt::Display) -> BackendError {
    status(ErrorKind::NotFound, 404, "NOT_FOUND", format!("{name} not found"))
}

#[derive(Debug, Default)]
pub(super) struct State {
    /// Secret name -> (expiration, versions in order)
    pub secrets: BTreeMap<String, (Expiration, Vec<Vec<u8>>)>,
    /// Listing positions at which an undecodable record is reported
    pub corrupt_positions: Vec<usize>,
    /// Page index (0-based) whose fetch fails
    pub failing_page: Option<usize>,
    /// Error returned by `connect`
    pub connect_error: Option<ErrorKind>,
    pub pages_fetched: usize,
}

#[derive(Debug, Clone)]
pub(super) struct FakeConnector {
    pub state: Arc<Mutex<State>>,
    pub connects: Arc<AtomicUsize>,
    pub page_size: u32,
}

impl FakeConnector {
    pub fn new(page_size: u32) -> Self {
        Self {
            state: Arc::default(),
            connects: Arc::default(),
            page_size,
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(&self) -> Result<Box<dyn SecretBackend>, BackendError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        match self.with_state(|s| s.connect_error) {
            Some(ErrorKind::Authentication) => Err(BackendError::Authentication(
                "no application default credentials found".to_string(),
            )),
            Some(_) => Err(BackendError::Connection("endpoint unreachable".to_string())),
            None => Ok(Box::new(FakeBackend {
                state: Arc::clone(&self.state),
            })),
        }
    }

    fn page_size(&self) -> u32 {
        self.page_size
    }
}

#[derive(Debug)]
struct FakeBackend {
    state: Arc<Mutex<State>>,
}

#[async_trait]
impl SecretBackend for FakeBackend {
    async fn create_secret(
        &self,
        secret: &SecretPath,
        expiration: &Expiration,
    ) -> Result<SecretPath, BackendError> {
        let mut state = self.state.lock().unwrap();
        let name = secret.to_string();
        if state.secrets.contains_key(&name) {
            return Err(status(
                ErrorKind::AlreadyExists,
                409,
                "ALREADY_EXISTS",
                format!("Secret [{name}] already exists."),
            ));
        }
        state.secrets.insert(name, (*expiration, Vec::new()));
        Ok(secret.clone())
    }

    async fn add_secret_version(
        &self,
        secret: &SecretPath,
        payload: &[u8],
    ) -> Result<VersionPath, BackendError> {
        let mut state = self.state.lock().unwrap();
        let (_, versions) = state
            .secrets
            .get_mut(&secret.to_string())
            .ok_or_else(|| not_found(secret))?;
        versions.push(payload.to_vec());
        let number = NonZeroU64::new(versions.len() as u64).unwrap();
        Ok(secret.version(VersionSpec::Number(number)))
    }

    async fn access_secret_version(
        &self,
        version: &VersionPath,
    ) -> Result<SecretPayload, BackendError> {
        let state = self.state.lock().unwrap();
        let (_, versions) = state
            .secrets
            .get(&version.secret().to_string())
            .ok_or_else(|| not_found(version))?;
        let data = match version.version() {
            VersionSpec::Latest => versions.last(),
            VersionSpec::Number(n) => usize::try_from(n.get() - 1)
                .ok()
                .and_then(|i| versions.get(i)),
        };
        data.map(|d| SecretPayload::new(d.clone()))
            .ok_or_else(|| not_found(version))
    }

    async fn delete_secret(&self, secret: &SecretPath) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        state
            .secrets
            .remove(&secret.to_string())
            .map(|_| ())
            .ok_or_else(|| not_found(secret))
    }

    async fn list_secrets_page(
        &self,
        parent: &ParentPath,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<SecretPage, BackendError> {
        let mut state = self.state.lock().unwrap();
        let page_index = state.pages_fetched;
        state.pages_fetched += 1;
        if state.failing_page == Some(page_index) {
            return Err(status(
                ErrorKind::Backend,
                500,
                "INTERNAL",
                "internal error".to_string(),
            ));
        }

        let prefix = format!("{parent}/secrets/");
        let mut all: Vec<Result<SecretPath, BackendError>> = state
            .secrets
            .keys()
            .filter(|name| name.starts_with(&prefix))
            .map(|name| Ok(name.parse::<SecretPath>().unwrap()))
            .collect();
        for &position in &state.corrupt_positions {
            let position = position.min(all.len());
            all.insert(
                position,
                Err(BackendError::Decode("secret record without a name".to_string())),
            );
        }

        let total = all.len();
        let start: usize = page_token.map_or(0, |t| t.parse().unwrap());
        let end = (start + page_size as usize).min(total);
        let records = all.drain(start..end).collect();
        let next_page_token = (end < total).then(|| end.to_string());
        Ok(SecretPage {
            records,
            next_page_token,
        })
    }
}
