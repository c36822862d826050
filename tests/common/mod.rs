//! Common test utilities for integration tests
//!
//! Provides rustls crypto provider setup and an in-process Axum mock of the
//! Secret Manager REST API v1 plus the OAuth2 token endpoints.

#![allow(dead_code, reason = "Each test binary uses a different subset of the helpers")]

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use base64::{engine::general_purpose, Engine as _};
use knock::prelude::*;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, Once};

static RUSTLS_INIT: Once = Once::new();

/// Token the mock API accepts and the mock token endpoints hand out
pub const MOCK_TOKEN: &str = "mock-token";

/// Path of the metadata server token endpoint
pub const METADATA_TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";

/// Initialize rustls crypto provider for tests
///
/// Uses a `Once` to ensure it's only called once per test binary.
pub fn init_rustls() {
    RUSTLS_INIT.call_once(|| {
        rustls::crypto::ring::default_provider()
            .install_default()
            .expect("Failed to install rustls crypto provider");
    });
}

#[derive(Debug, Default)]
pub struct MockSecret {
    pub ttl: Option<String>,
    pub versions: Vec<Vec<u8>>,
}

/// Server-side state, inspectable and adjustable from tests
#[derive(Debug, Default)]
pub struct MockState {
    pub secrets: BTreeMap<String, MockSecret>,
    /// Raw bodies of create requests
    pub create_bodies: Vec<Value>,
    /// Query parameters of every list request
    pub list_requests: Vec<HashMap<String, String>>,
    /// Listing positions at which a record without a name is returned
    pub corrupt_positions: Vec<usize>,
    /// Index (0-based) of the list request that fails with INTERNAL
    pub failing_list_request: Option<usize>,
    /// Answer every access with PERMISSION_DENIED
    pub deny_access: bool,
    /// Form bodies posted to the OAuth2 token endpoint
    pub token_requests: Vec<HashMap<String, String>>,
    /// Error status the OAuth2 token endpoint answers with
    pub token_status: Option<u16>,
    pub metadata_requests: usize,
    /// `x-goog-user-project` header of every authenticated API request
    pub user_projects: Vec<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct SharedState(Arc<Mutex<MockState>>);

impl SharedState {
    pub fn lock(&self) -> MutexGuard<'_, MockState> {
        self.0.lock().unwrap()
    }
}

/// Running mock server
#[derive(Debug)]
pub struct MockSecretManager {
    pub base_url: String,
    pub state: SharedState,
}

impl MockSecretManager {
    pub async fn start() -> Self {
        init_rustls();
        let state = SharedState::default();

        let app = Router::new()
            .route("/token", post(token_endpoint))
            .route(METADATA_TOKEN_PATH, get(metadata_endpoint))
            .fallback(secret_manager)
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn token_uri(&self) -> String {
        format!("{}/token", self.base_url)
    }

    pub fn metadata_token_url(&self) -> String {
        format!("{}{METADATA_TOKEN_PATH}", self.base_url)
    }

    pub fn config(&self, page_size: u32) -> ClientConfig {
        ClientConfig::default()
            .with_endpoint(&self.base_url)
            .with_page_size(page_size)
    }

    /// Client authenticating with the accepted static token
    pub fn client(&self, page_size: u32) -> SecretClient {
        self.client_with(page_size, Arc::new(StaticToken::new(MOCK_TOKEN)))
    }

    pub fn client_with(
        &self,
        page_size: u32,
        credentials: Arc<dyn CredentialProvider>,
    ) -> SecretClient {
        SecretClient::gcp(self.config(page_size), credentials).unwrap()
    }
}

fn error(code: StatusCode, status: &str, message: impl Into<String>) -> Response {
    let body = json!({
        "error": {
            "code": code.as_u16(),
            "message": message.into(),
            "status": status,
        }
    });
    (code, Json(body)).into_response()
}

fn not_found(name: &str) -> Response {
    error(
        StatusCode::NOT_FOUND,
        "NOT_FOUND",
        format!("Secret [{name}] not found or has no versions."),
    )
}

async fn token_endpoint(
    State(state): State<SharedState>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let status = {
        let mut state = state.lock();
        state.token_requests.push(form);
        state.token_status
    };
    if let Some(code) = status {
        let code = StatusCode::from_u16(code).unwrap();
        let body = if code.is_server_error() {
            json!({"error": "backend_error"})
        } else {
            json!({"error": "invalid_grant", "error_description": "Invalid JWT Signature."})
        };
        return (code, Json(body)).into_response();
    }
    Json(json!({
        "access_token": MOCK_TOKEN,
        "expires_in": 3599,
        "token_type": "Bearer",
    }))
    .into_response()
}

async fn metadata_endpoint(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    state.lock().metadata_requests += 1;
    let flavored = headers
        .get("Metadata-Flavor")
        .and_then(|v| v.to_str().ok())
        == Some("Google");
    if !flavored {
        return (StatusCode::FORBIDDEN, "Missing Metadata-Flavor:Google header.").into_response();
    }
    Json(json!({
        "access_token": MOCK_TOKEN,
        "expires_in": 3599,
        "token_type": "Bearer",
    }))
    .into_response()
}

async fn secret_manager(
    State(state): State<SharedState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let expected = format!("Bearer {MOCK_TOKEN}");
    let presented = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    if presented != Some(expected.as_str()) {
        return error(
            StatusCode::UNAUTHORIZED,
            "UNAUTHENTICATED",
            "Request had invalid authentication credentials.",
        );
    }

    let user_project = headers
        .get("x-goog-user-project")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.lock().user_projects.push(user_project);

    let Some(rest) = uri.path().strip_prefix("/v1/") else {
        return error(StatusCode::NOT_FOUND, "NOT_FOUND", "unknown route");
    };
    let segments: Vec<&str> = rest.split('/').collect();
    let mut state = state.lock();

    match (method.as_str(), segments.as_slice()) {
        ("GET", ["projects", project, "secrets"]) => list_secrets(&mut state, project, &params),
        ("POST", ["projects", project, "secrets"]) => {
            create_secret(&mut state, project, &params, &body)
        }
        ("DELETE", ["projects", project, "secrets", secret]) => {
            let name = format!("projects/{project}/secrets/{secret}");
            match state.secrets.remove(&name) {
                Some(_) => Json(json!({})).into_response(),
                None => not_found(&name),
            }
        }
        ("POST", ["projects", project, "secrets", action]) => match action.split_once(':') {
            Some((secret, "addVersion")) => add_version(&mut state, project, secret, &body),
            _ => error(StatusCode::NOT_FOUND, "NOT_FOUND", "unknown action"),
        },
        ("GET", ["projects", project, "secrets", secret, "versions", action]) => {
            match action.split_once(':') {
                Some((version, "access")) => access_version(&state, project, secret, version),
                _ => error(StatusCode::NOT_FOUND, "NOT_FOUND", "unknown action"),
            }
        }
        _ => error(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("no route for {method} {}", uri.path()),
        ),
    }
}

fn create_secret(
    state: &mut MockState,
    project: &str,
    params: &HashMap<String, String>,
    body: &[u8],
) -> Response {
    let Some(secret_id) = params.get("secretId") else {
        return error(StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", "secretId is required");
    };
    let Ok(body) = serde_json::from_slice::<Value>(body) else {
        return error(StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", "invalid JSON body");
    };
    if !body["replication"]["automatic"].is_object() {
        return error(
            StatusCode::BAD_REQUEST,
            "INVALID_ARGUMENT",
            "replication policy is required",
        );
    }

    let name = format!("projects/{project}/secrets/{secret_id}");
    if state.secrets.contains_key(&name) {
        return error(
            StatusCode::CONFLICT,
            "ALREADY_EXISTS",
            format!("Secret [{name}] already exists."),
        );
    }

    let ttl = body["ttl"].as_str().map(str::to_string);
    state.create_bodies.push(body);
    state.secrets.insert(
        name.clone(),
        MockSecret {
            ttl,
            versions: Vec::new(),
        },
    );
    Json(json!({
        "name": name,
        "replication": {"automatic": {}},
        "createTime": "2024-01-01T00:00:00.000000Z",
    }))
    .into_response()
}

fn add_version(state: &mut MockState, project: &str, secret: &str, body: &[u8]) -> Response {
    let name = format!("projects/{project}/secrets/{secret}");
    let Some(entry) = state.secrets.get_mut(&name) else {
        return not_found(&name);
    };
    let data = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v["payload"]["data"].as_str().map(str::to_string))
        .and_then(|data| general_purpose::STANDARD.decode(data).ok());
    let Some(data) = data else {
        return error(
            StatusCode::BAD_REQUEST,
            "INVALID_ARGUMENT",
            "payload.data must be base64",
        );
    };

    entry.versions.push(data);
    Json(json!({
        "name": format!("{name}/versions/{}", entry.versions.len()),
        "state": "ENABLED",
    }))
    .into_response()
}

fn access_version(state: &MockState, project: &str, secret: &str, version: &str) -> Response {
    let name = format!("projects/{project}/secrets/{secret}");
    if state.deny_access {
        return error(
            StatusCode::FORBIDDEN,
            "PERMISSION_DENIED",
            format!(
                "Permission 'secretmanager.versions.access' denied \
                 for resource '{name}/versions/{version}'"
            ),
        );
    }
    let Some(entry) = state.secrets.get(&name) else {
        return not_found(&name);
    };
    let number = match version {
        "latest" => entry.versions.len(),
        n => n.parse().unwrap_or(0),
    };
    let Some(data) = number.checked_sub(1).and_then(|i| entry.versions.get(i)) else {
        return not_found(&format!("{name}/versions/{version}"));
    };

    Json(json!({
        "name": format!("{name}/versions/{number}"),
        "payload": {"data": general_purpose::STANDARD.encode(data)},
    }))
    .into_response()
}

fn list_secrets(
    state: &mut MockState,
    project: &str,
    params: &HashMap<String, String>,
) -> Response {
    let request_index = state.list_requests.len();
    state.list_requests.push(params.clone());
    if state.failing_list_request == Some(request_index) {
        return error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL",
            "Internal error encountered.",
        );
    }

    let prefix = format!("projects/{project}/secrets/");
    let mut records: Vec<Value> = state
        .secrets
        .keys()
        .filter(|name| name.starts_with(&prefix))
        .map(|name| json!({"name": name, "replication": {"automatic": {}}}))
        .collect();
    for &position in &state.corrupt_positions {
        let position = position.min(records.len());
        records.insert(position, json!({"replication": {"automatic": {}}}));
    }

    let page_size: usize = params
        .get("pageSize")
        .and_then(|s| s.parse().ok())
        .unwrap_or(25_000);
    let start: usize = params
        .get("pageToken")
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    let end = (start + page_size).min(records.len());
    let page: Vec<Value> = records.get(start..end).map(<[Value]>::to_vec).unwrap_or_default();

    if page.is_empty() {
        // The API omits empty repeated fields
        return Json(json!({})).into_response();
    }
    let mut body = json!({ "secrets": page, "totalSize": records.len() });
    if end < records.len() {
        body["nextPageToken"] = json!(end.to_string());
    }
    Json(body).into_response()
}
