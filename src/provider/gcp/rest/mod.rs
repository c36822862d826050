//! GCP Secret Manager REST Client
//!
//! Native REST implementation for GCP Secret Manager API v1.
//! Uses reqwest with rustls (no OpenSSL dependencies).
//!
//! References:
//! - [GCP Secret Manager REST API v1](https://cloud.google.com/secret-manager/docs/reference/rest)

mod operations;
mod requests;
mod responses;

pub use requests::*;
pub use responses::*;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use tracing::debug;

use crate::auth::AccessToken;
use crate::error::{BackendError, ErrorKind};

const USER_PROJECT_HEADER: &str = "x-goog-user-project";

/// Authenticated session against the Secret Manager REST API
pub struct SecretManagerRest {
    http_client: Client,
    base_url: String,
    access_token: AccessToken,
}

impl std::fmt::Debug for SecretManagerRest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretManagerRest")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl SecretManagerRest {
    pub fn new(http_client: Client, base_url: String, access_token: AccessToken) -> Self {
        Self {
            http_client,
            base_url,
            access_token,
        }
    }

    /// Build an authenticated request for `{base_url}/v1/{path}`
    ///
    /// Tokens that carry a quota project bill the call to it.
    pub(crate) fn make_request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/v1/{}", self.base_url, path);
        let request = self
            .http_client
            .request(method, url)
            .bearer_auth(self.access_token.secret());
        match self.access_token.quota_project() {
            Some(project) => request.header(USER_PROJECT_HEADER, project),
            None => request,
        }
    }

    /// Send a request, turning any non-success status into a classified error
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let error_text = response.text().await.unwrap_or_default();
        Err(handle_error_response(status, &error_text))
    }
}

/// Classify a GCP API error response
///
/// The structured `status` string decides the kind; the HTTP code is only
/// used when the body carries no recognisable status.
pub(crate) fn handle_error_response(status: StatusCode, error_text: &str) -> BackendError {
    match serde_json::from_str::<GcpErrorResponse>(error_text) {
        Ok(GcpErrorResponse { error }) => {
            let code = if error.code == 0 { status.as_u16() } else { error.code };
            let kind =
                ErrorKind::from_status(&error.status).unwrap_or_else(|| ErrorKind::from_http(code));
            BackendError::Status {
                kind,
                code,
                status: error.status,
                message: error.message,
            }
        }
        Err(e) => {
            debug!(error = %e, "Error response is not a GCP error document");
            BackendError::Status {
                kind: ErrorKind::from_http(status.as_u16()),
                code: status.as_u16(),
                status: status.canonical_reason().unwrap_or("UNKNOWN").to_string(),
                message: error_text.trim().to_string(),
            }
        }
    }
}
