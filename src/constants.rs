//! # Constants
//!
//! Shared constants used throughout the client.
//!
//! These values represent reasonable defaults and can be overridden via
//! configuration or environment variables where applicable.

/// Production endpoint of the Secret Manager REST API
pub const DEFAULT_SECRET_MANAGER_ENDPOINT: &str = "https://secretmanager.googleapis.com";

/// Default number of secrets requested per listing page
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Largest page size accepted by the Secret Manager API
pub const MAX_PAGE_SIZE: u32 = 25_000;

/// Secret Manager payload size limit: 64KB
///
/// Applies to the decoded payload, not the base64 encoded wire form.
pub const MAX_PAYLOAD_BYTES: usize = 64 * 1024;

/// Project id length bounds (project numbers are not bounded here)
pub const MIN_PROJECT_ID_LEN: usize = 6;
pub const MAX_PROJECT_ID_LEN: usize = 30;

/// Longest secret id the backend accepts
pub const MAX_SECRET_ID_LEN: usize = 255;

/// Version alias resolving to the most recently added version
pub const LATEST_VERSION_ALIAS: &str = "latest";

/// OAuth2 scope requested for Secret Manager access
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Default OAuth2 token endpoint for user and service account credentials
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Metadata server endpoint handing out tokens for the attached service account
pub const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Lifetime requested for self-signed service account assertions (seconds)
pub const JWT_ASSERTION_LIFETIME_SECS: u64 = 3600;

/// Environment variable names
pub mod env {
    /// Project id used by the CLI to build the parent namespace
    pub const PROJECT: &str = "GOOGLE_PROJECT_NAME";
    /// Optional TTL (seconds) applied by the CLI to created secrets
    pub const TTL_SECONDS: &str = "KNOCK_TTL_SECONDS";
    /// Override of the REST endpoint (emulators, mock servers)
    pub const ENDPOINT: &str = "SECRET_MANAGER_ENDPOINT";
    /// Listing page size
    pub const PAGE_SIZE: &str = "KNOCK_PAGE_SIZE";
    /// Optional transport timeout (seconds)
    pub const REQUEST_TIMEOUT_SECS: &str = "KNOCK_REQUEST_TIMEOUT_SECS";
    /// Pre-minted OAuth2 access token
    pub const ACCESS_TOKEN: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";
    /// Path to a service account or authorized user JSON file
    pub const APPLICATION_CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";
}
