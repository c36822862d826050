//! # Errors
//!
//! Error taxonomy shared by the façade, the REST backend and the credential
//! providers.
//!
//! Backends return [`BackendError`]. The façade wraps every failure into a
//! [`SecretError`] carrying the operation name and the target path, so callers
//! always know what was attempted against which resource. Classification into
//! an [`ErrorKind`] comes from the structured status the service reports,
//! never from the human-readable message.

use std::fmt;
use thiserror::Error;

use crate::paths::PathError;

/// Coarse classification of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No usable ambient credentials, or the service rejected them
    Authentication,
    /// Transport or setup failure unrelated to credentials
    Connection,
    /// Duplicate secret id on create
    AlreadyExists,
    /// The targeted secret or version does not exist
    NotFound,
    /// Authenticated but not authorized
    Permission,
    /// Malformed identifier, empty or oversized payload
    InvalidArgument,
    /// The caller cancelled the operation
    Cancelled,
    /// Any other failure reported by the service
    Backend,
}

impl ErrorKind {
    /// Stable lowercase name, used as a metrics label
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::Connection => "connection",
            Self::AlreadyExists => "already_exists",
            Self::NotFound => "not_found",
            Self::Permission => "permission",
            Self::InvalidArgument => "invalid_argument",
            Self::Cancelled => "cancelled",
            Self::Backend => "backend",
        }
    }

    /// Classify a canonical Google API status string (`NOT_FOUND`, ...)
    ///
    /// Returns `None` for an unknown or empty status so the caller can fall
    /// back to the HTTP status code.
    pub fn from_status(status: &str) -> Option<Self> {
        let kind = match status {
            "UNAUTHENTICATED" => Self::Authentication,
            "PERMISSION_DENIED" => Self::Permission,
            "NOT_FOUND" => Self::NotFound,
            "ALREADY_EXISTS" => Self::AlreadyExists,
            "INVALID_ARGUMENT" | "FAILED_PRECONDITION" | "OUT_OF_RANGE" => Self::InvalidArgument,
            "UNAVAILABLE" | "DEADLINE_EXCEEDED" => Self::Connection,
            "CANCELLED" => Self::Cancelled,
            "INTERNAL" | "UNKNOWN" | "RESOURCE_EXHAUSTED" | "ABORTED" | "DATA_LOSS"
            | "UNIMPLEMENTED" => Self::Backend,
            _ => return None,
        };
        Some(kind)
    }

    /// Classify an HTTP status code
    pub fn from_http(code: u16) -> Self {
        match code {
            400 => Self::InvalidArgument,
            401 => Self::Authentication,
            403 => Self::Permission,
            404 => Self::NotFound,
            409 => Self::AlreadyExists,
            499 => Self::Cancelled,
            503 | 504 => Self::Connection,
            _ => Self::Backend,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure raised by a backend connection or a credential provider
#[derive(Debug, Error)]
pub enum BackendError {
    /// No usable credentials could be resolved
    #[error("no usable credentials: {0}")]
    Authentication(String),

    /// Setup failure that is not about credentials
    #[error("connection error: {0}")]
    Connection(String),

    /// Transport failure while talking to the service
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Structured error returned by the service
    #[error("{status} (HTTP {code}): {message}")]
    Status {
        kind: ErrorKind,
        code: u16,
        status: String,
        message: String,
    },

    /// Request rejected before it was sent
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Response (or a single record of it) could not be decoded
    #[error("malformed response: {0}")]
    Decode(String),

    /// The caller cancelled the operation
    #[error("operation cancelled")]
    Cancelled,
}

impl BackendError {
    /// Classify this failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication(_) => ErrorKind::Authentication,
            Self::Connection(_) => ErrorKind::Connection,
            Self::Transport(e) if e.is_decode() => ErrorKind::Backend,
            Self::Transport(_) => ErrorKind::Connection,
            Self::Status { kind, .. } => *kind,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Decode(_) => ErrorKind::Backend,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }
}

impl From<PathError> for BackendError {
    fn from(e: PathError) -> Self {
        Self::InvalidArgument(e.to_string())
    }
}

/// Operations exposed by the façade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Probe,
    CreateSecret,
    AddSecretVersion,
    AccessSecretVersion,
    DeleteSecret,
    ListSecrets,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Probe => "probe",
            Self::CreateSecret => "create_secret",
            Self::AddSecretVersion => "add_secret_version",
            Self::AccessSecretVersion => "access_secret_version",
            Self::DeleteSecret => "delete_secret",
            Self::ListSecrets => "list_secrets",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by every façade operation
#[derive(Debug, Error)]
#[error("{operation} failed for {target}")]
pub struct SecretError {
    operation: Operation,
    target: String,
    #[source]
    source: BackendError,
}

impl SecretError {
    pub fn new(operation: Operation, target: impl Into<String>, source: BackendError) -> Self {
        Self {
            operation,
            target: target.into(),
            source,
        }
    }

    /// Operation that failed
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Path (or namespace) the operation targeted
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Classification of the underlying failure
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }

    /// Underlying backend failure
    pub fn backend_error(&self) -> &BackendError {
        &self.source
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}
