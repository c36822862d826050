//! # Resource Paths
//!
//! Typed resource names for the Secret Manager path grammar:
//!
//! - Namespace: `projects/{project}`
//! - Secret: `projects/{project}/secrets/{secret}`
//! - Version: `projects/{project}/secrets/{secret}/versions/{version}`
//!
//! `{version}` is either a positive decimal ordinal or the alias `latest`.
//! Every type validates on construction, so a value that exists is always a
//! well-formed name the backend will accept.
//!
//! ```rust
//! use knock::paths::{ParentPath, VersionSpec};
//!
//! let parent = ParentPath::new("test-project").unwrap();
//! let secret = parent.secret("test").unwrap();
//! assert_eq!(secret.to_string(), "projects/test-project/secrets/test");
//! assert_eq!(
//!     secret.version(VersionSpec::Latest).to_string(),
//!     "projects/test-project/secrets/test/versions/latest"
//! );
//! ```

use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::{
    LATEST_VERSION_ALIAS, MAX_PROJECT_ID_LEN, MAX_SECRET_ID_LEN, MIN_PROJECT_ID_LEN,
};

/// Errors that can occur while building or parsing a resource name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// Input does not follow the expected segment layout
    #[error("malformed {expected} name: {input:?}")]
    Malformed {
        input: String,
        expected: &'static str,
    },

    /// Project ids follow the GCP project id grammar, or are a project number
    #[error("invalid project id: {0:?}")]
    InvalidProjectId(String),

    /// Secret ids are 1-255 characters of `[A-Za-z0-9_-]`
    #[error("invalid secret id: {0:?}")]
    InvalidSecretId(String),

    /// Versions are positive integers or `latest`
    #[error("invalid version: {0:?}")]
    InvalidVersion(String),
}

/// Project ids are 6-30 characters of `[a-z0-9-]`, starting with a letter and
/// not ending with a hyphen; project numbers are all digits
fn validate_project_id(project_id: &str) -> Result<(), PathError> {
    let bytes = project_id.as_bytes();
    let is_number = !bytes.is_empty() && bytes.iter().all(u8::is_ascii_digit);
    let is_id = (MIN_PROJECT_ID_LEN..=MAX_PROJECT_ID_LEN).contains(&bytes.len())
        && bytes[0].is_ascii_lowercase()
        && bytes[bytes.len() - 1] != b'-'
        && bytes
            .iter()
            .all(|&b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    if !(is_number || is_id) {
        return Err(PathError::InvalidProjectId(project_id.to_string()));
    }
    Ok(())
}

fn validate_secret_id(secret_id: &str) -> Result<(), PathError> {
    let valid_chars = secret_id
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if secret_id.is_empty() || secret_id.len() > MAX_SECRET_ID_LEN || !valid_chars {
        return Err(PathError::InvalidSecretId(secret_id.to_string()));
    }
    Ok(())
}

/// Namespace under which secrets are created and listed: `projects/{project}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParentPath {
    project_id: String,
}

impl ParentPath {
    pub fn new(project_id: impl Into<String>) -> Result<Self, PathError> {
        let project_id = project_id.into();
        validate_project_id(&project_id)?;
        Ok(Self { project_id })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Name of the secret `secret_id` under this namespace
    pub fn secret(&self, secret_id: impl Into<String>) -> Result<SecretPath, PathError> {
        SecretPath::new(self.clone(), secret_id)
    }
}

impl fmt::Display for ParentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "projects/{}", self.project_id)
    }
}

impl FromStr for ParentPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split('/').collect::<Vec<_>>().as_slice() {
            ["projects", project] => Self::new(*project),
            _ => Err(PathError::Malformed {
                input: s.to_string(),
                expected: "project",
            }),
        }
    }
}

/// Fully-qualified secret name: `projects/{project}/secrets/{secret}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretPath {
    parent: ParentPath,
    secret_id: String,
}

impl SecretPath {
    pub fn new(parent: ParentPath, secret_id: impl Into<String>) -> Result<Self, PathError> {
        let secret_id = secret_id.into();
        validate_secret_id(&secret_id)?;
        Ok(Self { parent, secret_id })
    }

    pub fn parent(&self) -> &ParentPath {
        &self.parent
    }

    pub fn secret_id(&self) -> &str {
        &self.secret_id
    }

    pub fn version(&self, version: VersionSpec) -> VersionPath {
        VersionPath {
            secret: self.clone(),
            version,
        }
    }

    /// Shorthand for the `latest` alias of this secret
    pub fn latest(&self) -> VersionPath {
        self.version(VersionSpec::Latest)
    }
}

impl fmt::Display for SecretPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/secrets/{}", self.parent, self.secret_id)
    }
}

impl FromStr for SecretPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split('/').collect::<Vec<_>>().as_slice() {
            ["projects", project, "secrets", secret] => {
                Self::new(ParentPath::new(*project)?, *secret)
            }
            _ => Err(PathError::Malformed {
                input: s.to_string(),
                expected: "secret",
            }),
        }
    }
}

/// Version selector: an ordinal assigned by the backend, or `latest`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionSpec {
    Latest,
    Number(NonZeroU64),
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str(LATEST_VERSION_ALIAS),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for VersionSpec {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == LATEST_VERSION_ALIAS {
            return Ok(Self::Latest);
        }
        // Reject signs and whitespace that u64 parsing would otherwise accept
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PathError::InvalidVersion(s.to_string()));
        }
        s.parse::<NonZeroU64>()
            .map(Self::Number)
            .map_err(|e| PathError::InvalidVersion(format!("{s}: {e}")))
    }
}

/// Fully-qualified version name:
/// `projects/{project}/secrets/{secret}/versions/{version}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionPath {
    secret: SecretPath,
    version: VersionSpec,
}

impl VersionPath {
    pub fn secret(&self) -> &SecretPath {
        &self.secret
    }

    pub fn version(&self) -> VersionSpec {
        self.version
    }
}

impl fmt::Display for VersionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/versions/{}", self.secret, self.version)
    }
}

impl FromStr for VersionPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split('/').collect::<Vec<_>>().as_slice() {
            ["projects", project, "secrets", secret, "versions", version] => {
                let secret = SecretPath::new(ParentPath::new(*project)?, *secret)?;
                Ok(secret.version(version.parse()?))
            }
            _ => Err(PathError::Malformed {
                input: s.to_string(),
                expected: "secret version",
            }),
        }
    }
}
