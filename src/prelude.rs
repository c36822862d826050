//! # Prelude
//!
//! Re-exports commonly used types for convenience.
//!
//! ```rust
//! use knock::prelude::*;
//!
//! let parent = ParentPath::new("my-project").unwrap();
//! let version: VersionPath = "projects/my-project/secrets/db/versions/latest".parse().unwrap();
//! assert_eq!(version.secret().parent(), &parent);
//! assert_eq!(version.version(), VersionSpec::Latest);
//! ```

pub use crate::auth::{CredentialProvider, DefaultCredentials, StaticToken};
pub use crate::client::{SecretClient, SecretListing};
pub use crate::config::ClientConfig;
pub use crate::error::{BackendError, ErrorKind, Operation, SecretError};
pub use crate::payload::SecretPayload;
pub use crate::paths::{ParentPath, PathError, SecretPath, VersionPath, VersionSpec};
pub use tokio_util::sync::CancellationToken;
