//! knock
//!
//! Minimal client for Google Cloud Secret Manager: probe connectivity, create,
//! version, access, delete and list secrets.
//!
//! ```no_run
//! use knock::prelude::*;
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SecretClient::from_env()?;
//! let parent = ParentPath::new("test-project")?;
//!
//! let secret = client
//!     .create_secret(&parent, "test", Some(Duration::from_secs(60)))
//!     .await?;
//! let version = client
//!     .add_secret_version(&secret, b"my super secret data")
//!     .await?;
//! let payload = client.access_secret_version(&version).await?;
//! assert_eq!(payload.expose(), b"my super secret data");
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod observability;
pub mod paths;
pub mod payload;
pub mod prelude;
pub mod provider;
