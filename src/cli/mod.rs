//! # knock CLI
//!
//! Command-line interface for the knock Secret Manager client.
//!
//! ## Usage
//!
//! ```bash
//! # Check that credentials resolve
//! knock probe
//!
//! # Create a secret that expires after a minute
//! knock --project my-project create db-password --ttl-seconds 60
//!
//! # Add a version from a string or a file
//! knock --project my-project add-version db-password --data hunter2
//! knock --project my-project add-version db-password --file ./password.txt
//!
//! # Print the latest (or a specific) version to stdout
//! knock --project my-project access db-password
//! knock --project my-project access db-password --version 1
//!
//! # Delete a secret and all of its versions
//! knock --project my-project delete db-password
//!
//! # List secrets
//! knock --project my-project list
//!
//! # Run the end-to-end demo flow
//! GOOGLE_PROJECT_NAME=my-project knock demo
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use knock::constants::env;
use knock::observability;
use knock::prelude::*;
use std::path::PathBuf;

mod demo;
mod list;
mod secrets;

/// Google Cloud Secret Manager client
#[derive(Parser)]
#[command(name = "knock")]
#[command(
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("KNOCK_BUILD_GIT_HASH"), ")"),
    about = "Create, version, read, delete and list Google Cloud Secret Manager secrets",
    long_about = None,
    after_help = "\
Credentials are resolved through Application Default Credentials:
  GOOGLE_OAUTH_ACCESS_TOKEN, GOOGLE_APPLICATION_CREDENTIALS,
  the gcloud application default credentials file, then the metadata server.

Examples:
  knock probe
  knock --project my-project create db-password --ttl-seconds 60
  knock --project my-project access db-password --version latest
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project holding the secrets
    #[arg(short, long, global = true, env = env::PROJECT)]
    project: Option<String>,

    /// Print Prometheus metrics to stderr when the command finishes
    #[arg(long, global = true)]
    print_metrics: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that credentials resolve and a connection can be opened
    Probe,
    /// Create a secret with automatic replication
    Create {
        #[arg(value_name = "SECRET_ID")]
        secret_id: String,

        /// Delete the secret automatically after this many seconds
        #[arg(long, env = env::TTL_SECONDS)]
        ttl_seconds: Option<u64>,
    },
    /// Add a version to an existing secret
    AddVersion {
        #[arg(value_name = "SECRET_ID")]
        secret_id: String,

        /// Payload given inline
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        data: Option<String>,

        /// Read the payload from a file
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },
    /// Write the payload of a secret version to stdout
    Access {
        #[arg(value_name = "SECRET_ID")]
        secret_id: String,

        /// Version number or `latest`
        #[arg(long, default_value = "latest")]
        version: VersionSpec,
    },
    /// Delete a secret and all of its versions
    Delete {
        #[arg(value_name = "SECRET_ID")]
        secret_id: String,
    },
    /// List the secrets of the project
    List,
    /// Replace a `test` secret, store a payload in it and read it back
    Demo {
        #[arg(long, default_value = "test")]
        secret_id: String,

        /// Delete the secret automatically after this many seconds
        #[arg(long, env = env::TTL_SECONDS)]
        ttl_seconds: Option<u64>,

        /// Delete every existing secret of the project first
        #[arg(long)]
        purge_existing: bool,
    },
}

impl Cli {
    fn parent(&self) -> Result<ParentPath> {
        let project = self.project.as_deref().with_context(|| {
            format!(
                "project name not found; pass --project or set {}",
                env::PROJECT
            )
        })?;
        ParentPath::new(project).context("invalid project id")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Configure rustls crypto provider FIRST, before any other operations
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        anyhow::bail!("Failed to install rustls crypto provider");
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "knock=info".into()),
        )
        .init();

    let cli = Cli::parse();
    observability::register_metrics().context("Failed to register metrics")?;

    let client = SecretClient::from_env().context("Failed to configure Secret Manager client")?;

    let outcome = match &cli.command {
        Commands::Probe => secrets::probe_command(&client).await,
        Commands::Create {
            secret_id,
            ttl_seconds,
        } => secrets::create_command(&client, &cli.parent()?, secret_id, *ttl_seconds).await,
        Commands::AddVersion {
            secret_id,
            data,
            file,
        } => {
            let payload = secrets::read_payload(data.as_deref(), file.as_deref())?;
            secrets::add_version_command(&client, &cli.parent()?, secret_id, &payload).await
        }
        Commands::Access { secret_id, version } => {
            secrets::access_command(&client, &cli.parent()?, secret_id, *version).await
        }
        Commands::Delete { secret_id } => {
            secrets::delete_command(&client, &cli.parent()?, secret_id).await
        }
        Commands::List => list::list_command(&client, &cli.parent()?).await,
        Commands::Demo {
            secret_id,
            ttl_seconds,
            purge_existing,
        } => {
            demo::demo_command(
                &client,
                &cli.parent()?,
                secret_id,
                *ttl_seconds,
                *purge_existing,
            )
            .await
        }
    };

    if cli.print_metrics {
        eprintln!("{}", observability::render_text()?);
    }
    outcome
}
