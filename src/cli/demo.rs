//! # Demo Command
//!
//! End-to-end walk through the client: clear the way, create a secret, store
//! a payload and read it back.

use anyhow::{Context, Result};
use knock::prelude::*;
use std::time::Duration;
use tracing::warn;

const DEMO_PAYLOAD: &[u8] = b"my super secret data";

pub async fn demo_command(
    client: &SecretClient,
    parent: &ParentPath,
    secret_id: &str,
    ttl_seconds: Option<u64>,
    purge_existing: bool,
) -> Result<()> {
    let listing = client.list_secrets(parent, CancellationToken::new()).await;
    for (name, error) in listing.iter() {
        if let Some(e) = error {
            warn!(error = %e, cause = %e.backend_error(), "Skipping unreadable listing entry");
            continue;
        }
        let secret: SecretPath = name.parse()?;
        if !purge_existing && secret.secret_id() != secret_id {
            continue;
        }
        println!("deleting existing secret: {secret}");
        client.delete_secret(&secret).await?;
    }

    let secret = client
        .create_secret(parent, secret_id, ttl_seconds.map(Duration::from_secs))
        .await
        .context("Something went wrong; check credentials or whether the secret already exists")?;
    println!("created secret: {secret}");

    let version = client
        .add_secret_version(&secret, DEMO_PAYLOAD)
        .await
        .context("Couldn't add secret version; check service account permissions")?;
    println!("added secret version: {version}");

    for target in [version, secret.latest()] {
        let retrieved = client
            .access_secret_version(&target)
            .await
            .context("Couldn't retrieve secret; check service account permissions")?;
        anyhow::ensure!(
            retrieved.expose() == DEMO_PAYLOAD,
            "payload read from {target} does not match what was stored"
        );
        println!("retrieved {} bytes from {target}: payload matches", retrieved.len());
    }

    Ok(())
}
