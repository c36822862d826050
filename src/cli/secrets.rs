//! # Secret Commands
//!
//! Single-secret commands: probe, create, add-version, access and delete.

use anyhow::{Context, Result};
use knock::prelude::*;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use zeroize::Zeroizing;

pub async fn probe_command(client: &SecretClient) -> Result<()> {
    client
        .knock()
        .await
        .context("Secret Manager is not reachable with the available credentials")?;
    println!("ok: credentials resolved and connection opened");
    Ok(())
}

pub async fn create_command(
    client: &SecretClient,
    parent: &ParentPath,
    secret_id: &str,
    ttl_seconds: Option<u64>,
) -> Result<()> {
    let secret = client
        .create_secret(parent, secret_id, ttl_seconds.map(Duration::from_secs))
        .await?;
    println!("created secret: {secret}");
    Ok(())
}

/// Payload bytes from `--data` or `--file`
pub fn read_payload(data: Option<&str>, file: Option<&Path>) -> Result<Zeroizing<Vec<u8>>> {
    match (data, file) {
        (Some(data), _) => Ok(Zeroizing::new(data.as_bytes().to_vec())),
        (None, Some(path)) => std::fs::read(path)
            .map(Zeroizing::new)
            .with_context(|| format!("Failed to read payload from {}", path.display())),
        (None, None) => anyhow::bail!("either --data or --file is required"),
    }
}

pub async fn add_version_command(
    client: &SecretClient,
    parent: &ParentPath,
    secret_id: &str,
    payload: &[u8],
) -> Result<()> {
    let secret = parent.secret(secret_id)?;
    let version = client.add_secret_version(&secret, payload).await?;
    println!("added secret version: {version}");
    Ok(())
}

pub async fn access_command(
    client: &SecretClient,
    parent: &ParentPath,
    secret_id: &str,
    version: VersionSpec,
) -> Result<()> {
    let version = parent.secret(secret_id)?.version(version);
    let payload = client.access_secret_version(&version).await?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(payload.expose())
        .and_then(|()| stdout.flush())
        .context("Failed to write payload to stdout")?;
    Ok(())
}

pub async fn delete_command(
    client: &SecretClient,
    parent: &ParentPath,
    secret_id: &str,
) -> Result<()> {
    let secret = parent.secret(secret_id)?;
    client.delete_secret(&secret).await?;
    println!("deleted secret: {secret}");
    Ok(())
}
