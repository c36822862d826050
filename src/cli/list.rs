//! # List Command

use anyhow::Result;
use knock::prelude::*;

/// Print every secret of the project, one per line
///
/// Records that could not be read are reported on stderr; the command fails
/// if any position carried an error.
pub async fn list_command(client: &SecretClient, parent: &ParentPath) -> Result<()> {
    let listing = client.list_secrets(parent, CancellationToken::new()).await;

    if listing.is_empty() {
        eprintln!("No secrets found under {parent}.");
        return Ok(());
    }

    let mut failures = 0usize;
    for (name, error) in listing.iter() {
        match error {
            None => println!("{name}"),
            Some(e) => {
                failures += 1;
                eprintln!("error: {e}: {}", e.backend_error());
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} listing entries failed", listing.len());
    }
    Ok(())
}
