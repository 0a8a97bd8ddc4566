//! Refresh command - renew the Copilot access token ahead of expiry.

use anyhow::{Result, bail};
use keyrelay_core::COPILOT_PROVIDER_ID;
use tracing::info;

use super::spinner;
use crate::Cli;
use crate::output::TextFormatter;

/// Runs the refresh command.
pub async fn run(cli: &Cli) -> Result<()> {
    let manager = cli.manager()?;
    let formatter = TextFormatter::new(cli.use_colors());

    let has_oauth = manager
        .store()
        .get(COPILOT_PROVIDER_ID)
        .await
        .is_some_and(|credential| credential.as_oauth().is_some());
    if !has_oauth {
        bail!("No GitHub Copilot authentication found. Please run 'keyrelay login' first");
    }

    info!("Refreshing GitHub Copilot token");
    let working = spinner("Refreshing GitHub Copilot token...", cli.quiet);
    let result = manager.refresh_token_if_needed(COPILOT_PROVIDER_ID).await;
    working.finish_and_clear();

    if result? {
        println!("{}", formatter.format_success("Token refreshed successfully"));
        Ok(())
    } else {
        bail!("Re-authentication required. Please run 'keyrelay login'");
    }
}
