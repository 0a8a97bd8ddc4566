//! Logout command - remove a stored credential.

use anyhow::{Result, bail};
use clap::Args;

use crate::Cli;
use crate::output::TextFormatter;
use crate::prompt::Prompter;

/// Arguments for the logout command.
#[derive(Args)]
pub struct LogoutArgs {
    /// Provider id to remove (prompts when omitted).
    pub provider: Option<String>,
}

/// Runs the logout command.
pub async fn run(args: &LogoutArgs, cli: &Cli) -> Result<()> {
    let manager = cli.manager()?;
    let formatter = TextFormatter::new(cli.use_colors());
    let credentials = manager.store().all().await;

    let provider = match &args.provider {
        Some(provider) => {
            if !credentials.contains_key(provider) {
                bail!("No credential stored for {provider}");
            }
            provider.clone()
        }
        None => {
            if credentials.is_empty() {
                println!("No credentials found");
                return Ok(());
            }
            let ids: Vec<String> = credentials.keys().cloned().collect();
            let choice = Prompter::new()
                .select("Select a credential to remove", &ids)
                .await?;
            ids[choice].clone()
        }
    };

    manager.logout(&provider).await?;
    println!(
        "{}",
        formatter.format_success(&format!("Logged out from {provider}"))
    );
    Ok(())
}
