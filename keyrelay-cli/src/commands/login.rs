//! Login command - device flow for Copilot, api keys for everything else.

use anyhow::{Result, bail};
use clap::Args;
use keyrelay_core::{COPILOT_PROVIDER_ID, SystemClock, validate_provider_id};
use keyrelay_providers::{CopilotConfig, CopilotDeviceFlow, CredentialManager};
use tracing::{info, warn};

use super::spinner;
use crate::Cli;
use crate::output::TextFormatter;
use crate::prompt::Prompter;

/// Arguments for the login command.
#[derive(Args)]
pub struct LoginArgs {
    /// Provider id.
    #[arg(long, short, default_value = COPILOT_PROVIDER_ID)]
    pub provider: String,

    /// API key for non-Copilot providers (prompts when omitted).
    #[arg(long)]
    pub key: Option<String>,
}

/// Runs the login command.
pub async fn run(args: &LoginArgs, cli: &Cli) -> Result<()> {
    let manager = cli.manager()?;
    let formatter = TextFormatter::new(cli.use_colors());

    let provider = args.provider.as_str();

    if provider == COPILOT_PROVIDER_ID {
        login_copilot(&manager, &formatter, cli.quiet).await
    } else {
        validate_provider_id(provider)?;
        let key = match &args.key {
            Some(key) => key.clone(),
            None => Prompter::new().read_line(&format!("API key for {provider}: ")).await?,
        };
        manager.store_api_key(provider, &key).await?;
        println!(
            "{}",
            formatter.format_success(&format!("Stored api key for {provider}"))
        );
        Ok(())
    }
}

async fn login_copilot(
    manager: &CredentialManager,
    formatter: &TextFormatter,
    quiet: bool,
) -> Result<()> {
    let flow = CopilotDeviceFlow::new(CopilotConfig::default())?;

    info!("Starting GitHub device authorization");
    let session = flow.authorize().await?;

    println!("{}", formatter.format_device_prompt(&session));
    println!();

    let waiting = spinner("Waiting for authorization...", quiet);
    let outcome = tokio::select! {
        outcome = flow.wait_for_authorization(&session, &SystemClock) => outcome,
        _ = tokio::signal::ctrl_c() => {
            waiting.finish_and_clear();
            bail!("Login cancelled");
        }
    };
    waiting.finish_and_clear();

    manager.complete_login(COPILOT_PROVIDER_ID, outcome?).await?;
    println!(
        "{}",
        formatter.format_success("Successfully authenticated with GitHub Copilot!")
    );

    // Prime the access token so the first routed request does not wait on it.
    if !manager.refresh_token_if_needed(COPILOT_PROVIDER_ID).await? {
        warn!("GitHub accepted the login but issued no Copilot token");
        println!(
            "{}",
            formatter.format_warning(
                "Logged in, but no Copilot token was issued. Check the account's Copilot subscription."
            )
        );
    }

    Ok(())
}
