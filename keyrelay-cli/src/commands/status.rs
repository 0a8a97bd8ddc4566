//! Status command - token health per stored credential.

use anyhow::Result;
use keyrelay_core::Clock;
use tracing::{info, warn};

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the status command.
///
/// Only the `github-copilot` OAuth credential is probed against the token
/// endpoint, and only when its access token is stale; nothing is written
/// back. Every other entry reports its type.
pub async fn run(cli: &Cli) -> Result<()> {
    let manager = cli.manager()?;
    let credentials = manager.store().all().await;
    info!(count = credentials.len(), "Checking credential status");

    let now = manager.clock().now_millis();
    let text = TextFormatter::new(cli.use_colors());
    let json = JsonFormatter::new(cli.pretty);
    let mut outputs = Vec::with_capacity(credentials.len());

    if credentials.is_empty() && cli.format == OutputFormat::Text {
        println!("No credentials found");
        return Ok(());
    }

    for id in credentials.keys() {
        match manager.inspect(id).await {
            Ok(state) => match cli.format {
                OutputFormat::Text => println!("{}", text.format_status_line(id, &state, now)),
                OutputFormat::Json => outputs.push(json.status_output(id, &state, now)),
            },
            Err(e) => {
                warn!(provider = %id, error = %e, "Could not check credential");
                match cli.format {
                    OutputFormat::Text => println!("{}", text.format_error(id, &e.to_string())),
                    OutputFormat::Json => outputs.push(json.status_error(id, &e.to_string())),
                }
            }
        }
    }

    if cli.format == OutputFormat::Json {
        println!("{}", json.format(&outputs)?);
    }

    Ok(())
}
