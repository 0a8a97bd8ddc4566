//! List command - show stored credentials.

use anyhow::Result;
use keyrelay_store::CredentialMap;
use tracing::{info, warn};

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the list command.
pub async fn run(cli: &Cli) -> Result<()> {
    let store = cli.store();
    info!(path = %store.path().display(), "Listing credentials");

    let credentials = match store.load_strict().await {
        Ok(credentials) => credentials,
        Err(e) if e.is_not_found() => CredentialMap::new(),
        Err(e) => {
            warn!(error = %e, "Credential file is unreadable, treating it as empty");
            if cli.format == OutputFormat::Text && !cli.quiet {
                let formatter = TextFormatter::new(cli.use_colors());
                eprintln!(
                    "{}",
                    formatter.format_warning(&format!("Could not read credential file: {e}"))
                );
            }
            CredentialMap::new()
        }
    };

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(cli.use_colors());

            println!("{}", formatter.format_list_header(store.path()));
            println!();
            for (id, credential) in &credentials {
                println!("{}", formatter.format_credential_line(id, credential));
            }
            if !credentials.is_empty() {
                println!();
            }
            println!("{}", formatter.format_list_footer(credentials.len()));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            let output = formatter.list_output(store.path(), &credentials);
            println!("{}", formatter.format(&output)?);
        }
    }

    Ok(())
}
