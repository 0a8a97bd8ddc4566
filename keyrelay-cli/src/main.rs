// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! keyrelay CLI - provider credentials for LLM routers.
//!
//! # Examples
//!
//! ```bash
//! # Log in to GitHub Copilot with the device flow
//! keyrelay login --provider github-copilot
//!
//! # Store an api key for another provider
//! keyrelay login --provider openrouter --key sk-or-...
//!
//! # List stored credentials
//! keyrelay ls
//!
//! # Check token health
//! keyrelay status --format json
//!
//! # Refresh the Copilot token if it is about to expire
//! keyrelay refresh
//! ```

mod commands;
mod output;
mod prompt;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use keyrelay_providers::{CopilotConfig, CredentialManager};
use keyrelay_store::CredentialStore;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{list, login, logout, refresh, status};

// ============================================================================
// CLI Definition
// ============================================================================

/// keyrelay CLI - provider credentials for LLM routers.
#[derive(Parser)]
#[command(name = "keyrelay")]
#[command(about = "Manage provider credentials and Copilot tokens")]
#[command(long_about = r#"
keyrelay stores provider credentials for LLM routers.

GitHub Copilot logs in with the GitHub device flow; its short-lived API
token is refreshed automatically. Other providers are stored as api keys.

Credentials live in ~/.claude-code-router/auth.json
(override the directory with KEYRELAY_HOME).

Examples:
  keyrelay login                 # Log in to GitHub Copilot
  keyrelay ls                    # List stored credentials
  keyrelay status                # Check token health
  keyrelay refresh               # Refresh the Copilot token
  keyrelay logout openrouter     # Remove a credential
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Credential file to use instead of the default.
    #[arg(long, global = true, value_name = "PATH")]
    pub auth_file: Option<PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// List stored credentials.
    #[command(visible_alias = "ls")]
    List,

    /// Log in to a provider.
    Login(login::LoginArgs),

    /// Log out from a provider.
    Logout(logout::LogoutArgs),

    /// Check authentication status.
    Status,

    /// Refresh expired tokens.
    Refresh,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// General error.
    Error = 1,
}

impl Cli {
    /// Credential store selected by `--auth-file` or the default location.
    pub fn store(&self) -> CredentialStore {
        match &self.auth_file {
            Some(path) => CredentialStore::new(path.clone()),
            None => CredentialStore::open_default(),
        }
    }

    /// Credential manager over [`store`](Self::store).
    pub fn manager(&self) -> Result<CredentialManager> {
        Ok(CredentialManager::new(self.store(), CopilotConfig::default())?)
    }

    /// Whether to emit ANSI colors.
    pub fn use_colors(&self) -> bool {
        !self.no_color && std::env::var_os("NO_COLOR").is_none()
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("keyrelay=debug,info")
    } else {
        EnvFilter::new("keyrelay=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::List => list::run(&cli).await,
        Commands::Login(args) => login::run(args, &cli).await,
        Commands::Logout(args) => logout::run(args, &cli).await,
        Commands::Status => status::run(&cli).await,
        Commands::Refresh => refresh::run(&cli).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(ExitCode::Error as i32);
    }

    Ok(())
}
