//! Text output formatting with colors.

use std::path::Path;

use keyrelay_core::{Credential, DeviceAuthorizationSession};
use keyrelay_providers::CredentialState;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Header line for `list`: "Credentials ~/.claude-code-router/auth.json".
    pub fn format_list_header(&self, path: &Path) -> String {
        format!("{} {}", self.bold("Credentials"), self.dim(&display_path(path)))
    }

    /// One stored credential: "<id> <type>".
    pub fn format_credential_line(&self, id: &str, credential: &Credential) -> String {
        format!("{} {}", self.cyan(id), self.dim(credential.type_label()))
    }

    /// Footer line for `list`.
    pub fn format_list_footer(&self, count: usize) -> String {
        let noun = if count == 1 { "credential" } else { "credentials" };
        format!("{count} {noun}")
    }

    /// Status of one provider as reported by `status`.
    pub fn format_status_line(&self, id: &str, state: &CredentialState, now_ms: i64) -> String {
        let detail = match state {
            CredentialState::Valid { expires } => self.green(&format!(
                "Active (expires in {} minutes)",
                minutes_until(*expires, now_ms)
            )),
            CredentialState::Stale => {
                self.yellow("Token expired but refresh token is valid")
            }
            CredentialState::Unrecoverable | CredentialState::Absent => {
                self.red("Authentication expired - please run 'keyrelay login'")
            }
            CredentialState::ApiKey => self.dim("api"),
            CredentialState::Unmanaged => self.dim("oauth"),
        };
        format!("{}: {}", self.bold(id), detail)
    }

    /// Instructions shown while the device flow waits for the user.
    pub fn format_device_prompt(&self, session: &DeviceAuthorizationSession) -> String {
        [
            "Please visit the following URL to authenticate:".to_string(),
            self.cyan(&session.verification_uri),
            String::new(),
            format!("And enter the code: {}", self.bold(&session.user_code)),
        ]
        .join("\n")
    }

    /// Formats a success line.
    pub fn format_success(&self, message: &str) -> String {
        self.green(message)
    }

    /// Formats an error for one provider.
    pub fn format_error(&self, provider: &str, error: &str) -> String {
        format!("{}: {}", self.bold(provider), self.red(error))
    }

    /// Formats a warning line.
    pub fn format_warning(&self, message: &str) -> String {
        self.yellow(message)
    }

    // ========================================================================
    // Color helpers
    // ========================================================================

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

/// Whole minutes until `expires_ms`, rounded to nearest.
pub fn minutes_until(expires_ms: i64, now_ms: i64) -> i64 {
    (expires_ms - now_ms + 30_000).div_euclid(60_000)
}

/// Renders a path with the home directory shortened to `~`.
pub fn display_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(rest) = path.strip_prefix(&home) {
            return Path::new("~").join(rest).display().to_string();
        }
    }
    path.display().to_string()
}
