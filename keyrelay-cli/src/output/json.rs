//! JSON output formatting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use keyrelay_core::Credential;
use keyrelay_store::CredentialMap;
use keyrelay_providers::CredentialState;
use serde::Serialize;

use super::text::{display_path, minutes_until};

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for `list`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOutput {
    pub path: String,
    pub credentials: Vec<CredentialOutput>,
}

/// One stored credential. Secrets are never included.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialOutput {
    pub provider: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// JSON output for one provider in `status`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusOutput {
    pub provider: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Builds the `list` output.
    pub fn list_output(&self, path: &std::path::Path, credentials: &CredentialMap) -> ListOutput {
        ListOutput {
            path: display_path(path),
            credentials: credentials
                .iter()
                .map(|(id, credential)| credential_output(id, credential))
                .collect(),
        }
    }

    /// Builds the `status` entry for a classified credential.
    pub fn status_output(&self, provider: &str, state: &CredentialState, now_ms: i64) -> StatusOutput {
        let (label, expires) = match state {
            CredentialState::Valid { expires } => ("active", Some(*expires)),
            CredentialState::Stale => ("stale", None),
            CredentialState::Unrecoverable => ("expired", None),
            CredentialState::Absent => ("absent", None),
            CredentialState::ApiKey => ("api", None),
            CredentialState::Unmanaged => ("oauth", None),
        };

        StatusOutput {
            provider: provider.to_string(),
            state: label.to_string(),
            expires_at: expires.and_then(DateTime::from_timestamp_millis),
            expires_in_minutes: expires.map(|at| minutes_until(at, now_ms)),
            error: None,
        }
    }

    /// Builds the `status` entry for a provider that could not be checked.
    pub fn status_error(&self, provider: &str, error: &str) -> StatusOutput {
        StatusOutput {
            provider: provider.to_string(),
            state: "unknown".to_string(),
            expires_at: None,
            expires_in_minutes: None,
            error: Some(error.to_string()),
        }
    }
}

fn credential_output(id: &str, credential: &Credential) -> CredentialOutput {
    CredentialOutput {
        provider: id.to_string(),
        kind: credential.type_label().to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pretty() {
        let formatter = JsonFormatter::new(true);
        let data = serde_json::json!({"key": "value"});
        let output = formatter.format(&data).unwrap();
        assert!(output.contains('\n'));
    }

    #[test]
    fn test_format_compact() {
        let formatter = JsonFormatter::new(false);
        let data = serde_json::json!({"key": "value"});
        let output = formatter.format(&data).unwrap();
        assert!(!output.contains('\n'));
    }

    #[test]
    fn test_status_output_omits_expiry_when_stale() {
        let formatter = JsonFormatter::new(false);
        let output = formatter.status_output("github-copilot", &CredentialState::Stale, 0);
        let json = formatter.format(&output).unwrap();
        assert_eq!(json, r#"{"provider":"github-copilot","state":"stale"}"#);
    }
}
