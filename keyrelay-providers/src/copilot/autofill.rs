//! Router provider auto-fill.
//!
//! Router configs list providers as JSON objects. The Copilot entry carries
//! `"api_key": "authenticated"` (or nothing) and gets the live access token
//! substituted before the router registers it.

use keyrelay_core::{COPILOT_PROVIDER_ID, Clock};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::manager::CredentialManager;
use super::token_exchange::TokenExchanger;

/// Marker value asking for the stored Copilot login to be used.
pub const AUTHENTICATED_MARKER: &str = "authenticated";

/// Placeholder written when no token is available, so registration still succeeds.
pub const AUTH_REQUIRED_PLACEHOLDER: &str = "AUTHENTICATION_REQUIRED";

/// A router provider entry. Unknown fields are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderEntry {
    /// Provider name as configured in the router.
    pub name: String,

    /// API key, if configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Every other field (base URL, models, transformers, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProviderEntry {
    fn wants_copilot_token(&self) -> bool {
        self.name == COPILOT_PROVIDER_ID
            && self
                .api_key
                .as_deref()
                .is_none_or(|key| key.is_empty() || key == AUTHENTICATED_MARKER)
    }
}

/// Fills the Copilot entry's `api_key` with the current access token.
///
/// Refreshes through the manager if needed. When no token can be obtained the
/// key becomes [`AUTH_REQUIRED_PLACEHOLDER`]. Other entries pass through.
pub async fn fill_provider_auth<E: TokenExchanger, C: Clock>(
    manager: &CredentialManager<E, C>,
    providers: Vec<ProviderEntry>,
) -> Vec<ProviderEntry> {
    let mut filled = Vec::with_capacity(providers.len());

    for mut entry in providers {
        if entry.wants_copilot_token() {
            let key = match manager.access_token(COPILOT_PROVIDER_ID).await {
                Ok(Some(token)) => {
                    info!("GitHub Copilot authentication loaded");
                    token
                }
                Ok(None) => {
                    warn!("GitHub Copilot authentication not found. Please run 'keyrelay login'");
                    AUTH_REQUIRED_PLACEHOLDER.to_string()
                }
                Err(e) => {
                    warn!(error = %e, "Could not load GitHub Copilot token");
                    AUTH_REQUIRED_PLACEHOLDER.to_string()
                }
            };
            entry.api_key = Some(key);
        }
        filled.push(entry);
    }

    filled
}
