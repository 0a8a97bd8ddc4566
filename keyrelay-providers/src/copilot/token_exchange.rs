//! Copilot token exchange.
//!
//! Trades the long-lived GitHub token for a short-lived Copilot API token:
//!
//! ```text
//! GET /copilot_internal/v2/token
//! Authorization: Bearer <github token>
//!
//! { "token": "tid=...", "expires_at": 1735000000, "refresh_in": 1500,
//!   "endpoints": { "api": "https://api.githubcopilot.com" } }
//! ```
//!
//! There is no retry here. A non-2xx answer means the GitHub token is no
//! longer accepted and the user has to log in again.

use std::future::Future;

use keyrelay_core::AccessCredential;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::config::CopilotConfig;
use super::error::CopilotError;

// ============================================================================
// Trait
// ============================================================================

/// Exchanges a refresh credential for an access credential.
pub trait TokenExchanger: Send + Sync {
    /// Returns `Ok(None)` when the server rejects the refresh credential.
    fn exchange(
        &self,
        refresh: &str,
    ) -> impl Future<Output = Result<Option<AccessCredential>, CopilotError>> + Send;
}

// ============================================================================
// Wire Types
// ============================================================================

/// Response from the Copilot token endpoint.
#[derive(Debug, Deserialize)]
pub struct CopilotTokenResponse {
    /// Copilot API token.
    pub token: String,

    /// Expiry in epoch seconds.
    pub expires_at: i64,

    /// Seconds after which the server suggests refreshing.
    #[serde(default)]
    pub refresh_in: Option<i64>,

    /// Endpoints the token is valid for.
    #[serde(default)]
    pub endpoints: Option<CopilotEndpoints>,
}

/// Endpoint block of [`CopilotTokenResponse`].
#[derive(Debug, Deserialize)]
pub struct CopilotEndpoints {
    /// Chat API base URL.
    #[serde(default)]
    pub api: Option<String>,
}

impl From<CopilotTokenResponse> for AccessCredential {
    fn from(response: CopilotTokenResponse) -> Self {
        AccessCredential::from_expiry_secs(response.token, response.expires_at)
    }
}

// ============================================================================
// HTTP Exchange
// ============================================================================

/// Token exchange against the Copilot internal endpoint. Stateless.
#[derive(Debug, Clone)]
pub struct CopilotTokenExchange {
    http: reqwest::Client,
    config: CopilotConfig,
}

impl CopilotTokenExchange {
    /// Creates an exchange client.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(config: CopilotConfig) -> Result<Self, CopilotError> {
        let http = config.http_client()?;
        Ok(Self { http, config })
    }

    /// Creates an exchange client reusing an existing HTTP client.
    pub fn with_http(http: reqwest::Client, config: CopilotConfig) -> Self {
        Self { http, config }
    }
}

impl TokenExchanger for CopilotTokenExchange {
    #[instrument(skip_all)]
    async fn exchange(&self, refresh: &str) -> Result<Option<AccessCredential>, CopilotError> {
        let mut headers = self.config.client_headers();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut bearer = HeaderValue::from_str(&format!("Bearer {refresh}"))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let response = self
            .http
            .get(self.config.token_exchange_url())
            .headers(headers)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Failed to get Copilot token");
            return Ok(None);
        }

        let body = response.text().await?;
        let parsed: CopilotTokenResponse = serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, "Failed to parse Copilot token response");
            CopilotError::InvalidResponse(format!("JSON parse error: {e}"))
        })?;

        debug!(
            expires_at = parsed.expires_at,
            refresh_in = ?parsed.refresh_in,
            api = ?parsed.endpoints.as_ref().and_then(|e| e.api.as_deref()),
            "Copilot token issued"
        );

        Ok(Some(parsed.into()))
    }
}
