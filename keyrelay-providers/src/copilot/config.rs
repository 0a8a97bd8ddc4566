//! Endpoints and client identification for Copilot.
//!
//! Everything here is fixed at construction; there is no way to change a
//! [`CopilotConfig`] once it is handed to a client.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};

use super::error::CopilotError;

// ============================================================================
// Constants
// ============================================================================

/// GitHub's OAuth device code endpoint.
pub const DEVICE_CODE_URL: &str = "https://github.com/login/device/code";

/// GitHub's OAuth access token endpoint (device-code grant).
pub const ACCESS_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";

/// Copilot's internal token endpoint.
pub const TOKEN_EXCHANGE_URL: &str = "https://api.github.com/copilot_internal/v2/token";

/// OAuth client ID of the Copilot editor extensions.
pub const COPILOT_CLIENT_ID: &str = "Iv1.b507a08c87ecfe98";

/// Scope requested during the device flow.
pub const COPILOT_SCOPE: &str = "read:user";

const DEVICE_CODE_PATH: &str = "/login/device/code";
const ACCESS_TOKEN_PATH: &str = "/login/oauth/access_token";
const TOKEN_EXCHANGE_PATH: &str = "/copilot_internal/v2/token";

const USER_AGENT_VALUE: &str = "GitHubCopilotChat/0.26.7";
const EDITOR_VERSION: &str = "vscode/1.99.3";
const EDITOR_PLUGIN_VERSION: &str = "copilot-chat/0.26.7";
const INTEGRATION_ID: &str = "vscode-chat";
const INTENT: &str = "conversation-edits";

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Config
// ============================================================================

/// Immutable Copilot endpoint and header configuration.
#[derive(Debug, Clone)]
pub struct CopilotConfig {
    client_id: String,
    scope: String,
    device_code_url: String,
    access_token_url: String,
    token_exchange_url: String,
    timeout: Duration,
}

impl CopilotConfig {
    /// Points the device-flow endpoints at another GitHub host.
    #[must_use]
    pub fn with_github_base(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.device_code_url = format!("{base}{DEVICE_CODE_PATH}");
        self.access_token_url = format!("{base}{ACCESS_TOKEN_PATH}");
        self
    }

    /// Points the token exchange at another API host.
    #[must_use]
    pub fn with_api_base(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.token_exchange_url = format!("{base}{TOKEN_EXCHANGE_PATH}");
        self
    }

    /// Uses a different OAuth client ID.
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    /// Sets the HTTP request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// OAuth client ID.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Device-flow scope.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Device code endpoint.
    pub fn device_code_url(&self) -> &str {
        &self.device_code_url
    }

    /// Device-code grant token endpoint.
    pub fn access_token_url(&self) -> &str {
        &self.access_token_url
    }

    /// Copilot token exchange endpoint.
    pub fn token_exchange_url(&self) -> &str {
        &self.token_exchange_url
    }

    /// Builds the HTTP client shared by the device flow and the exchange.
    ///
    /// # Errors
    ///
    /// Fails only if the TLS backend cannot be initialised.
    pub fn http_client(&self) -> Result<reqwest::Client, CopilotError> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| CopilotError::HttpError(format!("Failed to build HTTP client: {e}")))
    }

    /// Product/version headers the Copilot API requires on every request.
    pub fn client_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            HeaderName::from_static("editor-version"),
            HeaderValue::from_static(EDITOR_VERSION),
        );
        headers.insert(
            HeaderName::from_static("editor-plugin-version"),
            HeaderValue::from_static(EDITOR_PLUGIN_VERSION),
        );
        headers.insert(
            HeaderName::from_static("copilot-integration-id"),
            HeaderValue::from_static(INTEGRATION_ID),
        );
        headers
    }

    /// The intent marker sent with chat requests.
    pub fn intent_header(&self) -> (HeaderName, HeaderValue) {
        (
            HeaderName::from_static("openai-intent"),
            HeaderValue::from_static(INTENT),
        )
    }

    /// User agent used on GitHub OAuth requests.
    pub fn user_agent(&self) -> HeaderValue {
        HeaderValue::from_static(USER_AGENT_VALUE)
    }
}

impl Default for CopilotConfig {
    fn default() -> Self {
        Self {
            client_id: COPILOT_CLIENT_ID.to_string(),
            scope: COPILOT_SCOPE.to_string(),
            device_code_url: DEVICE_CODE_URL.to_string(),
            access_token_url: ACCESS_TOKEN_URL.to_string(),
            token_exchange_url: TOKEN_EXCHANGE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}
