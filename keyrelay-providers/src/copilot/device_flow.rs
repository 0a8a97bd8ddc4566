//! GitHub Device Flow OAuth implementation.
//!
//! This module implements the OAuth 2.0 Device Authorization Grant
//! (RFC 8628) against GitHub, which Copilot uses for login.
//!
//! ## Flow
//!
//! 1. **Authorize**: POST to `/login/device/code` to get device code and user code
//! 2. **Display**: Show user the verification URL and user code
//! 3. **Poll**: POST to `/login/oauth/access_token` until the user decides
//! 4. **Complete**: Hand the GitHub token (the refresh credential) to the manager
//!
//! The GitHub token is not usable against the Copilot API by itself; it has
//! to be exchanged for a short-lived Copilot token first.
//!
//! ## Example
//!
//! ```ignore
//! let flow = CopilotDeviceFlow::new(CopilotConfig::default())?;
//! let session = flow.authorize().await?;
//! println!("Go to {} and enter code: {}", session.verification_uri, session.user_code);
//!
//! let credential = flow.wait_for_authorization(&session, &SystemClock).await?;
//! manager.complete_login(COPILOT_PROVIDER_ID, credential).await?;
//! ```

use keyrelay_core::{Clock, DeviceAuthorizationSession, OAuthCredential, DEFAULT_POLL_INTERVAL_SECS};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::config::CopilotConfig;
use super::error::CopilotError;

/// Device-code grant type.
const DEVICE_CODE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Lifetime assumed when the server omits `expires_in` (GitHub issues 15 minutes).
const DEFAULT_EXPIRES_IN_SECS: u64 = 900;

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
struct DeviceCodeRequest<'a> {
    client_id: &'a str,
    scope: &'a str,
}

/// Device code response from GitHub.
#[derive(Debug, Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    verification_uri: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    interval: Option<u64>,
}

#[derive(Debug, Serialize)]
struct TokenPollRequest<'a> {
    client_id: &'a str,
    device_code: &'a str,
    grant_type: &'a str,
}

/// Token poll response. GitHub answers 200 for both success and errors.
#[derive(Debug, Deserialize)]
struct TokenPollResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
    /// Only used for the failure message, so any JSON shape is accepted.
    #[serde(default)]
    error_description: Option<serde_json::Value>,
}

impl From<DeviceCodeResponse> for DeviceAuthorizationSession {
    fn from(response: DeviceCodeResponse) -> Self {
        Self {
            device_code: response.device_code,
            user_code: response.user_code,
            verification_uri: response.verification_uri,
            interval: response
                .interval
                .filter(|i| *i > 0)
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
            expires_in: response
                .expires_in
                .filter(|e| *e > 0)
                .unwrap_or(DEFAULT_EXPIRES_IN_SECS),
        }
    }
}

// ============================================================================
// Poll Outcome
// ============================================================================

/// Result of a single poll of the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// User has not decided yet - keep polling.
    Pending,

    /// User authorized. Only the refresh credential is set.
    Success(OAuthCredential),

    /// Terminal failure; the device flow has to start over.
    Failed(String),
}

impl PollOutcome {
    /// Returns true while the caller should keep polling.
    pub fn is_pending(&self) -> bool {
        matches!(self, PollOutcome::Pending)
    }
}

// ============================================================================
// Device Flow
// ============================================================================

/// GitHub Device Flow client for Copilot. Stateless.
#[derive(Debug, Clone)]
pub struct CopilotDeviceFlow {
    http: reqwest::Client,
    config: CopilotConfig,
}

impl CopilotDeviceFlow {
    /// Creates a device flow client.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(config: CopilotConfig) -> Result<Self, CopilotError> {
        let http = config.http_client()?;
        Ok(Self { http, config })
    }

    /// Creates a device flow client reusing an existing HTTP client.
    pub fn with_http(http: reqwest::Client, config: CopilotConfig) -> Self {
        Self { http, config }
    }

    /// Headers for GitHub OAuth requests.
    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, self.config.user_agent());
        headers
    }

    /// Starts a device authorization.
    ///
    /// # Errors
    ///
    /// Transport failures propagate. A non-2xx answer is
    /// [`CopilotError::DeviceFlowFailed`], an unparsable body
    /// [`CopilotError::InvalidResponse`].
    #[instrument(skip(self))]
    pub async fn authorize(&self) -> Result<DeviceAuthorizationSession, CopilotError> {
        debug!("Starting GitHub device flow");

        let response = self
            .http
            .post(self.config.device_code_url())
            .headers(self.build_headers())
            .json(&DeviceCodeRequest {
                client_id: self.config.client_id(),
                scope: self.config.scope(),
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(CopilotError::DeviceFlowFailed(format!(
                "HTTP {status}: {body}"
            )));
        }

        let parsed: DeviceCodeResponse = serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, "Failed to parse device code response");
            CopilotError::InvalidResponse(format!("JSON parse error: {e}"))
        })?;
        let session = DeviceAuthorizationSession::from(parsed);

        debug!(
            user_code = %session.user_code,
            verification_uri = %session.verification_uri,
            interval = session.interval,
            expires_in = session.expires_in,
            "Device flow started"
        );

        Ok(session)
    }

    /// Polls the token endpoint once.
    ///
    /// # Errors
    ///
    /// Transport failures, and a 2xx body that is not a JSON object, are
    /// errors ([`CopilotError::InvalidResponse`] for the latter). Every other
    /// HTTP answer maps to a [`PollOutcome`].
    #[instrument(skip(self, device_code))]
    pub async fn poll(&self, device_code: &str) -> Result<PollOutcome, CopilotError> {
        let response = self
            .http
            .post(self.config.access_token_url())
            .headers(self.build_headers())
            .json(&TokenPollRequest {
                client_id: self.config.client_id(),
                device_code,
                grant_type: DEVICE_CODE_GRANT,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!(%status, "Token poll rejected");
            return Ok(PollOutcome::Failed(format!("HTTP {status}")));
        }

        let body = response.text().await?;
        let data = serde_json::from_str::<TokenPollResponse>(&body).map_err(|e| {
            warn!(error = %e, "Unparsable token poll response");
            CopilotError::InvalidResponse(format!("JSON parse error: {e}"))
        })?;

        Ok(classify(data))
    }

    /// Polls until the user decides or the session lifetime runs out.
    ///
    /// Sleeps `session.interval` through `clock` before every poll.
    ///
    /// # Errors
    ///
    /// [`CopilotError::DeviceFlowExpired`] once `expires_in` has elapsed,
    /// [`CopilotError::DeviceFlowFailed`] on a terminal poll result, and any
    /// transport error from [`poll`](Self::poll).
    #[instrument(skip_all, fields(user_code = %session.user_code))]
    pub async fn wait_for_authorization<C: Clock>(
        &self,
        session: &DeviceAuthorizationSession,
        clock: &C,
    ) -> Result<OAuthCredential, CopilotError> {
        let lifetime_ms = i64::try_from(session.lifetime().as_millis()).unwrap_or(i64::MAX);
        let deadline = clock.now_millis().saturating_add(lifetime_ms);
        let interval = session.poll_interval();

        loop {
            clock.sleep(interval).await;

            if clock.now_millis() >= deadline {
                warn!("Device code expired before authorization");
                return Err(CopilotError::DeviceFlowExpired);
            }

            match self.poll(&session.device_code).await? {
                PollOutcome::Pending => {}
                PollOutcome::Success(credential) => {
                    debug!("Device flow completed");
                    return Ok(credential);
                }
                PollOutcome::Failed(reason) => {
                    return Err(CopilotError::DeviceFlowFailed(reason));
                }
            }
        }
    }
}

/// Maps a 2xx poll body to an outcome.
fn classify(data: TokenPollResponse) -> PollOutcome {
    if let Some(token) = data.access_token.filter(|t| !t.is_empty()) {
        return PollOutcome::Success(OAuthCredential::from_refresh(token));
    }

    match data.error.as_deref() {
        Some("authorization_pending") => PollOutcome::Pending,
        Some(error) => {
            let reason = match data.error_description {
                Some(serde_json::Value::String(description)) => format!("{error}: {description}"),
                Some(serde_json::Value::Null) | None => error.to_string(),
                Some(description) => format!("{error}: {description}"),
            };
            debug!(%reason, "Device flow rejected");
            PollOutcome::Failed(reason)
        }
        None => PollOutcome::Pending,
    }
}

// ============================================================================
// Tests
// ============================================================================
