//! Copilot-specific errors.

use keyrelay_core::CoreError;
use keyrelay_store::StoreError;
use thiserror::Error;

/// Copilot-specific errors.
#[derive(Debug, Error)]
pub enum CopilotError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Server answered with something we could not parse.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Device flow ended with an error from the authorization server.
    #[error("Device flow failed: {0}")]
    DeviceFlowFailed(String),

    /// Device flow expired.
    #[error("Device flow expired - user did not authorize in time")]
    DeviceFlowExpired,

    /// No usable credential; the user has to log in again.
    #[error("Authentication required: {0}")]
    AuthenticationRequired(String),

    /// A token contained bytes that cannot go into an HTTP header.
    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    /// Provider id or credential failed validation.
    #[error(transparent)]
    Invalid(#[from] CoreError),

    /// Writing the credential file failed.
    #[error("Credential store error: {0}")]
    Store(#[from] StoreError),
}

impl CopilotError {
    /// Returns true for network-level failures worth retrying later.
    pub fn is_transport(&self) -> bool {
        matches!(self, CopilotError::HttpError(_))
    }
}

impl From<reqwest::Error> for CopilotError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CopilotError::HttpError(format!("Request timed out: {err}"))
        } else if err.is_connect() {
            CopilotError::HttpError(format!("Connection failed: {err}"))
        } else {
            CopilotError::HttpError(err.to_string())
        }
    }
}

impl From<reqwest::header::InvalidHeaderValue> for CopilotError {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        CopilotError::InvalidHeader(err.to_string())
    }
}
