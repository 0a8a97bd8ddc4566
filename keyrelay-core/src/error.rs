//! Core error types for `keyrelay`.

use thiserror::Error;

/// Core error type for `keyrelay` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Provider identifier is empty or uses characters outside `[0-9a-z-]`.
    #[error("Invalid provider id '{0}': a-z, 0-9 and hyphens only")]
    InvalidProviderId(String),

    /// Credential value is unusable (for example an empty api key).
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),
}
