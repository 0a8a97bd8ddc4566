//! Domain models for `keyrelay`.
//!
//! ## Submodules
//!
//! - [`credential`] - Stored credentials (api key / OAuth) and access tokens
//! - [`session`] - Device authorization session returned by the device flow

mod credential;
mod session;

pub use credential::{validate_provider_id, AccessCredential, Credential, OAuthCredential};
pub use session::{DeviceAuthorizationSession, DEFAULT_POLL_INTERVAL_SECS};

/// Provider identifier under which the Copilot OAuth credential is stored.
pub const COPILOT_PROVIDER_ID: &str = "github-copilot";
