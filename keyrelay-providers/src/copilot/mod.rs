//! Copilot (GitHub) authentication.
//!
//! - GitHub Device Flow login yielding the GitHub OAuth token
//! - Exchange of that token for short-lived Copilot API tokens
//! - A credential manager that refreshes transparently and builds headers
//!
//! ## Device Flow
//!
//! ```ignore
//! use keyrelay_providers::copilot::{CopilotConfig, CopilotDeviceFlow, PollOutcome};
//!
//! let flow = CopilotDeviceFlow::new(CopilotConfig::default())?;
//! let session = flow.authorize().await?;
//! println!("Go to {} and enter: {}", session.verification_uri, session.user_code);
//!
//! loop {
//!     tokio::time::sleep(session.poll_interval()).await;
//!     match flow.poll(&session.device_code).await? {
//!         PollOutcome::Pending => continue,
//!         PollOutcome::Success(credential) => break credential,
//!         PollOutcome::Failed(reason) => return Err(reason.into()),
//!     }
//! }
//! ```
//!
//! ## Headers
//!
//! ```ignore
//! let manager = CredentialManager::new(CredentialStore::open_default(), CopilotConfig::default())?;
//! if let Some(headers) = manager.auth_headers("github-copilot").await? {
//!     client.post(url).headers(headers).json(&body).send().await?;
//! }
//! ```

// Modules
mod autofill;
mod config;
mod device_flow;
mod error;
mod manager;
mod request_auth;
mod token_exchange;


// Re-exports
pub use autofill::{fill_provider_auth, ProviderEntry, AUTHENTICATED_MARKER, AUTH_REQUIRED_PLACEHOLDER};
pub use config::{
    CopilotConfig, ACCESS_TOKEN_URL, COPILOT_CLIENT_ID, COPILOT_SCOPE, DEVICE_CODE_URL,
    TOKEN_EXCHANGE_URL,
};
pub use device_flow::{CopilotDeviceFlow, PollOutcome};
pub use error::CopilotError;
pub use manager::{CredentialManager, CredentialState, REFRESH_HORIZON_MS};
pub use request_auth::headers_for_model;
pub use token_exchange::{CopilotEndpoints, CopilotTokenExchange, CopilotTokenResponse, TokenExchanger};
