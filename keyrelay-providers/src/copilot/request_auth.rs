//! Per-request auth resolution for routed models.

use keyrelay_core::{COPILOT_PROVIDER_ID, Clock};
use reqwest::header::HeaderMap;

use super::error::CopilotError;
use super::manager::CredentialManager;
use super::token_exchange::TokenExchanger;

/// Resolves Copilot headers for requests routed to a `github-copilot` model.
///
/// Returns `Ok(None)` for every other model.
///
/// # Errors
///
/// [`CopilotError::AuthenticationRequired`] when the model needs Copilot and
/// no token is available, plus any error from the manager.
pub async fn headers_for_model<E: TokenExchanger, C: Clock>(
    manager: &CredentialManager<E, C>,
    model: &str,
) -> Result<Option<HeaderMap>, CopilotError> {
    if !model.contains(COPILOT_PROVIDER_ID) {
        return Ok(None);
    }

    match manager.auth_headers(COPILOT_PROVIDER_ID).await? {
        Some(headers) => Ok(Some(headers)),
        None => Err(CopilotError::AuthenticationRequired(
            "GitHub Copilot authentication required. Please run 'keyrelay login'".to_string(),
        )),
    }
}
