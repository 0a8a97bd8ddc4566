//! Credential manager.
//!
//! Owns the lifecycle of a stored OAuth credential:
//!
//! ```text
//!            complete_login            exchange ok
//! Absent ─────────────────▶ Stale ─────────────────▶ Valid
//!                             ▲  │ exchange rejected     │
//!                             │  ▼                       │ expires
//!                             │ Unrecoverable            │
//!                             └──────────────────────────┘
//! ```
//!
//! `Unrecoverable` is not stored anywhere; it is what an exchange rejection
//! means. The stored refresh token is kept until the user runs `logout` or
//! logs in again.
//!
//! Only the `github-copilot` entry is ever sent to the Copilot token
//! endpoint. OAuth entries written by other tools for other providers are
//! reported as [`CredentialState::Unmanaged`] and never refreshed.

use keyrelay_core::{
    COPILOT_PROVIDER_ID, Clock, CoreError, Credential, OAuthCredential, SystemClock,
    validate_provider_id,
};
use keyrelay_store::CredentialStore;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::{debug, info, instrument, warn};

use super::config::CopilotConfig;
use super::error::CopilotError;
use super::token_exchange::{CopilotTokenExchange, TokenExchanger};

/// Refresh proactively when the access token expires within this window.
pub const REFRESH_HORIZON_MS: i64 = 5 * 60 * 1000;

// ============================================================================
// Credential State
// ============================================================================

/// Classification of a provider's stored credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialState {
    /// Nothing stored.
    Absent,

    /// Static api key; nothing to refresh.
    ApiKey,

    /// OAuth credential for a provider this manager does not refresh.
    Unmanaged,

    /// Access token present and unexpired.
    Valid {
        /// Access token expiry (epoch milliseconds).
        expires: i64,
    },

    /// Access token missing or expired, refresh token still accepted.
    Stale,

    /// Refresh token rejected; interactive login required.
    Unrecoverable,
}

impl CredentialState {
    /// Returns true if the user has to log in again.
    pub fn needs_login(&self) -> bool {
        matches!(self, CredentialState::Absent | CredentialState::Unrecoverable)
    }
}

// ============================================================================
// Manager
// ============================================================================

/// Decides when tokens are stale, refreshes them and hands out headers.
///
/// This is the only component that writes OAuth fields to the store.
#[derive(Debug, Clone)]
pub struct CredentialManager<E = CopilotTokenExchange, C = SystemClock> {
    store: CredentialStore,
    exchange: E,
    clock: C,
    config: CopilotConfig,
}

impl CredentialManager {
    /// Creates a manager using the real token endpoint and system clock.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(store: CredentialStore, config: CopilotConfig) -> Result<Self, CopilotError> {
        let exchange = CopilotTokenExchange::new(config.clone())?;
        Ok(Self::with_parts(store, exchange, SystemClock, config))
    }
}

impl<E: TokenExchanger, C: Clock> CredentialManager<E, C> {
    /// Assembles a manager from explicit parts.
    pub fn with_parts(store: CredentialStore, exchange: E, clock: C, config: CopilotConfig) -> Self {
        Self {
            store,
            exchange,
            clock,
            config,
        }
    }

    /// The underlying credential store.
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// The clock used for expiry checks.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The stored Copilot OAuth credential. Other providers never qualify.
    async fn load_oauth(&self, provider: &str) -> Option<OAuthCredential> {
        if provider != COPILOT_PROVIDER_ID {
            debug!(provider, "Not a Copilot provider, nothing to refresh");
            return None;
        }
        match self.store.get(provider).await {
            Some(Credential::Oauth(oauth)) => Some(oauth),
            Some(Credential::Api { .. }) | None => None,
        }
    }

    /// Exchanges the refresh token and persists the new access token.
    async fn refresh(
        &self,
        provider: &str,
        oauth: &OAuthCredential,
    ) -> Result<Option<OAuthCredential>, CopilotError> {
        let Some(access) = self.exchange.exchange(&oauth.refresh).await? else {
            return Ok(None);
        };

        let updated = oauth.with_access(access);
        self.store
            .set(provider, &Credential::Oauth(updated.clone()))
            .await?;

        debug!(provider, expires = updated.expires, "Stored refreshed access token");
        Ok(Some(updated))
    }

    /// Returns a usable access token, refreshing it if it has expired.
    ///
    /// `Ok(None)` when nothing OAuth is stored or the refresh token was
    /// rejected; the stored credential is left as it is in both cases.
    ///
    /// # Errors
    ///
    /// Transport failures during the exchange and failed writes.
    #[instrument(skip(self))]
    pub async fn access_token(&self, provider: &str) -> Result<Option<String>, CopilotError> {
        let Some(oauth) = self.load_oauth(provider).await else {
            debug!("No OAuth credential stored");
            return Ok(None);
        };

        if oauth.has_valid_access(self.clock.now_millis()) {
            return Ok(Some(oauth.access));
        }

        debug!("Access token missing or expired, refreshing");
        match self.refresh(provider, &oauth).await? {
            Some(updated) => Ok(Some(updated.access)),
            None => {
                warn!(provider, "Refresh token rejected, re-authentication required");
                Ok(None)
            }
        }
    }

    /// Headers for an authenticated API call, refreshing if needed.
    ///
    /// # Errors
    ///
    /// Same as [`access_token`](Self::access_token), plus tokens that are not
    /// valid header values.
    pub async fn auth_headers(&self, provider: &str) -> Result<Option<HeaderMap>, CopilotError> {
        match self.access_token(provider).await? {
            Some(access) => self.build_headers(&access).map(Some),
            None => Ok(None),
        }
    }

    /// Client headers + `Authorization: Bearer <access>` + intent marker.
    ///
    /// # Errors
    ///
    /// Returns [`CopilotError::InvalidHeader`] if the token has bytes not
    /// allowed in a header.
    pub fn build_headers(&self, access: &str) -> Result<HeaderMap, CopilotError> {
        let mut headers = self.config.client_headers();

        let mut bearer = HeaderValue::from_str(&format!("Bearer {access}"))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let (name, value) = self.config.intent_header();
        headers.insert(name, value);
        Ok(headers)
    }

    /// Returns true if headers can currently be produced.
    ///
    /// # Errors
    ///
    /// Same as [`auth_headers`](Self::auth_headers).
    pub async fn is_authenticated(&self, provider: &str) -> Result<bool, CopilotError> {
        Ok(self.auth_headers(provider).await?.is_some())
    }

    /// Returns true if the user has to run the device flow again.
    ///
    /// Probes the refresh token with an exchange when the access token is
    /// stale, but never writes the result.
    ///
    /// # Errors
    ///
    /// Transport failures during the probe.
    #[instrument(skip(self))]
    pub async fn needs_reauth(&self, provider: &str) -> Result<bool, CopilotError> {
        let Some(oauth) = self.load_oauth(provider).await else {
            return Ok(true);
        };

        if oauth.has_valid_access(self.clock.now_millis()) {
            return Ok(false);
        }

        Ok(self.exchange.exchange(&oauth.refresh).await?.is_none())
    }

    /// Refreshes when the access token is missing or expires within
    /// [`REFRESH_HORIZON_MS`].
    ///
    /// Returns false if nothing OAuth is stored or the refresh was rejected;
    /// the stored credential is never cleared here.
    ///
    /// # Errors
    ///
    /// Transport failures and failed writes.
    #[instrument(skip(self))]
    pub async fn refresh_token_if_needed(&self, provider: &str) -> Result<bool, CopilotError> {
        let Some(oauth) = self.load_oauth(provider).await else {
            return Ok(false);
        };

        if !oauth.expires_within(self.clock.now_millis(), REFRESH_HORIZON_MS) {
            debug!("Access token still valid");
            return Ok(true);
        }

        info!(provider, "Proactively refreshing access token");
        match self.refresh(provider, &oauth).await? {
            Some(_) => Ok(true),
            None => {
                warn!(provider, "Failed to refresh token, re-authentication may be needed");
                Ok(false)
            }
        }
    }

    /// Classifies the stored credential without writing anything.
    ///
    /// # Errors
    ///
    /// Transport failures while probing a stale credential.
    #[instrument(skip(self))]
    pub async fn inspect(&self, provider: &str) -> Result<CredentialState, CopilotError> {
        let oauth = match self.store.get(provider).await {
            None => return Ok(CredentialState::Absent),
            Some(Credential::Api { .. }) => return Ok(CredentialState::ApiKey),
            Some(Credential::Oauth(_)) if provider != COPILOT_PROVIDER_ID => {
                return Ok(CredentialState::Unmanaged);
            }
            Some(Credential::Oauth(oauth)) => oauth,
        };

        if oauth.has_valid_access(self.clock.now_millis()) {
            return Ok(CredentialState::Valid {
                expires: oauth.expires,
            });
        }

        let state = match self.exchange.exchange(&oauth.refresh).await? {
            Some(_) => CredentialState::Stale,
            None => CredentialState::Unrecoverable,
        };
        Ok(state)
    }

    /// Stores the credential produced by a completed device flow.
    ///
    /// # Errors
    ///
    /// Failed writes.
    #[instrument(skip(self, credential))]
    pub async fn complete_login(
        &self,
        provider: &str,
        credential: OAuthCredential,
    ) -> Result<(), CopilotError> {
        self.store
            .set(provider, &Credential::Oauth(credential))
            .await?;
        info!(provider, "Login stored");
        Ok(())
    }

    /// Stores a static api key for another provider.
    ///
    /// # Errors
    ///
    /// Invalid provider ids, empty keys and failed writes.
    #[instrument(skip(self, key))]
    pub async fn store_api_key(&self, provider: &str, key: &str) -> Result<(), CopilotError> {
        validate_provider_id(provider)?;
        let key = key.trim();
        if key.is_empty() {
            return Err(CoreError::InvalidCredential("API key is empty".into()).into());
        }

        self.store.set(provider, &Credential::api_key(key)).await?;
        Ok(())
    }

    /// Removes a provider's credential.
    ///
    /// # Errors
    ///
    /// Failed writes.
    #[instrument(skip(self))]
    pub async fn logout(&self, provider: &str) -> Result<(), CopilotError> {
        self.store.remove(provider).await?;
        info!(provider, "Credential removed");
        Ok(())
    }
}
