//! Stored credential types.
//!
//! The credential file holds one [`Credential`] per provider id:
//!
//! ```json
//! {
//!   "github-copilot": {
//!     "type": "oauth",
//!     "refresh": "gho_...",
//!     "access": "tid=...",
//!     "expires": 1735000000000
//!   },
//!   "openrouter": { "type": "api", "key": "sk-or-..." }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ============================================================================
// Credential
// ============================================================================

/// A provider credential as persisted in the credential file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Credential {
    /// OAuth refresh/access token pair.
    Oauth(OAuthCredential),

    /// Static API key without expiry.
    Api {
        /// The secret key.
        key: String,
    },
}

impl Credential {
    /// Creates an api-key credential.
    pub fn api_key(key: impl Into<String>) -> Self {
        Self::Api { key: key.into() }
    }

    /// Returns the serialized type tag ("oauth" or "api").
    pub fn type_label(&self) -> &'static str {
        match self {
            Self::Oauth(_) => "oauth",
            Self::Api { .. } => "api",
        }
    }

    /// Returns the OAuth payload, if this is an OAuth credential.
    pub fn as_oauth(&self) -> Option<&OAuthCredential> {
        match self {
            Self::Oauth(oauth) => Some(oauth),
            Self::Api { .. } => None,
        }
    }

    /// Consumes the credential and returns the OAuth payload, if any.
    pub fn into_oauth(self) -> Option<OAuthCredential> {
        match self {
            Self::Oauth(oauth) => Some(oauth),
            Self::Api { .. } => None,
        }
    }
}

impl From<OAuthCredential> for Credential {
    fn from(oauth: OAuthCredential) -> Self {
        Self::Oauth(oauth)
    }
}

// ============================================================================
// OAuth Credential
// ============================================================================

/// OAuth credential: long-lived refresh token plus the current access token.
///
/// `expires` is the access token's absolute expiry in epoch milliseconds.
/// An empty `access` means no access token has been issued yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthCredential {
    /// Refresh credential (the GitHub OAuth token for Copilot).
    pub refresh: String,

    /// Short-lived access token, possibly empty.
    pub access: String,

    /// Access token expiry (epoch milliseconds).
    pub expires: i64,
}

impl OAuthCredential {
    /// Creates a credential holding only a refresh token.
    ///
    /// This is what the device flow yields: the access token has to be
    /// obtained by a subsequent exchange.
    pub fn from_refresh(refresh: impl Into<String>) -> Self {
        Self {
            refresh: refresh.into(),
            access: String::new(),
            expires: 0,
        }
    }

    /// Returns true if an access token is present and expires after `now_ms`.
    pub fn has_valid_access(&self, now_ms: i64) -> bool {
        !self.access.is_empty() && self.expires > now_ms
    }

    /// Returns true if the access token is missing or expires before
    /// `now_ms + horizon_ms`.
    pub fn expires_within(&self, now_ms: i64, horizon_ms: i64) -> bool {
        self.access.is_empty() || self.expires < now_ms.saturating_add(horizon_ms)
    }

    /// Milliseconds until the access token expires (negative once expired).
    pub fn remaining_ms(&self, now_ms: i64) -> i64 {
        self.expires - now_ms
    }

    /// Returns a copy with a freshly exchanged access token.
    ///
    /// The refresh token is never touched by an exchange.
    #[must_use]
    pub fn with_access(&self, access: AccessCredential) -> Self {
        Self {
            refresh: self.refresh.clone(),
            access: access.access,
            expires: access.expires,
        }
    }
}

// ============================================================================
// Access Credential
// ============================================================================

/// Access token issued by a token exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCredential {
    /// Bearer token for API calls.
    pub access: String,

    /// Expiry (epoch milliseconds).
    pub expires: i64,
}

impl AccessCredential {
    /// Builds an access credential from a server expiry in epoch seconds.
    pub fn from_expiry_secs(access: impl Into<String>, expires_at_secs: i64) -> Self {
        Self {
            access: access.into(),
            expires: expires_at_secs.saturating_mul(1000),
        }
    }
}

// ============================================================================
// Provider Ids
// ============================================================================

/// Checks that a provider id only uses lowercase ASCII letters, digits and hyphens.
///
/// # Errors
///
/// Returns [`CoreError::InvalidProviderId`] for empty ids or ids with any
/// other character.
pub fn validate_provider_id(id: &str) -> Result<(), CoreError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if valid {
        Ok(())
    } else {
        Err(CoreError::InvalidProviderId(id.to_string()))
    }
}
