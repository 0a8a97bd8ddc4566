//! Device authorization session.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Interval used when the authorization server does not send one.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// An in-progress device authorization.
///
/// Created by the device flow's `authorize` call and consumed by polling.
/// Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceAuthorizationSession {
    /// Code identifying this device to the token endpoint.
    pub device_code: String,

    /// Code the user types on the verification page.
    pub user_code: String,

    /// Page where the user enters `user_code`.
    pub verification_uri: String,

    /// Minimum seconds between polls.
    pub interval: u64,

    /// Seconds until the device code expires.
    pub expires_in: u64,
}

impl DeviceAuthorizationSession {
    /// Polling interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    /// Session lifetime as a [`Duration`].
    pub fn lifetime(&self) -> Duration {
        Duration::from_secs(self.expires_in)
    }
}
