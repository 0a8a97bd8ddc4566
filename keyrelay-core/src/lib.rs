// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `keyrelay` Core
//!
//! Core types shared by every `keyrelay` crate:
//!
//! - [`Credential`] - Stored provider credential (api key or OAuth pair)
//! - [`OAuthCredential`] / [`AccessCredential`] - Refresh and access token values
//! - [`DeviceAuthorizationSession`] - Transient device-flow session
//! - [`Clock`] - Time source used by expiry checks and polling loops
//! - [`CoreError`] - Validation errors

pub mod clock;
pub mod error;
pub mod models;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::CoreError;
pub use models::{
    validate_provider_id, AccessCredential, Credential, DeviceAuthorizationSession,
    OAuthCredential, COPILOT_PROVIDER_ID, DEFAULT_POLL_INTERVAL_SECS,
};
