// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `keyrelay` Providers
//!
//! Provider authentication for `keyrelay`.
//!
//! Only GitHub Copilot uses OAuth; its module contains the device flow, the
//! token exchange and the [`CredentialManager`](copilot::CredentialManager)
//! that keeps access tokens fresh. Every other provider is stored as a static
//! api key through the same manager.

pub mod copilot;

pub use copilot::{
    CopilotConfig, CopilotDeviceFlow, CopilotError, CopilotTokenExchange, CredentialManager,
    CredentialState, PollOutcome, TokenExchanger,
};
