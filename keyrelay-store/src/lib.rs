// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `keyrelay` Store
//!
//! Credential persistence for `keyrelay`.
//!
//! This crate provides:
//!
//! - **CredentialStore**: Provider id → credential map in a single JSON file
//! - **Persistence**: JSON file helpers with owner-only permissions
//!
//! ## Usage
//!
//! ```ignore
//! use keyrelay_core::Credential;
//! use keyrelay_store::CredentialStore;
//!
//! let store = CredentialStore::open_default();
//! store.set("openrouter", &Credential::api_key("sk-or-...")).await?;
//!
//! for (id, cred) in store.all().await {
//!     println!("{id} {}", cred.type_label());
//! }
//! ```

pub mod credential_store;
pub mod error;
pub mod persistence;

pub use credential_store::{CredentialMap, CredentialStore};
pub use error::StoreError;
pub use persistence::{
    default_auth_path, default_config_dir, ensure_dir, load_json, load_json_or_default, save_json,
    CONFIG_DIR_ENV,
};

#[cfg(test)]
mod credential_store_tests;
