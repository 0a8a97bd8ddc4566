//! Credential file store.
//!
//! One JSON object per user mapping provider ids to credentials. Every write
//! rewrites the whole file; there is no locking, so with several processes the
//! last writer wins.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use keyrelay_core::Credential;
use tracing::{debug, instrument};

use crate::error::StoreError;
use crate::persistence::{default_auth_path, load_json, load_json_or_default, save_json};

/// Provider id → credential, in key order.
pub type CredentialMap = BTreeMap<String, Credential>;

/// Reads and writes the credential file.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Creates a store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store at the default per-user location.
    pub fn open_default() -> Self {
        Self::new(default_auth_path())
    }

    /// The only file this store touches.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the credential for `id`.
    ///
    /// Missing, unreadable or corrupt files read as "no credential".
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Option<Credential> {
        let mut all = self.all().await;
        all.remove(id)
    }

    /// Returns every stored credential, or an empty map on any read failure.
    pub async fn all(&self) -> CredentialMap {
        load_json_or_default(&self.path).await
    }

    /// Inserts or replaces the credential for `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file cannot
    /// be written. Permission tightening failures are only logged.
    #[instrument(skip(self, credential), fields(kind = credential.type_label()))]
    pub async fn set(&self, id: &str, credential: &Credential) -> Result<(), StoreError> {
        let mut all = self.all().await;
        all.insert(id.to_string(), credential.clone());
        save_json(&self.path, &all).await?;

        debug!(count = all.len(), "Credential stored");
        Ok(())
    }

    /// Removes the credential for `id`; removing an unknown id is a no-op.
    ///
    /// The file is rewritten either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: &str) -> Result<(), StoreError> {
        let mut all = self.all().await;
        let removed = all.remove(id).is_some();
        save_json(&self.path, &all).await?;

        debug!(removed, count = all.len(), "Credential removed");
        Ok(())
    }

    /// Strict read used by diagnostics: surfaces IO and parse errors.
    ///
    /// # Errors
    ///
    /// Returns the underlying IO or JSON error.
    pub async fn load_strict(&self) -> Result<CredentialMap, StoreError> {
        load_json(&self.path).await
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::open_default()
    }
}
