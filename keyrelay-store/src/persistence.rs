//! File persistence helpers.
//!
//! Handles loading and saving JSON to disk with owner-only permissions.

use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::StoreError;

/// Environment variable overriding the configuration directory.
pub const CONFIG_DIR_ENV: &str = "KEYRELAY_HOME";

/// Directory under the home directory used when no override is set.
const DEFAULT_DIR_NAME: &str = ".claude-code-router";

/// Credential file name inside the configuration directory.
const AUTH_FILE_NAME: &str = "auth.json";

// ============================================================================
// Default Paths
// ============================================================================

/// Returns the configuration directory.
///
/// `$KEYRELAY_HOME` when set and non-empty, otherwise `~/.claude-code-router`.
pub fn default_config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }

    dirs::home_dir()
        .map(|h| h.join(DEFAULT_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DIR_NAME))
}

/// Returns the default credential file path.
pub fn default_auth_path() -> PathBuf {
    default_config_dir().join(AUTH_FILE_NAME)
}

// ============================================================================
// Owner-only access
// ============================================================================

/// Mode for the credential file: owner read/write.
const FILE_MODE: u32 = 0o600;

/// Mode for the configuration directory: owner only.
const DIR_MODE: u32 = 0o700;

#[cfg(unix)]
async fn restrict_mode(path: &Path, mode: u32) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await?;
    debug!(path = %path.display(), mode = %format!("{mode:o}"), "Restricted permissions");
    Ok(())
}

#[cfg(not(unix))]
async fn restrict_mode(_path: &Path, _mode: u32) -> Result<(), StoreError> {
    Ok(())
}

/// Restricts `path` to `mode`, logging instead of failing.
///
/// Some filesystems (network mounts, FAT volumes) reject mode changes.
async fn restrict_best_effort(path: &Path, mode: u32) {
    if let Err(e) = restrict_mode(path, mode).await {
        warn!(path = %path.display(), error = %e, "Could not restrict permissions");
    }
}

/// Makes the credential file owner-only, logging on failure.
pub(crate) async fn secure_file_best_effort(path: &Path) {
    restrict_best_effort(path, FILE_MODE).await;
}

// ============================================================================
// File Operations
// ============================================================================

/// Ensures a directory exists, restricting it to the owner when created.
///
/// Idempotent: an existing directory is left as is.
pub async fn ensure_dir(path: &Path) -> Result<(), StoreError> {
    if tokio::fs::try_exists(path).await? {
        return Ok(());
    }

    debug!(path = %path.display(), "Creating directory");
    tokio::fs::create_dir_all(path).await?;

    restrict_best_effort(path, DIR_MODE).await;
    Ok(())
}

/// Writes `contents` to a sibling temp file, then renames it over `path`.
async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    use tokio::io::AsyncWriteExt;

    let temp_path = path.with_extension("json.tmp");

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(FILE_MODE);

    let mut file = options.open(&temp_path).await?;
    file.write_all(contents).await?;
    file.flush().await?;
    drop(file);

    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e.into());
    }
    Ok(())
}

/// Saves data to a JSON file with owner-only permissions.
///
/// Creates the parent directory if needed, writes atomically (temp file +
/// rename) and then restricts permissions. Permission failures are logged and
/// ignored; every other failure is returned.
pub async fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    debug!(path = %path.display(), "Saving JSON file");

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent).await?;
    }

    let json = serde_json::to_string_pretty(data)?;
    write_atomic(path, json.as_bytes()).await?;

    secure_file_best_effort(path).await;

    debug!(path = %path.display(), "JSON file saved");
    Ok(())
}

/// Loads data from a JSON file.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    debug!(path = %path.display(), "Loading JSON file");

    let content = tokio::fs::read_to_string(path).await?;
    let data = serde_json::from_str(&content)?;

    Ok(data)
}

/// Loads data from a JSON file, returning the default on any failure.
///
/// A missing file is silent; unreadable or corrupt files are logged.
pub async fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match load_json(path).await {
        Ok(data) => data,
        Err(e) => {
            if !e.is_not_found() {
                warn!(path = %path.display(), error = %e, "Failed to load, using defaults");
            }
            T::default()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_auth_path() {
        let path = default_auth_path();
        assert!(path.ends_with("auth.json"));
    }

    #[test]
    fn test_default_config_dir_not_empty() {
        let path = default_config_dir();
        assert!(!path.as_os_str().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_restrict_mode_tightens_loose_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        tokio::fs::write(&path, "{}").await.unwrap();
        tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644))
            .await
            .unwrap();

        secure_file_best_effort(&path).await;

        let mode = tokio::fs::metadata(&path).await.unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_ensure_dir_creates_owner_only_dir() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("router");

        ensure_dir(&config).await.unwrap();
        ensure_dir(&config).await.unwrap();

        let mode = tokio::fs::metadata(&config).await.unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o700);
    }

    #[tokio::test]
    async fn test_save_leaves_no_temp_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("auth.json");

        save_json(&path, &serde_json::json!({"a": 1})).await.unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_load_json_or_default_on_corrupt_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("auth.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let loaded: std::collections::BTreeMap<String, String> =
            load_json_or_default(&path).await;
        assert!(loaded.is_empty());
    }
}
