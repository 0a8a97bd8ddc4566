//! Credential store round-trip and edge case tests.

use tempfile::TempDir;

use keyrelay_core::{Credential, OAuthCredential};

use crate::credential_store::{CredentialMap, CredentialStore};

fn store_in(dir: &TempDir) -> CredentialStore {
    CredentialStore::new(dir.path().join("auth.json"))
}

fn oauth(refresh: &str, access: &str, expires: i64) -> Credential {
    Credential::Oauth(OAuthCredential {
        refresh: refresh.into(),
        access: access.into(),
        expires,
    })
}

// ============================================================================
// Reads
// ============================================================================

#[tokio::test]
async fn test_missing_file_reads_empty() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    assert!(store.all().await.is_empty());
    assert!(store.get("github-copilot").await.is_none());
}

#[tokio::test]
async fn test_corrupt_file_reads_empty() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    tokio::fs::write(store.path(), "{\"p\": {\"type\": ").await.unwrap();

    assert!(store.all().await.is_empty());
    assert!(store.get("p").await.is_none());
    assert!(store.load_strict().await.is_err());
}

#[tokio::test]
async fn test_reads_file_written_by_other_tools() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let raw = r#"{
  "github-copilot": {
    "type": "oauth",
    "refresh": "gho_abc",
    "access": "tid=1",
    "expires": 1735000000000
  }
}"#;
    tokio::fs::write(store.path(), raw).await.unwrap();

    assert_eq!(
        store.get("github-copilot").await,
        Some(oauth("gho_abc", "tid=1", 1_735_000_000_000))
    );
}

// ============================================================================
// Writes
// ============================================================================

#[tokio::test]
async fn test_set_then_get() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let cred = oauth("R", "", 0);

    store.set("p", &cred).await.unwrap();

    assert_eq!(store.get("p").await, Some(cred));
}

#[tokio::test]
async fn test_set_replaces_existing_entry() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    store.set("p", &oauth("R", "", 0)).await.unwrap();
    store.set("p", &oauth("R", "A", 42)).await.unwrap();

    let all = store.all().await;
    assert_eq!(all.len(), 1);
    assert_eq!(all["p"], oauth("R", "A", 42));
}

#[tokio::test]
async fn test_all_roundtrip() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    let mut expected = CredentialMap::new();
    expected.insert("github-copilot".into(), oauth("gho_x", "tok", 1_700_000_000_000));
    expected.insert("openrouter".into(), Credential::api_key("sk-or-1"));
    expected.insert("deepseek".into(), Credential::api_key("sk-ds"));

    for (id, cred) in &expected {
        store.set(id, cred).await.unwrap();
    }

    assert_eq!(store.all().await, expected);
}

#[tokio::test]
async fn test_set_creates_config_directory() {
    let dir = TempDir::new().unwrap();
    let store = CredentialStore::new(dir.path().join("nested").join("cfg").join("auth.json"));

    store.set("p", &Credential::api_key("k")).await.unwrap();

    assert!(store.path().exists());
}

#[tokio::test]
async fn test_set_over_corrupt_file_starts_fresh() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    tokio::fs::write(store.path(), "garbage").await.unwrap();

    store.set("p", &Credential::api_key("k")).await.unwrap();

    assert_eq!(store.all().await.len(), 1);
}

#[tokio::test]
async fn test_set_fails_when_directory_is_a_file() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    tokio::fs::write(&blocker, "x").await.unwrap();
    let store = CredentialStore::new(blocker.join("auth.json"));

    assert!(store.set("p", &Credential::api_key("k")).await.is_err());
}

#[cfg(unix)]
#[tokio::test]
async fn test_written_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.set("p", &Credential::api_key("k")).await.unwrap();

    let mode = std::fs::metadata(store.path()).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o600);

    store.remove("p").await.unwrap();
    let mode = std::fs::metadata(store.path()).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o600);
}

// ============================================================================
// Remove
// ============================================================================

#[tokio::test]
async fn test_remove_present_key() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.set("a", &Credential::api_key("1")).await.unwrap();
    store.set("b", &Credential::api_key("2")).await.unwrap();

    store.remove("a").await.unwrap();

    assert!(store.get("a").await.is_none());
    assert_eq!(store.get("b").await, Some(Credential::api_key("2")));
}

#[tokio::test]
async fn test_remove_absent_key_is_noop() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.set("a", &Credential::api_key("1")).await.unwrap();
    let before = store.all().await;

    store.remove("missing").await.unwrap();

    assert_eq!(store.all().await, before);
}

#[tokio::test]
async fn test_file_is_pretty_printed_json_object() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.set("p", &Credential::api_key("k")).await.unwrap();

    let raw = tokio::fs::read_to_string(store.path()).await.unwrap();
    assert!(raw.starts_with("{\n  \"p\""));
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["p"]["type"], "api");
}
