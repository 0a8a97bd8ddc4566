//! HTTP-level tests for the Copilot device flow and token exchange.

use std::time::Duration;

use keyrelay_core::{
    COPILOT_PROVIDER_ID, Clock, Credential, DeviceAuthorizationSession, ManualClock,
    OAuthCredential,
};
use keyrelay_providers::copilot::{
    CopilotConfig, CopilotDeviceFlow, CopilotError, CopilotTokenExchange, CredentialManager,
    PollOutcome, TokenExchanger,
};
use keyrelay_store::CredentialStore;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> CopilotConfig {
    CopilotConfig::default()
        .with_github_base(&server.uri())
        .with_api_base(&server.uri())
        .with_timeout(Duration::from_secs(5))
}

fn session(interval: u64, expires_in: u64) -> DeviceAuthorizationSession {
    DeviceAuthorizationSession {
        device_code: "dc1".into(),
        user_code: "ABCD-1234".into(),
        verification_uri: "https://github.com/login/device".into(),
        interval,
        expires_in,
    }
}

// ============================================================================
// authorize
// ============================================================================

#[tokio::test]
async fn test_authorize_returns_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login/device/code"))
        .and(header("accept", "application/json"))
        .and(body_partial_json(json!({
            "client_id": "Iv1.b507a08c87ecfe98",
            "scope": "read:user"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "device_code": "dc1",
            "user_code": "WDJB-MJHT",
            "verification_uri": "https://github.com/login/device",
            "expires_in": 900,
            "interval": 10
        })))
        .expect(1)
        .mount(&server)
        .await;

    let flow = CopilotDeviceFlow::new(config_for(&server)).unwrap();
    let session = flow.authorize().await.unwrap();

    assert_eq!(session.device_code, "dc1");
    assert_eq!(session.user_code, "WDJB-MJHT");
    assert_eq!(session.interval, 10);
    assert_eq!(session.expires_in, 900);
}

#[tokio::test]
async fn test_authorize_defaults_interval() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login/device/code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "device_code": "dc1",
            "user_code": "WDJB-MJHT",
            "verification_uri": "https://github.com/login/device",
            "expires_in": 900
        })))
        .mount(&server)
        .await;

    let flow = CopilotDeviceFlow::new(config_for(&server)).unwrap();
    assert_eq!(flow.authorize().await.unwrap().interval, 5);
}

#[tokio::test]
async fn test_authorize_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login/device/code"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad client"))
        .mount(&server)
        .await;

    let flow = CopilotDeviceFlow::new(config_for(&server)).unwrap();
    assert!(matches!(
        flow.authorize().await,
        Err(CopilotError::DeviceFlowFailed(_))
    ));
}

#[tokio::test]
async fn test_authorize_transport_error_propagates() {
    let config = CopilotConfig::default()
        .with_github_base("http://127.0.0.1:1")
        .with_timeout(Duration::from_secs(2));
    let flow = CopilotDeviceFlow::new(config).unwrap();

    let err = flow.authorize().await.unwrap_err();
    assert!(err.is_transport(), "unexpected error: {err}");
}

// ============================================================================
// poll
// ============================================================================

async fn mount_poll(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .and(body_partial_json(json!({
            "device_code": "dc1",
            "grant_type": "urn:ietf:params:oauth:grant-type:device_code"
        })))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_poll_pending() {
    let server = MockServer::start().await;
    mount_poll(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "error": "authorization_pending",
            "error_description": "The authorization request is still pending.",
            "access_token": ""
        })),
    )
    .await;

    let flow = CopilotDeviceFlow::new(config_for(&server)).unwrap();
    assert_eq!(flow.poll("dc1").await.unwrap(), PollOutcome::Pending);
}

#[tokio::test]
async fn test_poll_success_yields_refresh_only() {
    let server = MockServer::start().await;
    mount_poll(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "gho_abc",
            "token_type": "bearer",
            "scope": "read:user"
        })),
    )
    .await;

    let flow = CopilotDeviceFlow::new(config_for(&server)).unwrap();
    assert_eq!(
        flow.poll("dc1").await.unwrap(),
        PollOutcome::Success(OAuthCredential {
            refresh: "gho_abc".into(),
            access: String::new(),
            expires: 0,
        })
    );
}

#[tokio::test]
async fn test_poll_expired_token_fails() {
    let server = MockServer::start().await;
    mount_poll(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "error": "expired_token" })),
    )
    .await;

    let flow = CopilotDeviceFlow::new(config_for(&server)).unwrap();
    assert!(matches!(
        flow.poll("dc1").await.unwrap(),
        PollOutcome::Failed(_)
    ));
}

#[tokio::test]
async fn test_poll_non_success_status_fails() {
    let server = MockServer::start().await;
    mount_poll(&server, ResponseTemplate::new(500)).await;

    let flow = CopilotDeviceFlow::new(config_for(&server)).unwrap();
    assert!(matches!(
        flow.poll("dc1").await.unwrap(),
        PollOutcome::Failed(ref reason) if reason.contains("500")
    ));
}

#[tokio::test]
async fn test_poll_empty_body_is_pending() {
    let server = MockServer::start().await;
    mount_poll(&server, ResponseTemplate::new(200).set_body_json(json!({}))).await;

    let flow = CopilotDeviceFlow::new(config_for(&server)).unwrap();
    assert!(flow.poll("dc1").await.unwrap().is_pending());
}

#[tokio::test]
async fn test_poll_unparsable_body_is_invalid_response() {
    let server = MockServer::start().await;
    mount_poll(
        &server,
        ResponseTemplate::new(200).set_body_string("<html>login</html>"),
    )
    .await;

    let flow = CopilotDeviceFlow::new(config_for(&server)).unwrap();
    assert!(matches!(
        flow.poll("dc1").await,
        Err(CopilotError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_poll_denial_with_non_string_description_fails() {
    let server = MockServer::start().await;
    mount_poll(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "error": "access_denied",
            "error_description": ["denied"]
        })),
    )
    .await;

    let flow = CopilotDeviceFlow::new(config_for(&server)).unwrap();
    assert!(matches!(
        flow.poll("dc1").await.unwrap(),
        PollOutcome::Failed(ref reason) if reason.starts_with("access_denied")
    ));
}

// ============================================================================
// wait_for_authorization
// ============================================================================

#[tokio::test]
async fn test_wait_polls_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "error": "authorization_pending" })),
        )
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "gho_ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let flow = CopilotDeviceFlow::new(config_for(&server)).unwrap();
    let clock = ManualClock::new(0);

    let credential = flow
        .wait_for_authorization(&session(5, 900), &clock)
        .await
        .unwrap();

    assert_eq!(credential, OAuthCredential::from_refresh("gho_ok"));
    assert_eq!(clock.now_millis(), 15_000);
}

#[tokio::test]
async fn test_wait_aborts_after_session_lifetime() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "error": "authorization_pending" })),
        )
        .expect(2)
        .mount(&server)
        .await;

    let flow = CopilotDeviceFlow::new(config_for(&server)).unwrap();
    let clock = ManualClock::new(0);

    let result = flow.wait_for_authorization(&session(5, 15), &clock).await;

    assert!(matches!(result, Err(CopilotError::DeviceFlowExpired)));
}

#[tokio::test]
async fn test_wait_stops_on_denial() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "access_denied",
            "error_description": "The user has denied your application access."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let flow = CopilotDeviceFlow::new(config_for(&server)).unwrap();
    let result = flow
        .wait_for_authorization(&session(5, 900), &ManualClock::new(0))
        .await;

    assert!(matches!(
        result,
        Err(CopilotError::DeviceFlowFailed(ref reason)) if reason.starts_with("access_denied")
    ));
}

// ============================================================================
// exchange
// ============================================================================

#[tokio::test]
async fn test_exchange_sends_bearer_and_client_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/copilot_internal/v2/token"))
        .and(header("authorization", "Bearer gho_refresh"))
        .and(header("editor-version", "vscode/1.99.3"))
        .and(header("editor-plugin-version", "copilot-chat/0.26.7"))
        .and(header("copilot-integration-id", "vscode-chat"))
        .and(header("user-agent", "GitHubCopilotChat/0.26.7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tid=abc",
            "expires_at": 1_735_000_000,
            "refresh_in": 1500,
            "endpoints": { "api": "https://api.githubcopilot.com" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let exchange = CopilotTokenExchange::new(config_for(&server)).unwrap();
    let access = exchange.exchange("gho_refresh").await.unwrap().unwrap();

    assert_eq!(access.access, "tid=abc");
    assert_eq!(access.expires, 1_735_000_000_000);
}

#[tokio::test]
async fn test_exchange_rejected_returns_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/copilot_internal/v2/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Bad credentials" })))
        .mount(&server)
        .await;

    let exchange = CopilotTokenExchange::new(config_for(&server)).unwrap();
    assert!(exchange.exchange("gho_revoked").await.unwrap().is_none());
}

#[tokio::test]
async fn test_exchange_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/copilot_internal/v2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let exchange = CopilotTokenExchange::new(config_for(&server)).unwrap();
    assert!(matches!(
        exchange.exchange("gho").await,
        Err(CopilotError::InvalidResponse(_))
    ));
}

// ============================================================================
// Manager over HTTP
// ============================================================================

#[tokio::test]
async fn test_manager_refreshes_through_real_exchange() {
    let server = MockServer::start().await;
    let expires_at = chrono::Utc::now().timestamp() + 3600;
    Mock::given(method("GET"))
        .and(path("/copilot_internal/v2/token"))
        .and(header("authorization", "Bearer R"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "A",
            "expires_at": expires_at,
            "refresh_in": 1500
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("auth.json"));
    store
        .set(COPILOT_PROVIDER_ID, &Credential::Oauth(OAuthCredential::from_refresh("R")))
        .await
        .unwrap();

    let manager = CredentialManager::new(store.clone(), config_for(&server)).unwrap();
    let headers = manager.auth_headers(COPILOT_PROVIDER_ID).await.unwrap().unwrap();
    assert_eq!(headers["authorization"], "Bearer A");

    // Second call is served from the stored token.
    let headers = manager.auth_headers(COPILOT_PROVIDER_ID).await.unwrap().unwrap();
    assert_eq!(headers["authorization"], "Bearer A");

    let stored = store.get(COPILOT_PROVIDER_ID).await.and_then(Credential::into_oauth).unwrap();
    assert_eq!(stored.access, "A");
    assert_eq!(stored.expires, expires_at * 1000);
}
