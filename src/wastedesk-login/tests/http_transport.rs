//! HTTP transport tests against a mock server.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wastedesk_access::PermissionsLoadState;
use wastedesk_login::{
    AuthSession, AuthTransport, Credentials, HttpTransport, HttpTransportConfig, MemoryStore,
    PermissionTransport, SessionError, TransportError,
};

async fn transport_for(server: &MockServer) -> HttpTransport {
    HttpTransport::new(HttpTransportConfig::default().with_base_url(format!("{}/api", server.uri())))
        .unwrap()
}

#[tokio::test]
async fn login_posts_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "usernameOrEmail": "ops", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "requiresOTP": false,
            "user": { "id": "7", "displayName": "Ops", "roles": ["operations"] },
            "token": "h.p.s"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_for(&server).await;
    let response = transport.login("ops", "pw").await.unwrap();

    assert!(!response.requires_otp);
    let identity = response.identity.unwrap();
    assert_eq!(identity.id, "7");
    assert!(identity.has_role("operations"));
    assert_eq!(response.token.as_deref(), Some("h.p.s"));
}

#[tokio::test]
async fn login_otp_required() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "requiresOTP": true,
            "email": "o***@example.com"
        })))
        .mount(&server)
        .await;

    let response = transport_for(&server).await.login("ops", "pw").await.unwrap();
    assert!(response.requires_otp);
    assert_eq!(response.email.as_deref(), Some("o***@example.com"));
    assert!(response.token.is_none());
}

#[tokio::test]
async fn rejection_carries_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid username or password" })),
        )
        .mount(&server)
        .await;

    let err = transport_for(&server).await.login("ops", "bad").await.unwrap_err();
    match err {
        TransportError::Rejected { status, message } => {
            assert_eq!(status, Some(401));
            assert_eq!(message, "Invalid username or password");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn rejection_without_body_uses_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/send-otp"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = transport_for(&server).await.send_otp("ops").await.unwrap_err();
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn send_and_verify_otp() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/send-otp"))
        .and(body_json(json!({ "usernameOrEmail": "ops" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/verify-otp"))
        .and(body_json(json!({ "usernameOrEmail": "ops", "otp": "123456" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": { "id": "7", "displayName": "Ops" },
            "token": "h.p.s"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_for(&server).await;
    transport.send_otp("ops").await.unwrap();
    let verified = transport.verify_otp("ops", "123456").await.unwrap();
    assert_eq!(verified.identity.id, "7");
    assert_eq!(verified.token, "h.p.s");
}

#[tokio::test]
async fn permissions_use_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/permissions"))
        .and(header("authorization", "Bearer h.p.s"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["INVOICE_VIEW", "*"])))
        .expect(1)
        .mount(&server)
        .await;

    let codes = transport_for(&server).await.fetch_permissions("h.p.s").await.unwrap();
    assert_eq!(codes, vec!["INVOICE_VIEW", "*"]);
}

#[tokio::test]
async fn permissions_accept_wrapped_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/permissions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "permissions": ["ROUTE_VIEW"] })),
        )
        .mount(&server)
        .await;

    let codes = transport_for(&server).await.fetch_permissions("h.p.s").await.unwrap();
    assert_eq!(codes, vec!["ROUTE_VIEW"]);
}

#[tokio::test]
async fn unexpected_permission_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/permissions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = transport_for(&server).await.fetch_permissions("h.p.s").await.unwrap_err();
    assert!(matches!(err, TransportError::Decode(_)));
}

#[tokio::test]
async fn session_over_http_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": { "id": "7", "displayName": "Ops" },
            "token": "h.p.s"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/permissions"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "db down" })))
        .mount(&server)
        .await;

    let session = AuthSession::with_transport(
        Arc::new(transport_for(&server).await),
        Arc::new(MemoryStore::new()),
    );
    session
        .login(&Credentials::new("ops", "pw"))
        .await
        .unwrap();

    assert!(session.is_authenticated());
    assert_eq!(session.permissions_load_state(), PermissionsLoadState::Failed);
    assert_eq!(session.last_permission_error().as_deref(), Some("db down"));

    let err = session.try_load_permissions().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::PermissionFetch(TransportError::Rejected { status: Some(500), .. })
    ));
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    let transport =
        HttpTransport::new(HttpTransportConfig::default().with_base_url("http://127.0.0.1:9")).unwrap();
    let err = transport.login("ops", "pw").await.unwrap_err();
    assert!(matches!(err, TransportError::Network(_)));
}
