//! Integration tests for the portal HTTP client against a loopback server.

use campushub_api::PortalClient;
use campushub_auth::{CredentialStore, Credentials};
use campushub_core::config::api::ApiConfig;
use campushub_core::error::ErrorKind;
use campushub_entity::user::UserKind;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// A loopback HTTP server that answers every request with a fixed response
/// and records the raw request text for assertions.
struct TestServer {
    base_url: String,
    requests: mpsc::UnboundedReceiver<String>,
}

impl TestServer {
    async fn serve(status: &'static str, body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let mut raw = Vec::new();
                    let mut buf = [0u8; 1024];
                    loop {
                        let n = stream.read(&mut buf).await.unwrap_or(0);
                        if n == 0 {
                            break;
                        }
                        raw.extend_from_slice(&buf[..n]);
                        if raw.windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }
                    let _ = tx.send(String::from_utf8_lossy(&raw).to_string());
                    let response = format!(
                        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        Self {
            base_url: format!("http://{addr}/api"),
            requests: rx,
        }
    }

    async fn captured_request(&mut self) -> String {
        self.requests.recv().await.expect("request captured")
    }
}

fn client_for(base_url: &str, with_token: bool) -> PortalClient {
    let dir = std::env::temp_dir().join(format!("campushub-test-{}", uuid::Uuid::new_v4()));
    let store = CredentialStore::at(dir);
    if with_token {
        store
            .save(&Credentials::new("tok-123", Some(42), UserKind::Student))
            .expect("save credentials");
    }
    let config = ApiConfig {
        base_url: base_url.to_string(),
        timeout_seconds: 5,
    };
    PortalClient::new(&config, store).expect("build client")
}

#[tokio::test]
async fn test_list_notifications_parses_page() {
    let mut server = TestServer::serve(
        "200 OK",
        r#"{
            "notifications": [
                {
                    "id": "n-1",
                    "type": "campushub.notifications.instant",
                    "data": { "title": "Exam moved", "message": "Room 204", "shared_id": "evt-9" },
                    "read_at": null,
                    "created_at": "2025-03-01T09:00:00Z"
                }
            ],
            "unread_count": 4,
            "current_page": 1,
            "last_page": 2
        }"#,
    )
    .await;

    let client = client_for(&server.base_url, true);
    let page = client.list_notifications(1).await.expect("list");

    assert_eq!(page.notifications.len(), 1);
    assert_eq!(page.unread_count, 4);
    assert_eq!(page.last_page, 2);
    assert_eq!(page.notifications[0].data.shared_id.as_deref(), Some("evt-9"));

    let request = server.captured_request().await;
    assert!(
        request.starts_with("GET /api/notifications?page=1"),
        "Unexpected request line: {request}"
    );
}

#[tokio::test]
async fn test_bearer_token_attached() {
    let mut server = TestServer::serve("200 OK", r#"{"unread_count": 0}"#).await;

    let client = client_for(&server.base_url, true);
    client.unread_count().await.expect("unread count");

    let request = server.captured_request().await.to_lowercase();
    assert!(
        request.contains("authorization: bearer tok-123"),
        "Missing bearer header: {request}"
    );
}

#[tokio::test]
async fn test_no_token_sends_no_auth_header() {
    let mut server = TestServer::serve("200 OK", r#"{"unread_count": 0}"#).await;

    let client = client_for(&server.base_url, false);
    client.unread_count().await.expect("unread count");

    let request = server.captured_request().await.to_lowercase();
    assert!(!request.contains("authorization:"));
}

#[tokio::test]
async fn test_mark_read_posts_to_endpoint() {
    let mut server = TestServer::serve("200 OK", r#"{"success": true, "unread_count": 3}"#).await;

    let client = client_for(&server.base_url, true);
    let response = client.mark_notification_read("n-1").await.expect("mark read");

    assert!(response.success);
    assert_eq!(response.unread_count, 3);

    let request = server.captured_request().await;
    assert!(
        request.starts_with("POST /api/notifications/n-1/read"),
        "Unexpected request line: {request}"
    );
}

#[tokio::test]
async fn test_server_error_maps_to_http_kind() {
    let server = TestServer::serve("500 Internal Server Error", r#"{"message":"boom"}"#).await;

    let client = client_for(&server.base_url, true);
    let err = client.unread_count().await.expect_err("should fail");

    assert_eq!(err.kind, ErrorKind::Http);
    assert!(err.message.contains("500"), "message: {}", err.message);
}

#[tokio::test]
async fn test_unauthorized_maps_to_authentication_kind() {
    let server = TestServer::serve("401 Unauthorized", r#"{"message":"Unauthenticated."}"#).await;

    let client = client_for(&server.base_url, true);
    let err = client.unread_count().await.expect_err("should fail");

    assert_eq!(err.kind, ErrorKind::Authentication);
}

#[tokio::test]
async fn test_logout_clears_credentials_even_on_server_failure() {
    let server = TestServer::serve("500 Internal Server Error", "{}").await;

    let client = client_for(&server.base_url, true);
    assert!(client.credentials().exists());

    client.logout().await.expect("logout");
    assert!(!client.credentials().exists());
}

#[tokio::test]
async fn test_broadcast_auth_returns_signature() {
    let mut server = TestServer::serve("200 OK", r#"{"auth": "key:signature"}"#).await;

    let client = client_for(&server.base_url, true);
    let auth = client
        .broadcast_auth("123.456", "user.42")
        .await
        .expect("broadcast auth");

    assert_eq!(auth, "key:signature");

    let request = server.captured_request().await;
    assert!(
        request.starts_with("GET /api/broadcasting/auth?socket_id=123.456&channel_name=user.42"),
        "Unexpected request line: {request}"
    );
}
