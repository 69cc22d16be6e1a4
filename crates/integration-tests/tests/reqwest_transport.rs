//! ReqwestTransport against a one-shot local HTTP server
//!
//! The server captures the raw request so the exact bytes on the wire can be
//! checked against the signature computed by the client.

mod common;

use common::{account, ACCOUNT, KEY, NOW};
use lecli_core::application::{ApiClient, NewUser, UsageService, UserService};
use lecli_core::domain::{sign, CONTENT_TYPE};
use lecli_core::port::clock::mocks::FixedClock;
use lecli_infra_http::{ReqwestTransport, DEFAULT_TIMEOUT};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Request as seen by the server
struct Captured {
    request_line: String,
    /// Lowercased header names
    headers: Vec<(String, String)>,
    body: String,
}

impl Captured {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Serve one request, answering with `status_line` and a JSON `body`
async fn serve_once(
    status_line: &'static str,
    body: &'static str,
) -> (String, oneshot::Receiver<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut raw = Vec::new();
        let mut chunk = [0u8; 4096];
        let head_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before headers were complete");
            raw.extend_from_slice(&chunk[..n]);
            if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos;
            }
        };

        let head = String::from_utf8_lossy(&raw[..head_end]).to_string();
        let mut lines = head.split("\r\n");
        let request_line = lines.next().unwrap_or_default().to_string();
        let headers: Vec<(String, String)> = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
            .collect();

        let content_length: usize = headers
            .iter()
            .find(|(k, _)| k == "content-length")
            .and_then(|(_, v)| v.parse().ok())
            .unwrap_or(0);
        let mut request_body = raw[head_end + 4..].to_vec();
        while request_body.len() < content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            request_body.extend_from_slice(&chunk[..n]);
        }

        let reply = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        socket.write_all(reply.as_bytes()).await.unwrap();
        socket.flush().await.unwrap();

        let _ = tx.send(Captured {
            request_line,
            headers,
            body: String::from_utf8_lossy(&request_body).to_string(),
        });
    });

    (url, rx)
}

fn client(api_url: &str) -> ApiClient {
    ApiClient::new(
        Arc::new(ReqwestTransport::new(DEFAULT_TIMEOUT).unwrap()),
        Arc::new(account(api_url)),
        Arc::new(FixedClock::at_epoch_seconds(NOW)),
    )
}

#[tokio::test]
async fn test_owner_signature_covers_the_bytes_on_the_wire() {
    let (url, captured) = serve_once(
        "201 Created",
        r#"{"user": {"id": "u1", "email": "jane@example.com"}}"#,
    )
    .await;

    let added = UserService::new(client(&url))
        .add_new(&NewUser {
            email: "jane@example.com".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(added["user"]["id"], "u1");

    let request = captured.await.unwrap();
    let path = format!("management/accounts/{}/users", ACCOUNT);
    assert_eq!(request.request_line, format!("POST /{} HTTP/1.1", path));

    let date = request.header("date").unwrap().to_string();
    assert_eq!(date, "Wed, 08 Jun 2016 07:20:00 GMT");

    let expected = sign(KEY, &date, CONTENT_TYPE, "POST", &path, &request.body);
    assert_eq!(
        request.header("authorization-api-key"),
        Some(format!("{}:{}", KEY, expected).as_str())
    );
    assert_eq!(request.header("content-type"), Some(CONTENT_TYPE));
    assert_eq!(request.header("user-agent"), Some("lecli"));

    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body["user"]["first_name"], "Jane");
}

#[tokio::test]
async fn test_query_parameters_and_api_key_header() {
    let (url, captured) = serve_once(
        "200 OK",
        r#"{"daily_usage": [], "period_usage": 0, "name": "acme", "id": "acc"}"#,
    )
    .await;

    let usage = UsageService::new(client(&url))
        .get("2016-01-01", "2016-06-01")
        .await
        .unwrap();
    assert_eq!(usage["name"], "acme");

    let request = captured.await.unwrap();
    assert_eq!(
        request.request_line,
        format!(
            "GET /usage/accounts/{}?from=2016-01-01&to=2016-06-01 HTTP/1.1",
            ACCOUNT
        )
    );
    assert_eq!(request.header("x-api-key"), Some(KEY));
    assert!(request.header("authorization-api-key").is_none());
    assert!(request.body.is_empty());
}

#[tokio::test]
async fn test_error_status_is_reported_with_url() {
    let (url, _captured) = serve_once("404 Not Found", r#"{"messages": ["No such log"]}"#).await;

    let err = lecli_core::application::LogService::new(client(&url))
        .get("missing")
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    let message = err.to_string();
    assert!(message.contains("404 Client Error: Not Found for url:"));
    assert!(message.contains("/management/logs/missing"));
}
