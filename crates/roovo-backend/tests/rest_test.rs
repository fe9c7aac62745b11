//! REST client against a canned local HTTP responder.

use roovo_backend::{BackendConfig, BackendError, RestClient};
use roovo_chat::{ConversationId, SendMessageRequest, UserId};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    task::JoinHandle,
};

/// Answer one request with `status` and `body`; yields the raw request.
async fn serve_once(status: &'static str, body: &'static str) -> (RestClient, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();
        request
    });

    let config = BackendConfig { api_base_url: format!("http://{addr}"), ..BackendConfig::default() };
    (RestClient::new(&config).unwrap(), handle)
}

async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
    let mut raw = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        raw.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&raw).to_string();
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text
                .lines()
                .find_map(|l| l.to_ascii_lowercase().strip_prefix("content-length:").map(|v| v.trim().to_string()))
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(0);
            if raw.len() >= end + 4 + length {
                return text;
            }
        }
        if n == 0 {
            return text;
        }
    }
}

#[tokio::test]
async fn send_posts_json_body() {
    let (rest, server) = serve_once("201 Created", "{}").await;
    let request = SendMessageRequest {
        conversation_id: ConversationId(42),
        sender_id: UserId::new("guest-1"),
        content: "Hi".into(),
    };

    rest.send_message(&request).await.unwrap();

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /api/chat/messages HTTP/1.1"));
    assert!(raw.contains(r#"{"conversation_id":42,"sender_id":"guest-1","content":"Hi"}"#));
}

#[tokio::test]
async fn non_success_status_is_failure() {
    let (rest, server) = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#).await;
    let request = SendMessageRequest {
        conversation_id: ConversationId(42),
        sender_id: UserId::new("guest-1"),
        content: "Hi".into(),
    };

    let result = rest.send_message(&request).await;
    assert!(matches!(result, Err(BackendError::Status { status: 500, .. })));
    server.await.unwrap();
}

#[tokio::test]
async fn history_decodes_records() {
    let body = r#"[
        {"id": 1, "conversation_id": 42, "sender_id": "host-1", "content": "Welcome", "is_verified": true},
        {"id": 2, "conversation_id": 42, "sender_id": "guest-1", "content": "Thanks", "created_at": "2025-03-01T10:00:00Z"}
    ]"#;
    let (rest, server) = serve_once("200 OK", body).await;

    let records = rest.history(ConversationId(42)).await.unwrap();
    assert_eq!(records.iter().map(|r| r.id).collect::<Vec<_>>(), [1, 2]);
    assert!(server.await.unwrap().starts_with("GET /api/chat/messages/42 "));
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let (rest, server) = serve_once("200 OK", r#"{"unexpected": true}"#).await;
    let result = rest.guest_conversations(&UserId::new("guest-1")).await;
    assert!(matches!(result, Err(BackendError::Decode(_))));
    assert!(server.await.unwrap().starts_with("GET /api/chat/conversations/guest/guest-1 "));
}

#[tokio::test]
async fn unreachable_server_is_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = BackendConfig { api_base_url: format!("http://{addr}"), ..BackendConfig::default() };
    let rest = RestClient::new(&config).unwrap();
    assert!(matches!(rest.conversation(ConversationId(1)).await, Err(BackendError::Http(_))));
}
