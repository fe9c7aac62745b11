//! Backend link: request completions come back as App events.

use std::time::Duration;

use roovo_app::{AppEvent, OutgoingMessage, Subscription};
use roovo_backend::{BackendConfig, RestClient};
use roovo_chat::{ConversationId, SendMessageRequest, TempId, UserId};
use roovo_tui::Remote;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    sync::mpsc,
};

fn remote_for(base: String) -> Remote {
    let config = BackendConfig { api_base_url: base, ..BackendConfig::default() };
    let (_tx, rx) = mpsc::unbounded_channel();
    Remote::with_clients(RestClient::new(&config).unwrap(), None, rx)
}

/// Answer one request with `status` and `body`.
async fn serve_once(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = stream.read(&mut buf).await;
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = stream.write_all(response.as_bytes()).await;
        let _ = stream.shutdown().await;
    });
    format!("http://{addr}")
}

async fn closed_port() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

async fn next_event(remote: &mut Remote) -> AppEvent {
    tokio::time::timeout(Duration::from_secs(5), remote.recv()).await.unwrap().unwrap()
}

#[tokio::test]
async fn history_arrives_tagged_with_generation() {
    let base = serve_once(
        "200 OK",
        r#"[{"id":1,"conversation_id":42,"sender_id":"host-1","content":"Welcome","created_at":null}]"#,
    )
    .await;
    let mut remote = remote_for(base);

    remote.fetch_history(ConversationId(42), 3);

    match next_event(&mut remote).await {
        AppEvent::HistoryLoaded { conversation_id, generation, records } => {
            assert_eq!((conversation_id, generation), (ConversationId(42), 3));
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].content, "Welcome");
        },
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn history_error_is_reported() {
    let base = serve_once("500 Internal Server Error", "{}").await;
    let mut remote = remote_for(base);

    remote.fetch_history(ConversationId(42), 1);

    assert!(matches!(
        next_event(&mut remote).await,
        AppEvent::HistoryFailed { generation: 1, .. }
    ));
}

#[tokio::test]
async fn failed_send_reports_temp_id() {
    let mut remote = remote_for(closed_port().await);
    let temp_id = TempId::new("t1");

    remote.send_message(OutgoingMessage {
        conversation_id: ConversationId(42),
        generation: 2,
        temp_id: temp_id.clone(),
        request: SendMessageRequest {
            conversation_id: ConversationId(42),
            sender_id: UserId::new("guest-1"),
            content: "Hi".into(),
        },
    });

    match next_event(&mut remote).await {
        AppEvent::SendFailed { conversation_id, generation, temp_id: failed, reason } => {
            assert_eq!((conversation_id, generation), (ConversationId(42), 2));
            assert_eq!(failed, temp_id);
            assert!(!reason.is_empty());
        },
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn inbox_failure_becomes_error_event() {
    let mut remote = remote_for(closed_port().await);

    remote.fetch_conversations(UserId::new("guest-1"));

    assert!(matches!(
        next_event(&mut remote).await,
        AppEvent::Error { message } if message.starts_with("inbox:")
    ));
}

#[tokio::test]
async fn subscriptions_without_realtime_are_noops() {
    let mut remote = remote_for(closed_port().await);
    let sub = Subscription::Messages(ConversationId(42));

    assert!(!remote.has_realtime());
    remote.subscribe(&sub).unwrap();
    remote.unsubscribe(&sub).unwrap();
    assert!(remote.try_recv().is_none());
}

#[tokio::test]
async fn realtime_rows_are_forwarded() {
    let config = BackendConfig::default();
    let (tx, rx) = mpsc::unbounded_channel();
    let mut remote = Remote::with_clients(RestClient::new(&config).unwrap(), None, rx);

    let record = serde_json::from_value(serde_json::json!({
        "id": 5, "conversation_id": 42, "sender_id": "host-1", "content": "ping"
    }))
    .unwrap();
    tx.send(roovo_backend::RealtimeEvent::MessageInserted(record)).unwrap();

    assert!(matches!(
        remote.try_recv(),
        Some(AppEvent::MessageDelivered { record }) if record.id == 5
    ));
}
