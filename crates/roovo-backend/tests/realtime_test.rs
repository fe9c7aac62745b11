//! Realtime client against a local websocket server.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use roovo_backend::{BackendConfig, Channel, RealtimeClient, RealtimeEvent};
use roovo_chat::ConversationId;
use serde_json::{Value, json};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::mpsc,
    time::timeout,
};
use tokio_tungstenite::{WebSocketStream, accept_async, tungstenite::Message};

type ServerSocket = WebSocketStream<TcpStream>;

async fn listen() -> (TcpListener, BackendConfig) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let config = BackendConfig {
        realtime_url: Some(format!("ws://{addr}/realtime/v1/websocket")),
        anon_key: Some("anon".into()),
        heartbeat_interval: Duration::from_secs(60),
        ..BackendConfig::default()
    };
    (listener, config)
}

async fn accept(listener: &TcpListener) -> ServerSocket {
    let (stream, _) = listener.accept().await.unwrap();
    accept_async(stream).await.unwrap()
}

async fn next_json(ws: &mut ServerSocket) -> Value {
    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => return serde_json::from_str(&text).unwrap(),
            Some(Ok(_)) => {},
            other => panic!("socket ended: {other:?}"),
        }
    }
}

fn insert(conversation_id: u64, id: u64, content: &str) -> Message {
    let frame = json!({
        "topic": format!("realtime:messages:{conversation_id}"),
        "event": "postgres_changes",
        "payload": {"data": {
            "type": "INSERT",
            "record": {
                "id": id,
                "conversation_id": conversation_id,
                "sender_id": "host-1",
                "content": content,
                "created_at": "2025-03-01T10:00:00+00:00"
            }
        }},
        "ref": null
    });
    Message::Text(frame.to_string())
}

async fn recv(rx: &mut mpsc::UnboundedReceiver<RealtimeEvent>) -> RealtimeEvent {
    timeout(Duration::from_secs(5), rx.recv()).await.unwrap().unwrap()
}

#[tokio::test]
async fn join_deliver_leave() {
    let (listener, config) = listen().await;
    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;

        let join = next_json(&mut ws).await;
        assert_eq!(join["event"], "phx_join");
        assert_eq!(join["topic"], "realtime:messages:42");
        assert_eq!(join["payload"]["config"]["postgres_changes"][0]["filter"], "conversation_id=eq.42");
        assert_eq!(join["payload"]["access_token"], "anon");

        let reply = json!({
            "topic": "realtime:messages:42", "event": "phx_reply",
            "payload": {"status": "ok", "response": {}}, "ref": join["ref"]
        });
        ws.send(Message::Text(reply.to_string())).await.unwrap();
        ws.send(Message::Text("{not json".into())).await.unwrap();
        ws.send(insert(7, 1, "elsewhere")).await.unwrap();
        ws.send(insert(42, 99, "Hi")).await.unwrap();

        let leave = next_json(&mut ws).await;
        assert_eq!(leave["event"], "phx_leave");
        assert_eq!(leave["topic"], "realtime:messages:42");
        ws
    });

    let (tx, mut rx) = mpsc::unbounded_channel();
    let client = RealtimeClient::connect(&config, tx).await.unwrap();
    client.subscribe(Channel::Messages(ConversationId(42))).unwrap();

    match recv(&mut rx).await {
        RealtimeEvent::MessageInserted(record) => {
            assert_eq!(record.id, 99);
            assert_eq!(record.content, "Hi");
        },
        other => panic!("unexpected event {other:?}"),
    }

    client.unsubscribe(Channel::Messages(ConversationId(42))).unwrap();
    let _ws = server.await.unwrap();
    assert!(client.is_connected());
    client.close().await;
}

fn server_frame(topic: &str, event: &str, reference: &Value, join_ref: &Value) -> Message {
    let frame = json!({
        "topic": topic, "event": event, "payload": {}, "ref": reference, "join_ref": join_ref
    });
    Message::Text(frame.to_string())
}

#[tokio::test]
async fn rejoin_survives_close_of_previous_join() {
    let (listener, config) = listen().await;
    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;

        let first = next_json(&mut ws).await;
        assert_eq!(first["event"], "phx_join");
        let leave = next_json(&mut ws).await;
        assert_eq!(leave["event"], "phx_leave");
        assert_eq!(leave["join_ref"], first["join_ref"]);
        let second = next_json(&mut ws).await;
        assert_eq!(second["event"], "phx_join");
        assert_ne!(second["join_ref"], first["join_ref"]);

        // Late teardown of the first join, then traffic for the new one.
        let topic = "realtime:messages:42";
        ws.send(server_frame(topic, "phx_close", &first["join_ref"], &first["join_ref"])).await.unwrap();
        ws.send(server_frame(topic, "phx_error", &first["join_ref"], &Value::Null)).await.unwrap();
        ws.send(insert(42, 5, "after rejoin")).await.unwrap();
        ws
    });

    let (tx, mut rx) = mpsc::unbounded_channel();
    let client = RealtimeClient::connect(&config, tx).await.unwrap();
    let channel = Channel::Messages(ConversationId(42));
    client.subscribe(channel.clone()).unwrap();
    client.unsubscribe(channel.clone()).unwrap();
    client.subscribe(channel).unwrap();

    match recv(&mut rx).await {
        RealtimeEvent::MessageInserted(record) => assert_eq!(record.id, 5),
        other => panic!("unexpected event {other:?}"),
    }

    let _ws = server.await.unwrap();
    client.close().await;
}

#[tokio::test]
async fn close_of_current_join_is_reported() {
    let (listener, config) = listen().await;
    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        let join = next_json(&mut ws).await;
        let topic = "realtime:messages:42";
        ws.send(server_frame(topic, "phx_close", &join["ref"], &join["join_ref"])).await.unwrap();
        ws.send(insert(42, 6, "too late")).await.unwrap();
        ws
    });

    let (tx, mut rx) = mpsc::unbounded_channel();
    let client = RealtimeClient::connect(&config, tx).await.unwrap();
    client.subscribe(Channel::Messages(ConversationId(42))).unwrap();

    assert_eq!(recv(&mut rx).await, RealtimeEvent::ChannelClosed(Channel::Messages(ConversationId(42))));
    let _ws = server.await.unwrap();
    assert!(timeout(Duration::from_millis(100), rx.recv()).await.is_err());
    client.close().await;
}

#[tokio::test]
async fn sends_heartbeats() {
    let (listener, mut config) = listen().await;
    config.heartbeat_interval = Duration::from_millis(20);
    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        let frame = next_json(&mut ws).await;
        assert_eq!(frame["topic"], "phoenix");
        assert_eq!(frame["event"], "heartbeat");
    });

    let (tx, _rx) = mpsc::unbounded_channel();
    let client = RealtimeClient::connect(&config, tx).await.unwrap();
    timeout(Duration::from_secs(5), server).await.unwrap().unwrap();
    client.close().await;
}

#[tokio::test]
async fn reports_disconnect() {
    let (listener, config) = listen().await;
    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        ws.close(None).await.unwrap();
    });

    let (tx, mut rx) = mpsc::unbounded_channel();
    let client = RealtimeClient::connect(&config, tx).await.unwrap();
    server.await.unwrap();

    assert!(matches!(recv(&mut rx).await, RealtimeEvent::Disconnected { .. }));
    client.close().await;
}

#[tokio::test]
async fn requires_endpoint() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let result = RealtimeClient::connect(&BackendConfig::default(), tx).await;
    assert!(matches!(result, Err(roovo_backend::RealtimeError::NotConfigured)));
}
