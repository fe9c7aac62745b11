//! Websocket client for the realtime service.
//!
//! The socket is owned by a background task. [`RealtimeClient`] sends it
//! join/leave commands; decoded rows come back on the events channel the
//! caller supplied. Frames that fail to parse, or rows outside a channel's
//! filter, are logged and dropped without affecting the connection.

use std::{collections::HashMap, time::Duration};

use futures::{SinkExt, StreamExt};
use roovo_chat::{Conversation, MessageRecord};
use tokio::{
    net::TcpStream,
    sync::mpsc,
    task::JoinHandle,
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use super::protocol::{Channel, Incoming, PhoenixMessage};
use crate::{BackendConfig, RealtimeError};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A row delivered by the realtime service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealtimeEvent {
    /// A message was inserted in a joined conversation.
    MessageInserted(MessageRecord),
    /// A conversation row changed.
    ConversationChanged(Conversation),
    /// The server closed a channel.
    ChannelClosed(Channel),
    /// The connection dropped. No further events follow.
    Disconnected {
        /// Why.
        reason: String,
    },
}

#[derive(Debug)]
enum ClientCommand {
    Join(Channel),
    Leave(Channel),
    Close,
}

/// Handle to a live realtime connection.
#[derive(Debug)]
pub struct RealtimeClient {
    commands: mpsc::UnboundedSender<ClientCommand>,
    task: JoinHandle<()>,
}

impl RealtimeClient {
    /// Connect to the configured endpoint and start the connection task.
    ///
    /// # Errors
    ///
    /// Returns [`RealtimeError::NotConfigured`] without a realtime URL, or
    /// the handshake error.
    pub async fn connect(
        config: &BackendConfig,
        events: mpsc::UnboundedSender<RealtimeEvent>,
    ) -> Result<Self, RealtimeError> {
        let url = config.realtime_endpoint()?.ok_or(RealtimeError::NotConfigured)?;
        let (socket, _response) = connect_async(url.as_str()).await?;
        tracing::debug!(host = url.host_str().unwrap_or_default(), "realtime connected");

        let (commands, rx) = mpsc::unbounded_channel();
        let connection = Connection {
            socket,
            commands: rx,
            events,
            channels: HashMap::new(),
            next_ref: 0,
            access_token: config.anon_key.clone(),
            heartbeat_interval: config.heartbeat_interval,
        };
        let task = tokio::spawn(connection.run());
        Ok(Self { commands, task })
    }

    /// Join `channel`. Idempotent.
    pub fn subscribe(&self, channel: Channel) -> Result<(), RealtimeError> {
        self.commands.send(ClientCommand::Join(channel)).map_err(|_| RealtimeError::Closed)
    }

    /// Leave `channel`. Leaving a channel that was never joined is a no-op.
    pub fn unsubscribe(&self, channel: Channel) -> Result<(), RealtimeError> {
        self.commands.send(ClientCommand::Leave(channel)).map_err(|_| RealtimeError::Closed)
    }

    /// True while the connection task is running.
    pub fn is_connected(&self) -> bool {
        !self.task.is_finished()
    }

    /// Close the socket and wait for the task to exit.
    pub async fn close(self) {
        let _ = self.commands.send(ClientCommand::Close);
        let _ = self.task.await;
    }
}

/// One join of a channel. A rejoin of the same topic is a new instance.
struct Joined {
    channel: Channel,
    join_ref: String,
}

impl Joined {
    /// True if a frame tagged `join_ref` belongs to this join. Untagged
    /// frames are taken as current.
    fn owns(&self, join_ref: Option<&str>) -> bool {
        join_ref.is_none_or(|r| r == self.join_ref)
    }
}

struct Connection {
    socket: Socket,
    commands: mpsc::UnboundedReceiver<ClientCommand>,
    events: mpsc::UnboundedSender<RealtimeEvent>,
    /// Current join per topic.
    channels: HashMap<String, Joined>,
    next_ref: u64,
    access_token: Option<String>,
    heartbeat_interval: Duration,
}

impl Connection {
    async fn run(mut self) {
        let mut heartbeat = tokio::time::interval(self.heartbeat_interval);
        heartbeat.tick().await;

        let reason = loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(ClientCommand::Join(channel)) => {
                        if let Err(e) = self.join(channel).await {
                            break e.to_string();
                        }
                    },
                    Some(ClientCommand::Leave(channel)) => {
                        if let Err(e) = self.leave(&channel).await {
                            break e.to_string();
                        }
                    },
                    Some(ClientCommand::Close) | None => {
                        let _ = self.socket.close(None).await;
                        tracing::debug!("realtime closed");
                        return;
                    },
                },
                frame = self.socket.next() => match frame {
                    Some(Ok(Message::Text(text))) => self.handle_text(&text),
                    Some(Ok(Message::Close(_))) | None => break "server closed connection".to_string(),
                    Some(Ok(_)) => {},
                    Some(Err(e)) => break e.to_string(),
                },
                _ = heartbeat.tick() => {
                    let frame = PhoenixMessage::heartbeat(self.reference());
                    if let Err(e) = self.send(&frame).await {
                        break e.to_string();
                    }
                },
            }
        };

        tracing::warn!(%reason, "realtime connection lost");
        let _ = self.events.send(RealtimeEvent::Disconnected { reason });
    }

    async fn join(&mut self, channel: Channel) -> Result<(), RealtimeError> {
        let topic = channel.topic();
        if self.channels.contains_key(&topic) {
            return Ok(());
        }
        let reference = self.reference();
        let frame = PhoenixMessage::join(&channel, reference, self.access_token.as_deref());
        self.send(&frame).await?;
        tracing::debug!(%topic, join_ref = reference, "channel joined");
        self.channels.insert(topic, Joined { channel, join_ref: reference.to_string() });
        Ok(())
    }

    async fn leave(&mut self, channel: &Channel) -> Result<(), RealtimeError> {
        let Some(joined) = self.channels.remove(&channel.topic()) else {
            return Ok(());
        };
        let frame = PhoenixMessage::leave(&joined.channel, self.reference(), &joined.join_ref);
        self.send(&frame).await?;
        tracing::debug!(topic = %frame.topic, join_ref = %joined.join_ref, "channel left");
        Ok(())
    }

    async fn send(&mut self, frame: &PhoenixMessage) -> Result<(), RealtimeError> {
        let text = serde_json::to_string(frame)?;
        self.socket.send(Message::Text(text)).await?;
        Ok(())
    }

    fn reference(&mut self) -> u64 {
        self.next_ref += 1;
        self.next_ref
    }

    fn handle_text(&mut self, text: &str) {
        let message: PhoenixMessage = match serde_json::from_str(text) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "unparseable realtime frame ignored");
                return;
            },
        };

        match message.classify() {
            Incoming::Change { topic, join_ref, kind, record } => {
                let Some(joined) = self.channels.get(&topic) else {
                    tracing::debug!(%topic, "change for unjoined topic ignored");
                    return;
                };
                if !joined.owns(join_ref.as_deref()) {
                    tracing::debug!(%topic, ?join_ref, "change for previous join ignored");
                    return;
                }
                if let Some(event) = decode_change(&joined.channel, &kind, record) {
                    let _ = self.events.send(event);
                }
            },
            Incoming::Reply { topic, reference, ok } => {
                if !ok {
                    tracing::warn!(%topic, ?reference, "realtime request rejected");
                }
            },
            Incoming::Closed { topic, join_ref } => {
                let current = self.channels.get(&topic).is_some_and(|j| j.owns(join_ref.as_deref()));
                if !current {
                    tracing::debug!(%topic, ?join_ref, "close for previous join ignored");
                    return;
                }
                if let Some(joined) = self.channels.remove(&topic) {
                    tracing::warn!(%topic, "channel closed by server");
                    let _ = self.events.send(RealtimeEvent::ChannelClosed(joined.channel));
                }
            },
            Incoming::Malformed { topic, reason } => {
                tracing::warn!(%topic, reason, "malformed change ignored");
            },
            Incoming::Other { topic, event } => {
                tracing::trace!(%topic, %event, "realtime event ignored");
            },
        }
    }
}

/// Decode a change row for `channel`. `None` if it does not belong there.
fn decode_change(channel: &Channel, kind: &str, record: serde_json::Value) -> Option<RealtimeEvent> {
    match channel {
        Channel::Messages(id) => {
            if kind != "INSERT" {
                tracing::debug!(%kind, "non-insert message change ignored");
                return None;
            }
            match MessageRecord::from_value(record) {
                Ok(record) if record.conversation_id == *id => {
                    Some(RealtimeEvent::MessageInserted(record))
                },
                Ok(record) => {
                    tracing::warn!(
                        expected = %id,
                        actual = %record.conversation_id,
                        "out-of-filter message ignored"
                    );
                    None
                },
                Err(e) => {
                    tracing::warn!(error = %e, "undecodable message row ignored");
                    None
                },
            }
        },
        Channel::Conversations(_) => match Conversation::from_value(record) {
            Ok(conversation) => Some(RealtimeEvent::ConversationChanged(conversation)),
            Err(e) => {
                tracing::warn!(error = %e, "undecodable conversation row ignored");
                None
            },
        },
    }
}
