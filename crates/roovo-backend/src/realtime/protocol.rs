//! Phoenix channel framing used by the realtime service.
//!
//! Every websocket text frame is one JSON object:
//!
//! ```text
//! {"topic": "realtime:messages:42", "event": "phx_join", "payload": {...}, "ref": "1", "join_ref": "1"}
//! ```
//!
//! `join_ref` names one join of a topic. Leaving and rejoining the same
//! topic yields a new `join_ref`; server frames tagged with an older one
//! belong to a channel instance that no longer exists.
//!
//! Joins carry a `postgres_changes` config naming the table, event and row
//! filter. Matching rows arrive as `postgres_changes` events whose
//! `payload.data.record` holds the new row.

use std::fmt;

use roovo_chat::{ConversationId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Topic used for heartbeats.
pub const PHOENIX_TOPIC: &str = "phoenix";

/// Client join request.
pub const EVENT_JOIN: &str = "phx_join";
/// Client leave request.
pub const EVENT_LEAVE: &str = "phx_leave";
/// Server reply to a join, leave or heartbeat.
pub const EVENT_REPLY: &str = "phx_reply";
/// Server closed a channel.
pub const EVENT_CLOSE: &str = "phx_close";
/// Server reported a channel error.
pub const EVENT_ERROR: &str = "phx_error";
/// Keepalive.
pub const EVENT_HEARTBEAT: &str = "heartbeat";
/// Row change notification.
pub const EVENT_POSTGRES_CHANGES: &str = "postgres_changes";

/// A filtered change feed the client can join.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    /// INSERTs on `messages` for one conversation.
    Messages(ConversationId),
    /// Any change on `conversations` where the user is the guest.
    Conversations(UserId),
}

impl Channel {
    /// Phoenix topic for this channel.
    pub fn topic(&self) -> String {
        format!("realtime:{self}")
    }

    /// Table the feed watches.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Messages(_) => "messages",
            Self::Conversations(_) => "conversations",
        }
    }

    /// Change kind the feed subscribes to.
    pub fn event(&self) -> &'static str {
        match self {
            Self::Messages(_) => "INSERT",
            Self::Conversations(_) => "*",
        }
    }

    /// Server-side row filter.
    pub fn filter(&self) -> String {
        match self {
            Self::Messages(id) => format!("conversation_id=eq.{id}"),
            Self::Conversations(user) => format!("guest_id=eq.{user}"),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Messages(id) => write!(f, "messages:{id}"),
            Self::Conversations(user) => write!(f, "conversations:{user}"),
        }
    }
}

/// One Phoenix frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoenixMessage {
    /// Channel topic.
    pub topic: String,
    /// Event name.
    pub event: String,
    /// Event body.
    #[serde(default)]
    pub payload: Value,
    /// Request reference, echoed in replies.
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
    /// Reference of the join this frame belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_ref: Option<String>,
}

impl PhoenixMessage {
    /// Join request for `channel`.
    pub fn join(channel: &Channel, reference: u64, access_token: Option<&str>) -> Self {
        let mut payload = json!({
            "config": {
                "broadcast": {"self": false},
                "presence": {"key": ""},
                "postgres_changes": [{
                    "event": channel.event(),
                    "schema": "public",
                    "table": channel.table(),
                    "filter": channel.filter(),
                }],
            },
        });
        if let Some(token) = access_token {
            payload["access_token"] = Value::String(token.to_string());
        }
        Self {
            topic: channel.topic(),
            event: EVENT_JOIN.to_string(),
            payload,
            reference: Some(reference.to_string()),
            join_ref: Some(reference.to_string()),
        }
    }

    /// Leave request for the join of `channel` tagged `join_ref`.
    pub fn leave(channel: &Channel, reference: u64, join_ref: &str) -> Self {
        Self {
            topic: channel.topic(),
            event: EVENT_LEAVE.to_string(),
            payload: json!({}),
            reference: Some(reference.to_string()),
            join_ref: Some(join_ref.to_string()),
        }
    }

    /// Keepalive frame.
    pub fn heartbeat(reference: u64) -> Self {
        Self {
            topic: PHOENIX_TOPIC.to_string(),
            event: EVENT_HEARTBEAT.to_string(),
            payload: json!({}),
            reference: Some(reference.to_string()),
            join_ref: None,
        }
    }

    /// Interpret an incoming frame.
    pub fn classify(self) -> Incoming {
        match self.event.as_str() {
            EVENT_POSTGRES_CHANGES => {
                let mut data = match self.payload {
                    Value::Object(mut body) => body.remove("data").unwrap_or(Value::Null),
                    _ => Value::Null,
                };
                let kind = data.get("type").and_then(Value::as_str).map(str::to_string);
                let record = data.get_mut("record").map(Value::take);
                match (kind, record) {
                    (Some(kind), Some(record)) => Incoming::Change {
                        topic: self.topic,
                        join_ref: self.join_ref,
                        kind,
                        record,
                    },
                    _ => Incoming::Malformed { topic: self.topic, reason: "change without record" },
                }
            },
            EVENT_REPLY => {
                let ok = self.payload.get("status").and_then(Value::as_str) == Some("ok");
                Incoming::Reply { topic: self.topic, reference: self.reference, ok }
            },
            // Phoenix tags a close with the join it ends, in `join_ref` and
            // older servers only in `ref`.
            EVENT_CLOSE | EVENT_ERROR => {
                Incoming::Closed { topic: self.topic, join_ref: self.join_ref.or(self.reference) }
            },
            _ => Incoming::Other { topic: self.topic, event: self.event },
        }
    }
}

/// An incoming frame, classified.
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    /// A row change.
    Change {
        /// Channel topic.
        topic: String,
        /// Join the change was routed to, if the server said.
        join_ref: Option<String>,
        /// `INSERT`, `UPDATE` or `DELETE`.
        kind: String,
        /// The new row.
        record: Value,
    },
    /// Reply to one of our requests.
    Reply {
        /// Channel topic.
        topic: String,
        /// Reference of the request.
        reference: Option<String>,
        /// Whether the server accepted it.
        ok: bool,
    },
    /// The server closed the channel or reported an error on it.
    Closed {
        /// Channel topic.
        topic: String,
        /// Join being closed, if the server said.
        join_ref: Option<String>,
    },
    /// A change frame missing its body.
    Malformed {
        /// Channel topic.
        topic: String,
        /// What was missing.
        reason: &'static str,
    },
    /// Presence, system and other events we do not use.
    Other {
        /// Channel topic.
        topic: String,
        /// Event name.
        event: String,
    },
}
