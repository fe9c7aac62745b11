//! Wire shapes exchanged with the backend.
//!
//! [`MessageRecord`] is a persisted `messages` row as returned by the history
//! endpoint and by insert notifications. [`SendMessageRequest`] is the body
//! of the send call; its response carries no record, the subscription does.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{
    error::RecordError,
    ids::{ConversationId, UserId, lenient_u64},
};

/// A persisted message row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageRecord {
    /// Server-assigned id.
    #[serde(deserialize_with = "lenient_u64")]
    pub id: u64,
    /// Owning conversation.
    pub conversation_id: ConversationId,
    /// Author.
    pub sender_id: UserId,
    /// Text body.
    pub content: String,
    /// Sender verification flag.
    #[serde(default)]
    pub is_verified: bool,
    /// Insert time. `None` if absent or unparseable.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl MessageRecord {
    /// Decode a record from an already-parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Decode a JSON array of records (history response).
    pub fn list_from_slice(bytes: &[u8]) -> Result<Vec<Self>, RecordError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Body of the send-message request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendMessageRequest {
    /// Target conversation.
    pub conversation_id: ConversationId,
    /// Author (the signed-in user).
    pub sender_id: UserId,
    /// Text body, as typed.
    pub content: String,
}

/// Parse RFC 3339, falling back to a naive timestamp taken as UTC.
pub(crate) fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
