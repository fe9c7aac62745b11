//! Rendered message entries.

use chrono::{DateTime, Utc};

use crate::{
    ids::{MessageId, TempId, UserId},
    record::MessageRecord,
};

/// Lifecycle of a rendered message.
///
/// `Pending` is the only non-terminal state. A failed message stays in the
/// list as evidence for the user and is never retried automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageStatus {
    /// Optimistic entry; send in flight or awaiting confirmation.
    Pending,
    /// Backed by a persisted record.
    Confirmed,
    /// Send request failed.
    Failed,
}

impl MessageStatus {
    /// True for `Confirmed` and `Failed`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// A message as shown in a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Temporary until confirmed, then the server id.
    pub id: MessageId,
    /// Author.
    pub sender_id: UserId,
    /// Text body.
    pub content: String,
    /// Lifecycle state.
    pub status: MessageStatus,
    /// Sender verification flag.
    pub is_verified: bool,
    /// Server insert time, once known.
    pub created_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Optimistic entry for a local submit.
    pub fn pending(temp_id: TempId, sender_id: UserId, content: String) -> Self {
        Self {
            id: MessageId::Temporary(temp_id),
            sender_id,
            content,
            status: MessageStatus::Pending,
            is_verified: true,
            created_at: None,
        }
    }

    /// Confirmed entry from a persisted record.
    pub fn confirmed(record: MessageRecord) -> Self {
        Self {
            id: MessageId::Persisted(record.id),
            sender_id: record.sender_id,
            content: record.content,
            status: MessageStatus::Confirmed,
            is_verified: record.is_verified,
            created_at: record.created_at,
        }
    }

    /// True if authored by `user`.
    pub fn is_from(&self, user: &UserId) -> bool {
        &self.sender_id == user
    }
}
