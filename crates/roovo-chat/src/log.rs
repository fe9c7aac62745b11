//! Optimistic message log for a single conversation.
//!
//! [`MessageLog`] merges two asynchronous sources into one ordered list:
//! local submits, which appear immediately as pending entries, and persisted
//! records delivered by the push subscription. It is a pure reducer that
//! consumes [`LogEvent`]s and reports what changed as a [`LogChange`], with
//! no knowledge of the transport that produced the events.
//!
//! # Reconciliation
//!
//! A delivered record is, in order of precedence:
//!
//! 1. dropped if a message with the same id is already in the list;
//! 2. swapped in place for the oldest pending local entry with identical
//!    text, when the record's sender is the local user;
//! 3. appended otherwise.
//!
//! Initial history applies the same correlation: a local-sender record in
//! history stands in for the oldest pending entry with identical text, so
//! a send typed while loading is confirmed even if its echo races history.
//!
//! # Invariants
//!
//! - Order is insertion order; nothing is re-sorted by timestamp.
//! - A pending entry keeps its position when confirmed or failed.
//! - [`MessageLog::rendered`] never yields two entries with the same id.

use std::collections::HashSet;

use crate::{
    ids::{ConversationId, MessageId, TempId, UserId},
    message::{Message, MessageStatus},
    record::MessageRecord,
};

/// Inputs to the log reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    /// The local user submitted text.
    Submitted {
        /// Locally unique id for the optimistic entry.
        temp_id: TempId,
        /// Text as typed.
        content: String,
    },
    /// The push subscription delivered a persisted record.
    Delivered(MessageRecord),
    /// The send request for `temp_id` failed.
    SendFailed {
        /// Id of the optimistic entry.
        temp_id: TempId,
    },
    /// Initial history arrived.
    HistoryLoaded(Vec<MessageRecord>),
}

/// Why an event left the log unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Submitted text was empty or whitespace.
    EmptyContent,
    /// Record belongs to a different conversation.
    OtherConversation(ConversationId),
    /// No entry carries this temporary id.
    UnknownTempId,
    /// Entry already reached a terminal state.
    NotPending,
}

/// Effect of one event on the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogChange {
    /// New entry at `index`.
    Appended {
        /// Position of the new entry
        index: usize,
    },
    /// Pending entry at `index` replaced by its persisted record.
    Confirmed {
        /// Position of the confirmed entry
        index: usize,
    },
    /// Pending entry at `index` marked failed.
    Failed {
        /// Position of the failed entry
        index: usize,
    },
    /// Id already present; nothing changed.
    Duplicate,
    /// History installed ahead of `kept` already-present entries.
    HistoryMerged {
        /// Records taken from history
        loaded: usize,
        /// Pending entries whose record was already in history
        confirmed: usize,
        /// Entries that were present before history arrived and kept after it
        kept: usize,
    },
    /// Event had no effect.
    Ignored(IgnoreReason),
}

impl LogChange {
    /// True if the visible list changed.
    pub fn is_visible(&self) -> bool {
        !matches!(self, Self::Duplicate | Self::Ignored(_))
    }
}

/// Whether initial history has arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Waiting for history; a placeholder is shown.
    Loading,
    /// History installed.
    Ready,
}

/// Ordered, de-duplicated message list for one conversation.
#[derive(Debug, Clone)]
pub struct MessageLog {
    conversation_id: ConversationId,
    local_user: UserId,
    messages: Vec<Message>,
    state: LoadState,
}

impl MessageLog {
    /// Empty log awaiting history.
    pub fn new(conversation_id: ConversationId, local_user: UserId) -> Self {
        Self { conversation_id, local_user, messages: Vec::new(), state: LoadState::Loading }
    }

    /// Apply one event.
    pub fn handle(&mut self, event: LogEvent) -> LogChange {
        match event {
            LogEvent::Submitted { temp_id, content } => self.submit(temp_id, content),
            LogEvent::Delivered(record) => self.deliver(record),
            LogEvent::SendFailed { temp_id } => self.send_failed(&temp_id),
            LogEvent::HistoryLoaded(records) => self.load_history(records),
        }
    }

    /// Append a pending entry for locally submitted text.
    pub fn submit(&mut self, temp_id: TempId, content: String) -> LogChange {
        if content.trim().is_empty() {
            return LogChange::Ignored(IgnoreReason::EmptyContent);
        }
        let id = MessageId::Temporary(temp_id.clone());
        if self.position(&id).is_some() {
            return LogChange::Duplicate;
        }

        self.messages.push(Message::pending(temp_id, self.local_user.clone(), content));
        LogChange::Appended { index: self.messages.len() - 1 }
    }

    /// Merge a record delivered by the push subscription.
    pub fn deliver(&mut self, record: MessageRecord) -> LogChange {
        if record.conversation_id != self.conversation_id {
            return LogChange::Ignored(IgnoreReason::OtherConversation(record.conversation_id));
        }
        if self.position(&MessageId::Persisted(record.id)).is_some() {
            return LogChange::Duplicate;
        }

        if record.sender_id == self.local_user
            && let Some(index) = self.oldest_pending_with(&record.content)
        {
            self.messages[index] = Message::confirmed(record);
            return LogChange::Confirmed { index };
        }

        self.messages.push(Message::confirmed(record));
        LogChange::Appended { index: self.messages.len() - 1 }
    }

    /// Mark the pending entry `temp_id` as failed. It stays in place.
    pub fn send_failed(&mut self, temp_id: &TempId) -> LogChange {
        let Some(index) = self.position(&MessageId::Temporary(temp_id.clone())) else {
            return LogChange::Ignored(IgnoreReason::UnknownTempId);
        };

        let message = &mut self.messages[index];
        if message.status != MessageStatus::Pending {
            return LogChange::Ignored(IgnoreReason::NotPending);
        }
        message.status = MessageStatus::Failed;
        LogChange::Failed { index }
    }

    /// Install initial history.
    ///
    /// History goes first. Entries that arrived before it (early push
    /// deliveries, optimistic sends) follow in their original order unless
    /// history already contains their id. A pending entry whose record is
    /// in history is dropped in favour of that record.
    pub fn load_history(&mut self, records: Vec<MessageRecord>) -> LogChange {
        let mut merged: Vec<Message> = Vec::with_capacity(records.len() + self.messages.len());
        let mut seen: HashSet<MessageId> = HashSet::new();
        let mut confirmed = 0;

        for record in records {
            if record.conversation_id != self.conversation_id {
                tracing::debug!(
                    expected = %self.conversation_id,
                    actual = %record.conversation_id,
                    "history record for other conversation dropped"
                );
                continue;
            }
            if !seen.insert(MessageId::Persisted(record.id)) {
                continue;
            }
            if record.sender_id == self.local_user
                && let Some(index) = self.oldest_pending_with(&record.content)
            {
                let pending = self.messages.remove(index);
                tracing::debug!(id = record.id, temp_id = %pending.id, "pending entry confirmed by history");
                confirmed += 1;
            }
            merged.push(Message::confirmed(record));
        }
        let loaded = merged.len();

        for message in std::mem::take(&mut self.messages) {
            if seen.insert(message.id.clone()) {
                merged.push(message);
            }
        }
        let kept = merged.len() - loaded;

        self.messages = merged;
        self.state = LoadState::Ready;
        LogChange::HistoryMerged { loaded, confirmed, kept }
    }

    /// Messages as rendered: first occurrence of each id, in order.
    pub fn rendered(&self) -> Vec<&Message> {
        let mut seen: HashSet<&MessageId> = HashSet::with_capacity(self.messages.len());
        self.messages.iter().filter(|m| seen.insert(&m.id)).collect()
    }

    /// Raw entries in insertion order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Entry with `id`, if present.
    pub fn get(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| &m.id == id)
    }

    /// Conversation this log belongs to.
    pub fn conversation_id(&self) -> ConversationId {
        self.conversation_id
    }

    /// Local user, for sender correlation.
    pub fn local_user(&self) -> &UserId {
        &self.local_user
    }

    /// History load state.
    pub fn load_state(&self) -> LoadState {
        self.state
    }

    /// True until history arrives.
    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    /// Number of entries still pending.
    pub fn pending_count(&self) -> usize {
        self.messages.iter().filter(|m| m.status == MessageStatus::Pending).count()
    }

    fn position(&self, id: &MessageId) -> Option<usize> {
        self.messages.iter().position(|m| &m.id == id)
    }

    fn oldest_pending_with(&self, content: &str) -> Option<usize> {
        self.messages.iter().position(|m| {
            m.status == MessageStatus::Pending
                && m.is_from(&self.local_user)
                && m.content == content
        })
    }
}
