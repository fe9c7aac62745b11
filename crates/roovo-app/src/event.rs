//! Application input events.
//!
//! This module defines [`AppEvent`], the set of inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from two distinct sources:
//! - User interactions (Keyboard, Resize) and system ticks.
//! - Completions and push deliveries from the backend.

use roovo_chat::{Conversation, ConversationId, MessageRecord, TempId, UserId};

use crate::KeyInput;

/// Events processed by the App state machine.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Periodic tick.
    Tick,

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// A user signed in.
    SessionStarted {
        /// Signed-in user.
        user_id: UserId,
    },

    /// The user signed out.
    SessionEnded,

    /// Initial history arrived.
    HistoryLoaded {
        /// Conversation the history belongs to.
        conversation_id: ConversationId,
        /// Generation of the view that requested it.
        generation: u64,
        /// Records, oldest first.
        records: Vec<MessageRecord>,
    },

    /// Initial history could not be loaded.
    HistoryFailed {
        /// Conversation the request was for.
        conversation_id: ConversationId,
        /// Generation of the view that requested it.
        generation: u64,
        /// Error description.
        reason: String,
    },

    /// Push subscription delivered an inserted message.
    MessageDelivered {
        /// Persisted record.
        record: MessageRecord,
    },

    /// A send request failed.
    SendFailed {
        /// Conversation the message was sent to.
        conversation_id: ConversationId,
        /// Generation of the view that sent it.
        generation: u64,
        /// Temporary id of the pending entry.
        temp_id: TempId,
        /// Error description.
        reason: String,
    },

    /// Inbox list arrived.
    ConversationsLoaded {
        /// User the list was fetched for.
        user_id: UserId,
        /// Conversations in backend order.
        conversations: Vec<Conversation>,
    },

    /// Push subscription reported a changed conversation.
    ConversationChanged {
        /// New row.
        conversation: Conversation,
    },

    /// Conversation details for the header arrived.
    ConversationLoaded {
        /// Generation of the view that requested it.
        generation: u64,
        /// Conversation row.
        conversation: Conversation,
    },

    /// Error occurred.
    Error {
        /// Error description.
        message: String,
    },
}
