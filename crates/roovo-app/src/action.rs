//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.
//! Every asynchronous request carries enough context (conversation id and
//! view generation) for its completion to be matched back to the view that
//! issued it.

use std::fmt;

use roovo_chat::{ConversationId, SendMessageRequest, TempId, UserId};

/// A standing push subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subscription {
    /// INSERTs on `messages` filtered to one conversation.
    Messages(ConversationId),
    /// Changes on `conversations` where the user is the guest.
    Conversations(UserId),
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Messages(id) => write!(f, "messages:{id}"),
            Self::Conversations(user) => write!(f, "conversations:{user}"),
        }
    }
}

/// An optimistic send waiting for the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Conversation the pending entry lives in.
    pub conversation_id: ConversationId,
    /// Generation of the view that submitted it.
    pub generation: u64,
    /// Temporary id of the pending entry.
    pub temp_id: TempId,
    /// Request body.
    pub request: SendMessageRequest,
}

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Open a push subscription.
    Subscribe(Subscription),

    /// Release a push subscription.
    Unsubscribe(Subscription),

    /// Fetch message history for a mounted conversation.
    FetchHistory {
        /// Conversation to load.
        conversation_id: ConversationId,
        /// Generation of the requesting view.
        generation: u64,
    },

    /// Fetch conversation details for the header.
    FetchConversation {
        /// Conversation to load.
        conversation_id: ConversationId,
        /// Generation of the requesting view.
        generation: u64,
    },

    /// Fetch the inbox for a user.
    FetchConversations {
        /// Signed-in user.
        user_id: UserId,
    },

    /// Send a message. Failure comes back as
    /// [`AppEvent::SendFailed`](crate::AppEvent::SendFailed); success is
    /// observed through the push subscription.
    SendMessage(OutgoingMessage),
}
