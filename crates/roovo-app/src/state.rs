//! Observable application state types.
//!
//! These structures are the view model: what the current screen shows,
//! without any knowledge of how it is drawn.

use roovo_chat::{Conversation, ConversationId, ListingId, MessageLog, UserId};

use crate::Route;

/// The mounted screen.
#[derive(Debug, Clone)]
pub enum View {
    /// Home screen.
    Home,
    /// Listing detail.
    Listing {
        /// Listing shown.
        id: ListingId,
    },
    /// Conversation list.
    Inbox,
    /// A single conversation.
    Conversation(Box<ConversationView>),
    /// A chat route was opened without a session.
    SignInRequired {
        /// Route that was requested.
        route: Route,
    },
    /// No route matched; nothing is rendered.
    NotFound {
        /// Path that failed to resolve.
        path: String,
    },
}

impl View {
    /// Mounted conversation, if any.
    pub fn conversation(&self) -> Option<&ConversationView> {
        match self {
            Self::Conversation(view) => Some(view),
            _ => None,
        }
    }

    /// Short label for status lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Listing { .. } => "listing",
            Self::Inbox => "inbox",
            Self::Conversation(_) => "conversation",
            Self::SignInRequired { .. } => "sign-in",
            Self::NotFound { .. } => "not-found",
        }
    }
}

/// A mounted conversation.
///
/// Owns its message log exclusively. A new mount gets a new generation;
/// completions carrying an older generation are ignored.
#[derive(Debug, Clone)]
pub struct ConversationView {
    /// Mount generation.
    pub generation: u64,
    /// Messages.
    pub log: MessageLog,
    /// Header details, once loaded.
    pub details: Option<Conversation>,
}

impl ConversationView {
    /// Fresh mount awaiting history.
    pub fn new(conversation_id: ConversationId, local_user: UserId, generation: u64) -> Self {
        Self { generation, log: MessageLog::new(conversation_id, local_user), details: None }
    }

    /// Conversation shown.
    pub fn conversation_id(&self) -> ConversationId {
        self.log.conversation_id()
    }

    /// True if a completion tagged `(conversation_id, generation)` belongs
    /// to this mount.
    pub fn is_current(&self, conversation_id: ConversationId, generation: u64) -> bool {
        self.conversation_id() == conversation_id && self.generation == generation
    }

    /// Header title: the other party's name, else a generic label.
    pub fn title(&self) -> String {
        self.details
            .as_ref()
            .and_then(|c| c.counterpart_name(self.log.local_user()))
            .map_or_else(|| format!("Conversation {}", self.conversation_id()), str::to_string)
    }
}
