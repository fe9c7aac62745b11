//! Conversation model for Roovo chat.
//!
//! Pure data and reducers with no I/O: identifiers, wire records, the
//! optimistic [`MessageLog`] that reconciles local sends with pushed
//! inserts, and the [`ConversationList`] inbox.
//!
//! # Components
//!
//! - [`MessageRecord`]: persisted message row as sent by the backend
//! - [`MessageLog`]: ordered, deduplicated message list for one conversation
//! - [`ConversationList`]: inbox ordered by last activity

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod conversation;
mod error;
mod ids;
mod log;
mod message;
mod record;

pub use conversation::{Conversation, ConversationList, ListingSummary, Party, PartySummary};
pub use error::RecordError;
pub use ids::{ConversationId, ListingId, MessageId, TempId, UserId};
pub use log::{IgnoreReason, LoadState, LogChange, LogEvent, MessageLog};
pub use message::{Message, MessageStatus};
pub use record::{MessageRecord, SendMessageRequest};
