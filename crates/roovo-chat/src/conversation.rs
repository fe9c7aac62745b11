//! Conversations and the inbox list.
//!
//! The backend owns conversations; [`ConversationList`] is a read-through
//! cache ordered by last activity for display only.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    error::RecordError,
    ids::{ConversationId, ListingId, UserId},
    record::lenient_timestamp,
};

/// Display fields of a party joined into a conversation row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PartySummary {
    /// Display name.
    pub name: String,
}

/// Display fields of the listing joined into a conversation row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListingSummary {
    /// Listing title.
    pub title: String,
    /// Cover image URL.
    #[serde(default)]
    pub primary_image_url: Option<String>,
}

/// Which side of a conversation a user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    /// The traveller.
    Guest,
    /// The listing owner.
    Host,
}

/// A guest/host conversation about a listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Conversation {
    /// Server id.
    pub id: ConversationId,
    /// Guest party.
    pub guest_id: UserId,
    /// Host party.
    pub host_id: UserId,
    /// Listing under discussion.
    #[serde(default)]
    pub listing_id: Option<ListingId>,
    /// Last activity; used only for ordering.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_message_at: Option<DateTime<Utc>>,
    /// Joined guest profile.
    #[serde(default)]
    pub guest: Option<PartySummary>,
    /// Joined host profile.
    #[serde(default)]
    pub host: Option<PartySummary>,
    /// Joined listing.
    #[serde(default)]
    pub listing: Option<ListingSummary>,
}

impl Conversation {
    /// Decode a conversation row from JSON.
    pub fn from_value(value: serde_json::Value) -> Result<Self, RecordError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Side `user` is on, if a party at all.
    pub fn party_of(&self, user: &UserId) -> Option<Party> {
        if &self.guest_id == user {
            Some(Party::Guest)
        } else if &self.host_id == user {
            Some(Party::Host)
        } else {
            None
        }
    }

    /// Id of the other party from `user`'s point of view.
    pub fn counterpart_id(&self, user: &UserId) -> Option<&UserId> {
        match self.party_of(user)? {
            Party::Guest => Some(&self.host_id),
            Party::Host => Some(&self.guest_id),
        }
    }

    /// Display name of the other party, if joined in.
    pub fn counterpart_name(&self, user: &UserId) -> Option<&str> {
        let summary = match self.party_of(user)? {
            Party::Guest => self.host.as_ref(),
            Party::Host => self.guest.as_ref(),
        };
        summary.map(|p| p.name.as_str())
    }

    /// Listing title, if joined in.
    pub fn listing_title(&self) -> Option<&str> {
        self.listing.as_ref().map(|l| l.title.as_str())
    }
}

/// Inbox ordered by last activity, newest first.
#[derive(Debug, Clone, Default)]
pub struct ConversationList {
    entries: Vec<Conversation>,
}

impl ConversationList {
    /// Empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace contents with a freshly fetched set.
    ///
    /// Sorted by `last_message_at` descending; rows without a timestamp go
    /// last, keeping their fetched order. Of rows sharing an id, the first
    /// fetched wins.
    pub fn replace(&mut self, mut conversations: Vec<Conversation>) {
        let mut seen = HashSet::with_capacity(conversations.len());
        conversations.retain(|c| seen.insert(c.id));
        conversations.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        self.entries = conversations;
    }

    /// Apply a change notification: drop any existing row with the same id
    /// and put the new row at the front.
    pub fn upsert(&mut self, conversation: Conversation) {
        self.entries.retain(|c| c.id != conversation.id);
        self.entries.insert(0, conversation);
    }

    /// Conversation with `id`.
    pub fn get(&self, id: ConversationId) -> Option<&Conversation> {
        self.entries.iter().find(|c| c.id == id)
    }

    /// Rows in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Conversation> {
        self.entries.iter()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the inbox is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row(id: u64, last: Option<&str>) -> Conversation {
        Conversation::from_value(json!({
            "id": id,
            "guest_id": "guest",
            "host_id": "host",
            "listing_id": 3,
            "last_message_at": last,
            "guest": {"name": "Gia"},
            "host": {"name": "Hal"},
            "listing": {"title": "Beach hut", "primary_image_url": null}
        }))
        .unwrap()
    }

    #[test]
    fn replace_sorts_newest_first() {
        let mut list = ConversationList::new();
        list.replace(vec![
            row(1, Some("2025-01-01T00:00:00Z")),
            row(2, None),
            row(3, Some("2025-03-01T00:00:00Z")),
        ]);

        let ids: Vec<_> = list.iter().map(|c| c.id.0).collect();
        assert_eq!(ids, [3, 1, 2]);
    }

    #[test]
    fn replace_keeps_first_of_duplicate_ids() {
        let mut list = ConversationList::new();
        list.replace(vec![
            row(1, Some("2025-01-01T00:00:00Z")),
            row(2, Some("2025-02-01T00:00:00Z")),
            row(1, Some("2025-03-01T00:00:00Z")),
        ]);

        let ids: Vec<_> = list.iter().map(|c| c.id.0).collect();
        assert_eq!(ids, [2, 1]);
        assert_eq!(
            list.get(ConversationId(1)).and_then(|c| c.last_message_at).map(|t| t.to_rfc3339()),
            Some("2025-01-01T00:00:00+00:00".to_string())
        );
    }

    #[test]
    fn upsert_moves_to_front() {
        let mut list = ConversationList::new();
        list.replace(vec![row(1, Some("2025-03-01T00:00:00Z")), row(2, Some("2025-01-01T00:00:00Z"))]);

        list.upsert(row(2, Some("2025-04-01T00:00:00Z")));
        let ids: Vec<_> = list.iter().map(|c| c.id.0).collect();
        assert_eq!(ids, [2, 1]);

        list.upsert(row(9, None));
        assert_eq!(list.len(), 3);
        assert_eq!(list.iter().next().map(|c| c.id.0), Some(9));
    }

    #[test]
    fn counterpart_depends_on_viewer() {
        let c = row(1, None);
        assert_eq!(c.counterpart_name(&UserId::new("guest")), Some("Hal"));
        assert_eq!(c.counterpart_name(&UserId::new("host")), Some("Gia"));
        assert_eq!(c.counterpart_id(&UserId::new("guest")), Some(&UserId::new("host")));
        assert_eq!(c.counterpart_name(&UserId::new("stranger")), None);
        assert_eq!(c.listing_title(), Some("Beach hut"));
    }
}
