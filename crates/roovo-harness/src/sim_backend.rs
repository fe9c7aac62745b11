//! In-memory backend shared by simulated clients.
//!
//! `SimBackend` plays the REST API and the push service at once. Stored
//! messages get sequential server ids, and every insert is queued as a push
//! event for each client subscribed to the conversation, including the
//! sender. Faults are armed ahead of time and consumed by the next matching
//! request.

use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use chrono::DateTime;
use roovo_app::{AppEvent, Subscription};
use roovo_chat::{Conversation, ConversationId, MessageRecord, SendMessageRequest, UserId};

/// Identifies one simulated client.
pub type ClientId = u64;

/// Seconds offset for simulated insert timestamps.
const EPOCH_OFFSET: i64 = 1_700_000_000;

/// Simulated backend state.
#[derive(Debug)]
pub struct SimBackend {
    conversations: BTreeMap<ConversationId, Conversation>,
    messages: Vec<MessageRecord>,
    next_message_id: u64,
    subscriptions: BTreeMap<ClientId, BTreeSet<Subscription>>,
    pushes: BTreeMap<ClientId, VecDeque<AppEvent>>,
    failing_sends: usize,
    failing_history: usize,
    redeliver: bool,
}

impl Default for SimBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SimBackend {
    /// Empty backend. The first stored message gets id 1.
    pub fn new() -> Self {
        Self {
            conversations: BTreeMap::new(),
            messages: Vec::new(),
            next_message_id: 1,
            subscriptions: BTreeMap::new(),
            pushes: BTreeMap::new(),
            failing_sends: 0,
            failing_history: 0,
            redeliver: false,
        }
    }

    /// Store a conversation row.
    pub fn add_conversation(&mut self, conversation: Conversation) {
        self.conversations.insert(conversation.id, conversation);
    }

    /// Conversation row by id.
    pub fn conversation(&self, id: ConversationId) -> Option<&Conversation> {
        self.conversations.get(&id)
    }

    /// Conversations where `user` is the guest.
    pub fn guest_conversations(&self, user: &UserId) -> Vec<Conversation> {
        self.conversations.values().filter(|c| &c.guest_id == user).cloned().collect()
    }

    /// Stored messages of a conversation, oldest first.
    pub fn messages(&self, id: ConversationId) -> Vec<MessageRecord> {
        self.messages.iter().filter(|m| m.conversation_id == id).cloned().collect()
    }

    /// Answer a history request.
    ///
    /// Fails while a history fault is armed.
    pub fn history(&mut self, id: ConversationId) -> Result<Vec<MessageRecord>, String> {
        if self.failing_history > 0 {
            self.failing_history -= 1;
            return Err("history unavailable".into());
        }
        Ok(self.messages(id))
    }

    /// Store a message and publish it.
    ///
    /// Fails while a send fault is armed, or if the conversation does not
    /// exist or the sender is not one of its parties.
    pub fn insert(&mut self, request: &SendMessageRequest) -> Result<MessageRecord, String> {
        if self.failing_sends > 0 {
            self.failing_sends -= 1;
            return Err("connection reset".into());
        }
        let Some(conversation) = self.conversations.get_mut(&request.conversation_id) else {
            return Err(format!("conversation {} not found", request.conversation_id));
        };
        if conversation.party_of(&request.sender_id).is_none() {
            return Err(format!("{} is not a party", request.sender_id));
        }

        let id = self.next_message_id;
        self.next_message_id += 1;
        let created_at = DateTime::from_timestamp(EPOCH_OFFSET + id as i64, 0);
        conversation.last_message_at = created_at;

        let record = MessageRecord {
            id,
            conversation_id: request.conversation_id,
            sender_id: request.sender_id.clone(),
            content: request.content.clone(),
            is_verified: true,
            created_at,
        };
        self.messages.push(record.clone());
        tracing::debug!(id, conversation_id = %record.conversation_id, "sim insert");

        self.publish(&record);
        Ok(record)
    }

    /// Push a stored message to its subscribers again.
    ///
    /// Returns `false` if no message has that id.
    pub fn redeliver(&mut self, message_id: u64) -> bool {
        let Some(record) = self.messages.iter().find(|m| m.id == message_id).cloned() else {
            return false;
        };
        self.push_message(&record);
        true
    }

    /// Register `subscription` for `client`. Returns `false` if it was
    /// already held.
    pub fn subscribe(&mut self, client: ClientId, subscription: Subscription) -> bool {
        self.subscriptions.entry(client).or_default().insert(subscription)
    }

    /// Release `subscription`. Returns `false` if it was not held.
    ///
    /// Pushes already queued for the client stay queued, as frames in flight
    /// would.
    pub fn unsubscribe(&mut self, client: ClientId, subscription: &Subscription) -> bool {
        self.subscriptions.get_mut(&client).is_some_and(|held| held.remove(subscription))
    }

    /// Release everything `client` holds.
    pub fn disconnect(&mut self, client: ClientId) {
        self.subscriptions.remove(&client);
    }

    /// Subscriptions held by `client`.
    pub fn subscriptions(&self, client: ClientId) -> BTreeSet<Subscription> {
        self.subscriptions.get(&client).cloned().unwrap_or_default()
    }

    /// Next queued push for `client`.
    pub fn take_push(&mut self, client: ClientId) -> Option<AppEvent> {
        self.pushes.get_mut(&client)?.pop_front()
    }

    /// Number of pushes queued for `client`.
    pub fn pending_pushes(&self, client: ClientId) -> usize {
        self.pushes.get(&client).map_or(0, VecDeque::len)
    }

    /// Fail the next `count` send requests.
    pub fn fail_next_sends(&mut self, count: usize) {
        self.failing_sends = count;
    }

    /// Fail the next `count` history requests.
    pub fn fail_next_history(&mut self, count: usize) {
        self.failing_history = count;
    }

    /// Deliver every insert twice.
    pub fn set_redeliver(&mut self, redeliver: bool) {
        self.redeliver = redeliver;
    }

    fn publish(&mut self, record: &MessageRecord) {
        self.push_message(record);
        if self.redeliver {
            self.push_message(record);
        }

        let Some(conversation) = self.conversations.get(&record.conversation_id).cloned() else {
            return;
        };
        let topic = Subscription::Conversations(conversation.guest_id.clone());
        for client in self.subscribers(&topic) {
            self.queue(client, AppEvent::ConversationChanged { conversation: conversation.clone() });
        }
    }

    fn push_message(&mut self, record: &MessageRecord) {
        let topic = Subscription::Messages(record.conversation_id);
        for client in self.subscribers(&topic) {
            self.queue(client, AppEvent::MessageDelivered { record: record.clone() });
        }
    }

    fn subscribers(&self, topic: &Subscription) -> Vec<ClientId> {
        self.subscriptions
            .iter()
            .filter(|(_, held)| held.contains(topic))
            .map(|(client, _)| *client)
            .collect()
    }

    fn queue(&mut self, client: ClientId, event: AppEvent) {
        self.pushes.entry(client).or_default().push_back(event);
    }
}

/// Backend handle shared between simulated clients.
pub type SharedSimBackend = Arc<Mutex<SimBackend>>;

/// Create an empty shared backend.
pub fn create_shared_backend() -> SharedSimBackend {
    Arc::new(Mutex::new(SimBackend::new()))
}

/// Lock a shared backend, recovering from a poisoned lock.
pub(crate) fn lock(backend: &SharedSimBackend) -> MutexGuard<'_, SimBackend> {
    backend.lock().unwrap_or_else(PoisonError::into_inner)
}
