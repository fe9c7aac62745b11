//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture what a client shows at one point in time, together with
//! what the backend believes the client is subscribed to. Invariants operate
//! on snapshots rather than live state so every check sees the same moment.

use std::collections::BTreeSet;

use roovo_app::{Route, Subscription};
use roovo_chat::{ConversationId, MessageId, UserId};

/// Snapshot of every simulated client.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    /// Per-client state snapshots.
    pub clients: Vec<ClientSnapshot>,
}

impl SystemSnapshot {
    /// Create an empty snapshot (no clients).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a snapshot with a single client.
    pub fn single(client: ClientSnapshot) -> Self {
        Self { clients: vec![client] }
    }

    /// Create a snapshot from multiple clients.
    pub fn from_clients(clients: Vec<ClientSnapshot>) -> Self {
        Self { clients }
    }

    /// Add a client snapshot.
    pub fn add_client(&mut self, client: ClientSnapshot) {
        self.clients.push(client);
    }
}

/// Snapshot of a single client's observable state.
#[derive(Debug, Clone, Default)]
pub struct ClientSnapshot {
    /// Client identifier.
    pub id: u64,
    /// Current location.
    pub path: String,
    /// Route the App believes is mounted.
    pub route: Option<Route>,
    /// Route a fresh decode of `path` yields.
    pub resolved: Option<Route>,
    /// Signed-in user.
    pub session: Option<UserId>,
    /// Conversation mounted, if any.
    pub mounted: Option<ConversationId>,
    /// Ids of the rendered messages, in display order.
    pub rendered: Vec<MessageId>,
    /// Subscription the App believes it holds.
    pub expected_subscription: Option<Subscription>,
    /// Subscriptions the backend has registered for this client.
    pub held_subscriptions: BTreeSet<Subscription>,
}

impl ClientSnapshot {
    /// Create a new client snapshot.
    pub fn new(id: u64) -> Self {
        Self { id, ..Default::default() }
    }

    /// Set location and both route readings.
    pub fn with_location(
        mut self,
        path: impl Into<String>,
        route: Option<Route>,
        resolved: Option<Route>,
    ) -> Self {
        self.path = path.into();
        self.route = route;
        self.resolved = resolved;
        self
    }

    /// Set the mounted conversation and its rendered ids.
    pub fn with_conversation(mut self, id: ConversationId, rendered: Vec<MessageId>) -> Self {
        self.mounted = Some(id);
        self.rendered = rendered;
        self
    }

    /// Set the expected and held subscriptions.
    pub fn with_subscriptions(
        mut self,
        expected: Option<Subscription>,
        held: impl IntoIterator<Item = Subscription>,
    ) -> Self {
        self.expected_subscription = expected;
        self.held_subscriptions = held.into_iter().collect();
        self
    }
}
