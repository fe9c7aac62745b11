//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as the terminal driver but
//! answers every request from a [`SimBackend`](crate::SimBackend), so the
//! same [`roovo_app::Runtime`] orchestration code runs in production and in
//! simulation.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use roovo_app::{
    App, AppAction, AppEvent, Driver, KeyInput, OutgoingMessage, Subscription, route_table,
};
use roovo_chat::{ConversationId, UserId};

use crate::{
    invariants::{ClientSnapshot, InvariantRegistry, SystemSnapshot},
    sim_backend::{self, ClientId, SharedSimBackend},
};

/// Error type for simulation driver.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// A request the runtime made of the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Subscription opened.
    Subscribe(Subscription),
    /// Subscription released.
    Unsubscribe(Subscription),
    /// History fetch.
    History(ConversationId, u64),
    /// Header details fetch.
    Details(ConversationId, u64),
    /// Inbox fetch.
    Inbox(UserId),
    /// Send request.
    Send(OutgoingMessage),
}

/// Request traffic held back while paused, in issue order.
enum Withheld {
    Completion(AppEvent),
    Send(OutgoingMessage),
}

/// Shared state for event injection.
///
/// This allows injection from outside async contexts while the runtime owns
/// the driver.
#[derive(Default)]
struct SharedState {
    input: VecDeque<AppEvent>,
    completions: VecDeque<AppEvent>,
    withheld: VecDeque<Withheld>,
    paused: bool,
    requests: Vec<Request>,
    renders: usize,
}

/// Simulation driver for deterministic testing.
pub struct SimDriver {
    client_id: ClientId,
    backend: SharedSimBackend,
    state: Arc<Mutex<SharedState>>,
    invariants: Option<InvariantRegistry>,
}

impl SimDriver {
    /// Driver for client `client_id` talking to `backend`.
    pub fn new(client_id: ClientId, backend: SharedSimBackend) -> Self {
        Self {
            client_id,
            backend,
            state: Arc::new(Mutex::new(SharedState::default())),
            invariants: None,
        }
    }

    /// Enable invariant checking on every render.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(registry);
        self
    }

    /// Client id used with the backend.
    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    /// Backend this driver talks to.
    pub fn backend(&self) -> &SharedSimBackend {
        &self.backend
    }

    /// Inject an input `AppEvent` for processing.
    pub fn inject_event(&self, event: AppEvent) {
        self.lock().input.push_back(event);
    }

    /// Inject a key press.
    pub fn inject_key(&self, key: KeyInput) {
        self.inject_event(AppEvent::Key(key));
    }

    /// Inject a typed line followed by Enter.
    pub fn type_line(&self, line: &str) {
        let mut state = self.lock();
        state.input.extend(line.chars().map(|c| AppEvent::Key(KeyInput::Char(c))));
        state.input.push_back(AppEvent::Key(KeyInput::Enter));
    }

    /// Hold back request traffic until [`SimDriver::resume`].
    ///
    /// Fetch outcomes wait, and sends do not reach the backend. Push
    /// deliveries keep flowing.
    pub fn pause(&self) {
        self.lock().paused = true;
    }

    /// Release traffic held since [`SimDriver::pause`], in issue order.
    pub fn resume(&self) {
        let withheld = {
            let mut state = self.lock();
            state.paused = false;
            std::mem::take(&mut state.withheld)
        };
        for item in withheld {
            match item {
                Withheld::Completion(event) => self.complete(event),
                Withheld::Send(message) => self.deliver_send(&message),
            }
        }
    }

    /// Requests made so far.
    pub fn requests(&self) -> Vec<Request> {
        self.lock().requests.clone()
    }

    /// Number of renders so far.
    pub fn renders(&self) -> usize {
        self.lock().renders
    }

    /// Check if there are events waiting to be processed.
    pub fn has_pending(&self) -> bool {
        let queued = {
            let state = self.lock();
            !state.input.is_empty() || !state.completions.is_empty()
        };
        queued || sim_backend::lock(&self.backend).pending_pushes(self.client_id) > 0
    }

    /// Create a snapshot from App state for invariant checking.
    pub fn snapshot_from_app(&self, app: &App) -> SystemSnapshot {
        SystemSnapshot::single(self.client_snapshot(app))
    }

    /// This client's observable state, for multi-client snapshots.
    pub fn client_snapshot(&self, app: &App) -> ClientSnapshot {
        let path = app.current_path();
        let resolved = route_table().ok().and_then(|table| table.decode(path).route().copied());
        let held = sim_backend::lock(&self.backend).subscriptions(self.client_id);

        let mut snapshot = ClientSnapshot::new(self.client_id)
            .with_location(path, app.route(), resolved)
            .with_subscriptions(app.subscription().cloned(), held);
        snapshot.session = app.session().cloned();
        if let Some(view) = app.view().conversation() {
            let rendered = view.log.rendered().into_iter().map(|m| m.id.clone()).collect();
            snapshot = snapshot.with_conversation(view.conversation_id(), rendered);
        }
        snapshot
    }

    /// Check invariants against App state, panicking on violation.
    pub fn check_invariants(&self, app: &App, context: &str) {
        if let Some(ref registry) = self.invariants {
            registry.assert_all(&self.snapshot_from_app(app), context);
        }
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, request: Request) {
        self.lock().requests.push(request);
    }

    fn complete(&self, event: AppEvent) {
        let mut state = self.lock();
        if state.paused {
            state.withheld.push_back(Withheld::Completion(event));
        } else {
            state.completions.push_back(event);
        }
    }

    fn deliver_send(&self, message: &OutgoingMessage) {
        let result = sim_backend::lock(&self.backend).insert(&message.request);
        if let Err(reason) = result {
            self.complete(AppEvent::SendFailed {
                conversation_id: message.conversation_id,
                generation: message.generation,
                temp_id: message.temp_id.clone(),
                reason,
            });
        }
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    async fn poll_event(&mut self, app: &mut App) -> Result<Vec<AppAction>, Self::Error> {
        let event = self.lock().input.pop_front();
        Ok(event.map(|event| app.handle(event)).unwrap_or_default())
    }

    async fn recv_event(&mut self) -> Option<AppEvent> {
        let completion = self.lock().completions.pop_front();
        completion.or_else(|| sim_backend::lock(&self.backend).take_push(self.client_id))
    }

    async fn subscribe(&mut self, subscription: Subscription) -> Result<(), Self::Error> {
        self.record(Request::Subscribe(subscription.clone()));
        if !sim_backend::lock(&self.backend).subscribe(self.client_id, subscription.clone()) {
            return Err(SimDriverError(format!("already subscribed to {subscription}")));
        }
        Ok(())
    }

    async fn unsubscribe(&mut self, subscription: Subscription) -> Result<(), Self::Error> {
        self.record(Request::Unsubscribe(subscription.clone()));
        if !sim_backend::lock(&self.backend).unsubscribe(self.client_id, &subscription) {
            return Err(SimDriverError(format!("not subscribed to {subscription}")));
        }
        Ok(())
    }

    async fn send_message(&mut self, message: OutgoingMessage) -> Result<(), Self::Error> {
        self.record(Request::Send(message.clone()));
        let paused = {
            let mut state = self.lock();
            if state.paused {
                state.withheld.push_back(Withheld::Send(message.clone()));
            }
            state.paused
        };
        if !paused {
            self.deliver_send(&message);
        }
        Ok(())
    }

    async fn fetch_history(
        &mut self,
        conversation_id: ConversationId,
        generation: u64,
    ) -> Result<(), Self::Error> {
        self.record(Request::History(conversation_id, generation));
        let result = sim_backend::lock(&self.backend).history(conversation_id);
        self.complete(match result {
            Ok(records) => AppEvent::HistoryLoaded { conversation_id, generation, records },
            Err(reason) => AppEvent::HistoryFailed { conversation_id, generation, reason },
        });
        Ok(())
    }

    async fn fetch_conversation(
        &mut self,
        conversation_id: ConversationId,
        generation: u64,
    ) -> Result<(), Self::Error> {
        self.record(Request::Details(conversation_id, generation));
        let conversation = sim_backend::lock(&self.backend).conversation(conversation_id).cloned();
        self.complete(match conversation {
            Some(conversation) => AppEvent::ConversationLoaded { generation, conversation },
            None => AppEvent::Error { message: format!("conversation {conversation_id} not found") },
        });
        Ok(())
    }

    async fn fetch_conversations(&mut self, user_id: UserId) -> Result<(), Self::Error> {
        self.record(Request::Inbox(user_id.clone()));
        let conversations = sim_backend::lock(&self.backend).guest_conversations(&user_id);
        self.complete(AppEvent::ConversationsLoaded { user_id, conversations });
        Ok(())
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.lock().renders += 1;
        if let Some(ref registry) = self.invariants
            && let Err(violations) = registry.check_all(&self.snapshot_from_app(app))
        {
            let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
            return Err(SimDriverError(messages.join("; ")));
        }
        Ok(())
    }

    fn stop(&mut self) {
        sim_backend::lock(&self.backend).disconnect(self.client_id);
    }
}
