//! Application state machine.
//!
//! This module defines the [`App`] state machine, which manages the
//! interactive state of the client completely decoupled from I/O.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Owns session history and re-resolves the route on every navigation.
//! - Mounts and tears down views, opening and releasing the push
//!   subscription each view needs.
//! - Feeds local sends and backend completions into the mounted
//!   conversation's message log, discarding completions from older mounts.
//! - Owns the input line and dispatches slash commands.

use roovo_chat::{
    Conversation, ConversationId, ConversationList, LogChange, SendMessageRequest, TempId, UserId,
};
use roovo_router::{Navigator, PatternError, Resolution, RouteFactory, RouteTable};

use crate::{
    AppAction, AppEvent, ConversationView, InputState, KeyInput, OutgoingMessage, Route,
    Subscription, View,
    commands::{self, Command},
    routes,
};

/// Sequential temporary ids derived from a random seed.
#[derive(Debug, Clone)]
struct TempIdSource {
    seed: u128,
    issued: u64,
}

impl TempIdSource {
    fn next(&mut self) -> TempId {
        let id = TempId::from_random(self.seed.wrapping_add(u128::from(self.issued)));
        self.issued += 1;
        id
    }
}

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug)]
pub struct App {
    /// Session history.
    navigator: Navigator,
    /// Static route table.
    routes: RouteTable<RouteFactory<Route>>,
    /// Route decoded from the current location. `None` if nothing matched.
    route: Option<Route>,
    /// Mounted screen.
    view: View,
    /// Signed-in user. `None` if anonymous.
    session: Option<UserId>,
    /// Inbox cache.
    inbox: ConversationList,
    /// Highlighted inbox row.
    selected: usize,
    /// Push subscription currently held.
    subscription: Option<Subscription>,
    /// Last conversation mount generation handed out.
    generation: u64,
    /// Temporary id source for optimistic sends.
    temp_ids: TempIdSource,
    /// Input line.
    input: InputState,
    /// Terminal dimensions (columns, rows).
    terminal_size: (u16, u16),
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
}

impl App {
    /// Create an App positioned at `start_path`.
    ///
    /// Nothing is mounted until [`App::start`] runs. `temp_seed` seeds the
    /// temporary ids given to optimistic sends.
    ///
    /// # Errors
    ///
    /// Returns an error if the route table is malformed.
    pub fn new(start_path: &str, temp_seed: u128) -> Result<Self, PatternError> {
        Ok(Self {
            navigator: Navigator::new(start_path),
            routes: routes::route_table()?,
            route: None,
            view: View::NotFound { path: String::new() },
            session: None,
            inbox: ConversationList::new(),
            selected: 0,
            subscription: None,
            generation: 0,
            temp_ids: TempIdSource { seed: temp_seed, issued: 0 },
            input: InputState::new(),
            terminal_size: (80, 24),
            status_message: None,
        })
    }

    /// Mount the view for the initial location.
    pub fn start(&mut self) -> Vec<AppAction> {
        self.sync_route()
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Tick => vec![],
            AppEvent::Resize(cols, rows) => {
                self.terminal_size = (cols, rows);
                vec![AppAction::Render]
            },
            AppEvent::SessionStarted { user_id } => self.sign_in(user_id),
            AppEvent::SessionEnded => self.sign_out(),
            AppEvent::HistoryLoaded { conversation_id, generation, records } => {
                let Some(view) = self.current_conversation_mut(conversation_id, generation) else {
                    tracing::debug!(%conversation_id, generation, "stale history dropped");
                    return vec![];
                };
                let change = view.log.load_history(records);
                tracing::debug!(%conversation_id, ?change, "history merged");
                vec![AppAction::Render]
            },
            AppEvent::HistoryFailed { conversation_id, generation, reason } => {
                let Some(view) = self.current_conversation_mut(conversation_id, generation) else {
                    tracing::debug!(%conversation_id, generation, "stale history failure dropped");
                    return vec![];
                };
                view.log.load_history(Vec::new());
                tracing::warn!(%conversation_id, %reason, "history load failed");
                self.status_message = Some(format!("Could not load messages: {reason}"));
                vec![AppAction::Render]
            },
            AppEvent::MessageDelivered { record } => {
                let conversation_id = record.conversation_id;
                let View::Conversation(view) = &mut self.view else {
                    tracing::warn!(%conversation_id, "push delivery with no conversation mounted");
                    return vec![];
                };
                match view.log.deliver(record) {
                    LogChange::Ignored(reason) => {
                        tracing::warn!(%conversation_id, ?reason, "push delivery ignored");
                        vec![]
                    },
                    LogChange::Duplicate => {
                        tracing::debug!(%conversation_id, "duplicate push delivery");
                        vec![]
                    },
                    _ => vec![AppAction::Render],
                }
            },
            AppEvent::SendFailed { conversation_id, generation, temp_id, reason } => {
                tracing::warn!(%conversation_id, %temp_id, %reason, "send failed");
                let Some(view) = self.current_conversation_mut(conversation_id, generation) else {
                    tracing::debug!(%conversation_id, generation, "stale send result dropped");
                    return vec![];
                };
                if view.log.send_failed(&temp_id).is_visible() {
                    self.status_message = Some("Message not sent".into());
                }
                vec![AppAction::Render]
            },
            AppEvent::ConversationsLoaded { user_id, conversations } => {
                if self.session.as_ref() != Some(&user_id) {
                    tracing::debug!(%user_id, "stale inbox dropped");
                    return vec![];
                }
                self.inbox.replace(conversations);
                self.clamp_selection();
                vec![AppAction::Render]
            },
            AppEvent::ConversationChanged { conversation } => self.conversation_changed(conversation),
            AppEvent::ConversationLoaded { generation, conversation } => {
                let Some(view) = self.current_conversation_mut(conversation.id, generation) else {
                    tracing::debug!(conversation_id = %conversation.id, generation, "stale details dropped");
                    return vec![];
                };
                view.details = Some(conversation);
                vec![AppAction::Render]
            },
            AppEvent::Error { message } => {
                self.status_message = Some(format!("Error: {message}"));
                vec![AppAction::Render]
            },
        }
    }

    /// Push `path` onto history and mount its view.
    pub fn navigate(&mut self, path: &str) -> Vec<AppAction> {
        self.navigator.navigate(path);
        self.sync_route()
    }

    /// Go back one entry. With no prior entry, quit.
    pub fn back(&mut self) -> Vec<AppAction> {
        match self.navigator.back() {
            Some(_) => self.sync_route(),
            None => vec![AppAction::Quit],
        }
    }

    /// Go forward one entry, if any.
    pub fn forward(&mut self) -> Vec<AppAction> {
        match self.navigator.forward() {
            Some(_) => self.sync_route(),
            None => {
                self.status_message = Some("Nothing to go forward to".into());
                vec![AppAction::Render]
            },
        }
    }

    /// Submit `content` to the mounted conversation.
    ///
    /// The pending entry is in the log before the returned actions run.
    pub fn send_message(&mut self, content: impl Into<String>) -> Vec<AppAction> {
        let content = content.into();
        if content.trim().is_empty() {
            return vec![];
        }
        if self.view.conversation().is_none() {
            self.status_message = Some("Open a conversation to send messages".into());
            return vec![AppAction::Render];
        }

        let temp_id = self.temp_ids.next();
        let View::Conversation(view) = &mut self.view else {
            return vec![];
        };
        let LogChange::Appended { .. } = view.log.submit(temp_id.clone(), content.clone()) else {
            return vec![];
        };

        let conversation_id = view.conversation_id();
        let request = SendMessageRequest {
            conversation_id,
            sender_id: view.log.local_user().clone(),
            content,
        };
        vec![
            AppAction::Render,
            AppAction::SendMessage(OutgoingMessage {
                conversation_id,
                generation: view.generation,
                temp_id,
                request,
            }),
        ]
    }

    /// Set a status message to display to the user.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Move the inbox highlight down.
    pub fn select_next(&mut self) -> Vec<AppAction> {
        if self.selected + 1 < self.inbox.len() {
            self.selected += 1;
        }
        vec![AppAction::Render]
    }

    /// Move the inbox highlight up.
    pub fn select_previous(&mut self) -> Vec<AppAction> {
        self.selected = self.selected.saturating_sub(1);
        vec![AppAction::Render]
    }

    /// Open the highlighted inbox conversation.
    pub fn open_selected(&mut self) -> Vec<AppAction> {
        let selected = self.inbox.iter().nth(self.selected).map(|c| c.id);
        match selected {
            Some(id) => self.navigate(&Route::Conversation { id }.path()),
            None => vec![],
        }
    }

    /// Session history.
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Current location path.
    pub fn current_path(&self) -> &str {
        self.navigator.current()
    }

    /// Route decoded from the current location. `None` if nothing matched.
    pub fn route(&self) -> Option<Route> {
        self.route
    }

    /// Mounted screen.
    pub fn view(&self) -> &View {
        &self.view
    }

    /// Signed-in user. `None` if anonymous.
    pub fn session(&self) -> Option<&UserId> {
        self.session.as_ref()
    }

    /// Inbox cache.
    pub fn inbox(&self) -> &ConversationList {
        &self.inbox
    }

    /// Highlighted inbox row.
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Push subscription currently held.
    pub fn subscription(&self) -> Option<&Subscription> {
        self.subscription.as_ref()
    }

    /// Last conversation mount generation handed out.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Input line.
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Whether the bottom navigation bar is shown.
    pub fn shows_bottom_nav(&self) -> bool {
        routes::shows_bottom_nav(self.current_path())
    }

    /// Terminal dimensions (columns, rows).
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    /// Transient status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    fn handle_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        if self.input.edit(key) {
            return vec![AppAction::Render];
        }
        match key {
            KeyInput::Enter => self.handle_enter(),
            KeyInput::Esc => self.back(),
            KeyInput::Tab => {
                let target = if matches!(self.view, View::Inbox) { Route::Home } else { Route::Inbox };
                self.navigate(&target.path())
            },
            KeyInput::Up if matches!(self.view, View::Inbox) => self.select_previous(),
            KeyInput::Down if matches!(self.view, View::Inbox) => self.select_next(),
            _ => vec![],
        }
    }

    fn handle_enter(&mut self) -> Vec<AppAction> {
        let line = self.input.take();
        if line.is_empty() {
            return if matches!(self.view, View::Inbox) { self.open_selected() } else { vec![] };
        }

        match commands::parse(&line) {
            Command::Go { path } => self.navigate(&path),
            Command::Open { conversation_id } => {
                self.navigate(&Route::Conversation { id: conversation_id }.path())
            },
            Command::Inbox => self.navigate(&Route::Inbox.path()),
            Command::Home => self.navigate(&Route::Home.path()),
            Command::Back => self.back(),
            Command::Forward => self.forward(),
            Command::Login { user_id } => self.sign_in(user_id),
            Command::Logout => self.sign_out(),
            Command::Quit => vec![AppAction::Quit],
            Command::Message { content } => self.send_message(content),
            Command::Unknown { input } => {
                self.status_message = Some(format!("Unknown command: /{input}"));
                vec![AppAction::Render]
            },
            Command::InvalidArgs { command, error } => {
                self.status_message = Some(format!("/{command}: {error}"));
                vec![AppAction::Render]
            },
        }
    }

    fn sign_in(&mut self, user_id: UserId) -> Vec<AppAction> {
        if self.session.as_ref() == Some(&user_id) {
            return vec![];
        }
        self.status_message = Some(format!("Signed in as {user_id}"));
        self.session = Some(user_id.clone());
        self.inbox = ConversationList::new();
        self.selected = 0;

        let mut actions = self.sync_route();
        let preload = AppAction::FetchConversations { user_id };
        if !actions.contains(&preload) {
            actions.insert(0, preload);
        }
        actions
    }

    fn sign_out(&mut self) -> Vec<AppAction> {
        if self.session.take().is_none() {
            return vec![];
        }
        self.status_message = Some("Signed out".into());
        self.inbox = ConversationList::new();
        self.selected = 0;
        self.sync_route()
    }

    fn conversation_changed(&mut self, conversation: Conversation) -> Vec<AppAction> {
        let Some(user) = &self.session else {
            return vec![];
        };
        if conversation.party_of(user).is_none() {
            tracing::debug!(conversation_id = %conversation.id, "change for other user ignored");
            return vec![];
        }
        if let View::Conversation(view) = &mut self.view
            && view.conversation_id() == conversation.id
        {
            view.details = Some(conversation.clone());
        }
        self.inbox.upsert(conversation);
        self.clamp_selection();
        vec![AppAction::Render]
    }

    /// Re-resolve the current location, remount if needed, and reconcile
    /// the push subscription with the mounted view.
    fn sync_route(&mut self) -> Vec<AppAction> {
        let path = self.navigator.current().to_string();
        let route = match self.routes.decode(&path) {
            Resolution::Matched { route, .. } => Some(route),
            Resolution::NoRoute | Resolution::Rejected { .. } => None,
        };
        tracing::debug!(%path, ?route, "route resolved");
        self.route = route;

        let fetches = self.mount(route, path);
        let mut actions = self.sync_subscription();
        actions.extend(fetches);
        actions.push(AppAction::Render);
        actions
    }

    fn mount(&mut self, route: Option<Route>, path: String) -> Vec<AppAction> {
        let Some(route) = route else {
            self.view = View::NotFound { path };
            return vec![];
        };
        match route {
            Route::Home => {
                self.view = View::Home;
                vec![]
            },
            Route::Listing { id } => {
                self.view = View::Listing { id };
                vec![]
            },
            Route::Inbox => match self.session.clone() {
                Some(user_id) => {
                    if matches!(self.view, View::Inbox) {
                        return vec![];
                    }
                    self.view = View::Inbox;
                    self.selected = 0;
                    vec![AppAction::FetchConversations { user_id }]
                },
                None => self.require_session(route),
            },
            Route::Conversation { id } => match self.session.clone() {
                Some(user_id) => self.mount_conversation(id, user_id),
                None => self.require_session(route),
            },
        }
    }

    fn mount_conversation(&mut self, id: ConversationId, user_id: UserId) -> Vec<AppAction> {
        if let View::Conversation(view) = &self.view
            && view.conversation_id() == id
            && view.log.local_user() == &user_id
        {
            return vec![];
        }

        self.generation += 1;
        let generation = self.generation;
        tracing::debug!(conversation_id = %id, generation, "conversation mounted");
        self.view = View::Conversation(Box::new(ConversationView::new(id, user_id, generation)));
        vec![
            AppAction::FetchHistory { conversation_id: id, generation },
            AppAction::FetchConversation { conversation_id: id, generation },
        ]
    }

    fn require_session(&mut self, route: Route) -> Vec<AppAction> {
        self.view = View::SignInRequired { route };
        vec![]
    }

    fn desired_subscription(&self) -> Option<Subscription> {
        match &self.view {
            View::Conversation(view) => Some(Subscription::Messages(view.conversation_id())),
            View::Inbox => self.session.clone().map(Subscription::Conversations),
            _ => None,
        }
    }

    fn sync_subscription(&mut self) -> Vec<AppAction> {
        let desired = self.desired_subscription();
        if desired == self.subscription {
            return vec![];
        }

        let mut actions = Vec::with_capacity(2);
        if let Some(old) = self.subscription.take() {
            tracing::debug!(subscription = %old, "subscription released");
            actions.push(AppAction::Unsubscribe(old));
        }
        if let Some(new) = &desired {
            tracing::debug!(subscription = %new, "subscription opened");
            actions.push(AppAction::Subscribe(new.clone()));
        }
        self.subscription = desired;
        actions
    }

    fn current_conversation_mut(
        &mut self,
        conversation_id: ConversationId,
        generation: u64,
    ) -> Option<&mut ConversationView> {
        match &mut self.view {
            View::Conversation(view) if view.is_current(conversation_id, generation) => {
                Some(view.as_mut())
            },
            _ => None,
        }
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.inbox.len().saturating_sub(1));
    }
}
