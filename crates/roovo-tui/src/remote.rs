//! Link between the runtime and the backend.
//!
//! Requests run as spawned tasks; each posts exactly one [`AppEvent`] back
//! on an unbounded channel when it finishes. Realtime rows arrive on a
//! second channel and are translated on the way out.

use std::sync::Arc;

use roovo_app::{AppEvent, OutgoingMessage, Subscription};
use roovo_backend::{
    BackendConfig, BackendError, Channel, RealtimeClient, RealtimeError, RealtimeEvent, RestClient,
};
use roovo_chat::{ConversationId, UserId};
use tokio::sync::mpsc;

/// Backend handle owned by the terminal driver.
pub struct Remote {
    rest: Arc<RestClient>,
    realtime: Option<RealtimeClient>,
    completions_tx: mpsc::UnboundedSender<AppEvent>,
    completions_rx: mpsc::UnboundedReceiver<AppEvent>,
    realtime_rx: mpsc::UnboundedReceiver<RealtimeEvent>,
}

impl Remote {
    /// Build the REST client and open the realtime connection.
    ///
    /// A missing or unreachable realtime endpoint is not fatal: the client
    /// runs without push delivery and says so in the log.
    ///
    /// # Errors
    ///
    /// Returns an error if the REST client cannot be built.
    pub async fn connect(config: &BackendConfig) -> Result<Self, BackendError> {
        let rest = RestClient::new(config)?;
        let (realtime_tx, realtime_rx) = mpsc::unbounded_channel();
        let realtime = match RealtimeClient::connect(config, realtime_tx).await {
            Ok(client) => Some(client),
            Err(RealtimeError::NotConfigured) => {
                tracing::info!("no realtime endpoint configured, push delivery disabled");
                None
            },
            Err(error) => {
                tracing::warn!(%error, "realtime connection failed, push delivery disabled");
                None
            },
        };
        Ok(Self::with_clients(rest, realtime, realtime_rx))
    }

    /// Assemble from already built clients.
    pub fn with_clients(
        rest: RestClient,
        realtime: Option<RealtimeClient>,
        realtime_rx: mpsc::UnboundedReceiver<RealtimeEvent>,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self { rest: Arc::new(rest), realtime, completions_tx, completions_rx, realtime_rx }
    }

    /// True if push delivery is live.
    pub fn has_realtime(&self) -> bool {
        self.realtime.as_ref().is_some_and(RealtimeClient::is_connected)
    }

    /// Join the channel backing `subscription`.
    pub fn subscribe(&self, subscription: &Subscription) -> Result<(), RealtimeError> {
        match &self.realtime {
            Some(client) => client.subscribe(channel_for(subscription)),
            None => {
                tracing::debug!(%subscription, "subscription skipped, no realtime connection");
                Ok(())
            },
        }
    }

    /// Leave the channel backing `subscription`.
    pub fn unsubscribe(&self, subscription: &Subscription) -> Result<(), RealtimeError> {
        match &self.realtime {
            Some(client) => client.unsubscribe(channel_for(subscription)),
            None => Ok(()),
        }
    }

    /// Start a send. Only failure is reported; success shows up as a push.
    pub fn send_message(&self, message: OutgoingMessage) {
        self.spawn(move |rest| async move {
            let error = rest.send_message(&message.request).await.err()?;
            Some(AppEvent::SendFailed {
                conversation_id: message.conversation_id,
                generation: message.generation,
                temp_id: message.temp_id,
                reason: error.to_string(),
            })
        });
    }

    /// Start a history fetch.
    pub fn fetch_history(&self, conversation_id: ConversationId, generation: u64) {
        self.spawn(move |rest| async move {
            Some(match rest.history(conversation_id).await {
                Ok(records) => AppEvent::HistoryLoaded { conversation_id, generation, records },
                Err(error) => {
                    AppEvent::HistoryFailed { conversation_id, generation, reason: error.to_string() }
                },
            })
        });
    }

    /// Start a conversation details fetch. Failure only costs the header,
    /// so it is logged and dropped.
    pub fn fetch_conversation(&self, conversation_id: ConversationId, generation: u64) {
        self.spawn(move |rest| async move {
            match rest.conversation(conversation_id).await {
                Ok(conversation) => Some(AppEvent::ConversationLoaded { generation, conversation }),
                Err(error) => {
                    tracing::warn!(%conversation_id, %error, "conversation details failed");
                    None
                },
            }
        });
    }

    /// Start an inbox fetch.
    pub fn fetch_conversations(&self, user_id: UserId) {
        self.spawn(move |rest| async move {
            Some(match rest.guest_conversations(&user_id).await {
                Ok(conversations) => AppEvent::ConversationsLoaded { user_id, conversations },
                Err(error) => AppEvent::Error { message: format!("inbox: {error}") },
            })
        });
    }

    /// Next ready event without waiting.
    pub fn try_recv(&mut self) -> Option<AppEvent> {
        if let Ok(event) = self.completions_rx.try_recv() {
            return Some(event);
        }
        while let Ok(event) = self.realtime_rx.try_recv() {
            if let Some(event) = translate(event) {
                return Some(event);
            }
        }
        None
    }

    /// Wait for the next event. `None` once both channels are closed.
    pub async fn recv(&mut self) -> Option<AppEvent> {
        loop {
            tokio::select! {
                Some(event) = self.completions_rx.recv() => return Some(event),
                Some(event) = self.realtime_rx.recv() => {
                    if let Some(event) = translate(event) {
                        return Some(event);
                    }
                },
                else => return None,
            }
        }
    }

    /// Close the realtime connection, if any.
    pub fn shutdown(&mut self) {
        let Some(client) = self.realtime.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(client.close());
            },
            Err(_) => drop(client),
        }
    }

    fn spawn<F, Fut>(&self, request: F)
    where
        F: FnOnce(Arc<RestClient>) -> Fut,
        Fut: Future<Output = Option<AppEvent>> + Send + 'static,
    {
        let tx = self.completions_tx.clone();
        let task = request(Arc::clone(&self.rest));
        tokio::spawn(async move {
            if let Some(event) = task.await {
                let _ = tx.send(event);
            }
        });
    }
}

/// Realtime channel serving `subscription`.
pub fn channel_for(subscription: &Subscription) -> Channel {
    match subscription {
        Subscription::Messages(id) => Channel::Messages(*id),
        Subscription::Conversations(user) => Channel::Conversations(user.clone()),
    }
}

/// Map a realtime event onto the App's input.
pub fn translate(event: RealtimeEvent) -> Option<AppEvent> {
    match event {
        RealtimeEvent::MessageInserted(record) => Some(AppEvent::MessageDelivered { record }),
        RealtimeEvent::ConversationChanged(conversation) => {
            Some(AppEvent::ConversationChanged { conversation })
        },
        RealtimeEvent::ChannelClosed(channel) => {
            tracing::warn!(topic = %channel.topic(), "channel closed by server");
            None
        },
        RealtimeEvent::Disconnected { reason } => {
            Some(AppEvent::Error { message: format!("live updates stopped: {reason}") })
        },
    }
}
