//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::future::Future;

use roovo_chat::{ConversationId, UserId};

use crate::{App, AppAction, AppEvent, OutgoingMessage, Subscription};

/// Abstracts I/O operations for the application runtime.
///
/// Request methods only start work. Their outcomes, and anything the push
/// subscription delivers, come back as [`AppEvent`]s through
/// [`Driver::recv_event`], so the loop never blocks on the network.
///
/// # Implementations
///
/// - **TUI**: crossterm for terminal events, reqwest and a websocket for the
///   backend
/// - **Simulation**: an in-memory backend with injectable failures
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Poll for the next input event and apply it to `app`.
    ///
    /// Returns the resulting actions, empty if nothing was ready.
    fn poll_event(
        &mut self,
        app: &mut App,
    ) -> impl Future<Output = Result<Vec<AppAction>, Self::Error>> + Send;

    /// Next completed backend event. `None` if nothing is ready.
    fn recv_event(&mut self) -> impl Future<Output = Option<AppEvent>> + Send;

    /// Open a push subscription.
    fn subscribe(
        &mut self,
        subscription: Subscription,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Release a push subscription.
    fn unsubscribe(
        &mut self,
        subscription: Subscription,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Start a send request. Failure is reported as
    /// [`AppEvent::SendFailed`].
    fn send_message(
        &mut self,
        message: OutgoingMessage,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Start a history fetch, answered by [`AppEvent::HistoryLoaded`] or
    /// [`AppEvent::HistoryFailed`].
    fn fetch_history(
        &mut self,
        conversation_id: ConversationId,
        generation: u64,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Start a conversation details fetch, answered by
    /// [`AppEvent::ConversationLoaded`].
    fn fetch_conversation(
        &mut self,
        conversation_id: ConversationId,
        generation: u64,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Start an inbox fetch, answered by [`AppEvent::ConversationsLoaded`].
    fn fetch_conversations(
        &mut self,
        user_id: UserId,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Release subscriptions and clean up resources.
    fn stop(&mut self);
}
