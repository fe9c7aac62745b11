//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. Backend traffic goes through
//! [`Remote`].

use std::{
    io::{self, Stdout, stdout},
    time::Duration,
};

use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use roovo_app::{App, AppAction, AppEvent, Driver, KeyInput, OutgoingMessage, Subscription};
use roovo_backend::RealtimeError;
use roovo_chat::{ConversationId, UserId};
use thiserror::Error;

use crate::{remote::Remote, ui};

const TICK: Duration = Duration::from_millis(250);

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Realtime connection is gone.
    #[error("realtime error: {0}")]
    Realtime(#[from] RealtimeError),
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Owns the terminal (raw mode, alternate screen) for its lifetime and
/// restores it on drop.
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    remote: Remote,
}

impl TerminalDriver {
    /// Take over the terminal.
    pub fn new(remote: Remote) -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(Self { terminal, event_stream: EventStream::new(), remote })
    }

    /// Convert crossterm `KeyCode` to `KeyInput`.
    fn convert_key(code: KeyCode) -> Option<KeyInput> {
        match code {
            KeyCode::Char(c) => Some(KeyInput::Char(c)),
            KeyCode::Enter => Some(KeyInput::Enter),
            KeyCode::Backspace => Some(KeyInput::Backspace),
            KeyCode::Delete => Some(KeyInput::Delete),
            KeyCode::Tab => Some(KeyInput::Tab),
            KeyCode::Esc => Some(KeyInput::Esc),
            KeyCode::Left => Some(KeyInput::Left),
            KeyCode::Right => Some(KeyInput::Right),
            KeyCode::Up => Some(KeyInput::Up),
            KeyCode::Down => Some(KeyInput::Down),
            KeyCode::Home => Some(KeyInput::Home),
            KeyCode::End => Some(KeyInput::End),
            _ => None,
        }
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;

    async fn poll_event(&mut self, app: &mut App) -> Result<Vec<AppAction>, Self::Error> {
        tokio::select! {
            biased;

            maybe_event = self.event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) if key_event.kind == KeyEventKind::Press => {
                        Ok(Self::convert_key(key_event.code)
                            .map(|key| app.handle(AppEvent::Key(key)))
                            .unwrap_or_default())
                    },
                    Some(Ok(Event::Resize(cols, rows))) => Ok(app.handle(AppEvent::Resize(cols, rows))),
                    Some(Err(e)) => Err(TerminalError::Io(e)),
                    None => Ok(vec![AppAction::Quit]),
                    _ => Ok(vec![]),
                }
            }

            Some(event) = self.remote.recv() => Ok(app.handle(event)),

            () = tokio::time::sleep(TICK) => Ok(app.handle(AppEvent::Tick)),
        }
    }

    async fn recv_event(&mut self) -> Option<AppEvent> {
        self.remote.try_recv()
    }

    async fn subscribe(&mut self, subscription: Subscription) -> Result<(), Self::Error> {
        Ok(self.remote.subscribe(&subscription)?)
    }

    async fn unsubscribe(&mut self, subscription: Subscription) -> Result<(), Self::Error> {
        Ok(self.remote.unsubscribe(&subscription)?)
    }

    async fn send_message(&mut self, message: OutgoingMessage) -> Result<(), Self::Error> {
        self.remote.send_message(message);
        Ok(())
    }

    async fn fetch_history(
        &mut self,
        conversation_id: ConversationId,
        generation: u64,
    ) -> Result<(), Self::Error> {
        self.remote.fetch_history(conversation_id, generation);
        Ok(())
    }

    async fn fetch_conversation(
        &mut self,
        conversation_id: ConversationId,
        generation: u64,
    ) -> Result<(), Self::Error> {
        self.remote.fetch_conversation(conversation_id, generation);
        Ok(())
    }

    async fn fetch_conversations(&mut self, user_id: UserId) -> Result<(), Self::Error> {
        self.remote.fetch_conversations(user_id);
        Ok(())
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.terminal.draw(|frame| ui::render(frame, app))?;
        Ok(())
    }

    fn stop(&mut self) {
        self.remote.shutdown();
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.stop();
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}
