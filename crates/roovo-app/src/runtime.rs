//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: UI state machine
//! - [`Driver`]: Platform-specific I/O

use roovo_chat::UserId;
use roovo_router::PatternError;

use crate::{App, AppAction, AppEvent, Driver, Environment};

/// Startup options for a [`Runtime`].
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Initial location.
    pub start_path: String,
    /// User signed in at startup. `None` starts anonymous.
    pub user_id: Option<UserId>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { start_path: "/".to_string(), user_id: None }
    }
}

/// Generic runtime that orchestrates App and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `E`: Environment providing randomness for temporary ids
pub struct Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    driver: D,
    app: App,
    env: E,
    user_id: Option<UserId>,
}

impl<D, E> Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    /// Create a new runtime with the given driver and environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the route table is malformed.
    pub fn new(driver: D, env: E, config: RuntimeConfig) -> Result<Self, PatternError> {
        let app = App::new(&config.start_path, env.random_u128())?;
        Ok(Self { driver, app, env, user_id: config.user_id })
    }

    /// Run the main event loop until the app quits.
    ///
    /// Each cycle:
    /// 1. Polls for input events from the driver
    /// 2. Drains completed backend events into the App
    /// 3. Executes the resulting actions through the driver
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        let quit = self.start().await?;
        if !quit {
            while !self.process_cycle().await? {}
        }
        self.driver.stop();
        Ok(())
    }

    /// Mount the initial view and open the startup session.
    ///
    /// Returns `true` if the application should quit.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn start(&mut self) -> Result<bool, D::Error> {
        let actions = self.app.start();
        if self.process_actions(actions).await? {
            return Ok(true);
        }
        if let Some(user_id) = self.user_id.take() {
            let actions = self.app.handle(AppEvent::SessionStarted { user_id });
            return self.process_actions(actions).await;
        }
        Ok(false)
    }

    /// Process one cycle of the event loop.
    ///
    /// Returns `true` if the application should quit.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn process_cycle(&mut self) -> Result<bool, D::Error> {
        let actions = self.driver.poll_event(&mut self.app).await?;
        if !actions.is_empty() && self.process_actions(actions).await? {
            return Ok(true);
        }

        while let Some(event) = self.driver.recv_event().await {
            let actions = self.app.handle(event);
            if self.process_actions(actions).await? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Execute actions returned by the App.
    ///
    /// Returns `true` if should quit.
    async fn process_actions(&mut self, actions: Vec<AppAction>) -> Result<bool, D::Error> {
        for action in actions {
            match action {
                AppAction::Render => self.driver.render(&self.app)?,
                AppAction::Quit => return Ok(true),
                AppAction::Subscribe(subscription) => self.driver.subscribe(subscription).await?,
                AppAction::Unsubscribe(subscription) => {
                    self.driver.unsubscribe(subscription).await?;
                },
                AppAction::FetchHistory { conversation_id, generation } => {
                    self.driver.fetch_history(conversation_id, generation).await?;
                },
                AppAction::FetchConversation { conversation_id, generation } => {
                    self.driver.fetch_conversation(conversation_id, generation).await?;
                },
                AppAction::FetchConversations { user_id } => {
                    self.driver.fetch_conversations(user_id).await?;
                },
                AppAction::SendMessage(message) => self.driver.send_message(message).await?,
            }
        }
        Ok(false)
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a mutable reference to the App
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    /// Get a reference to the Driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Get a reference to the Environment
    pub fn env(&self) -> &E {
        &self.env
    }
}
