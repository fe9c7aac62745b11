//! Application layer for the Roovo client.
//!
//! Pure state machines and generic runtime for navigation and chat
//! orchestration, enabling deterministic simulation testing with the same
//! code that runs in production.
//!
//! # Components
//!
//! - [`App`]: UI state machine (routing, view mounts, chat, input)
//! - [`Driver`]: Trait for platform-specific I/O abstraction
//! - [`Runtime`]: Generic orchestration loop using Driver
//! - [`Environment`]: Time and randomness, swappable for simulation

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
pub mod commands;
mod driver;
mod env;
mod event;
mod input;
mod routes;
mod runtime;
mod state;

pub use action::{AppAction, OutgoingMessage, Subscription};
pub use app::App;
pub use driver::Driver;
pub use env::Environment;
pub use event::AppEvent;
pub use input::{InputState, KeyInput};
pub use routes::{Route, route_table, shows_bottom_nav};
pub use runtime::{Runtime, RuntimeConfig};
pub use state::{ConversationView, View};
