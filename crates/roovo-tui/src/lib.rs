//! Terminal UI for Roovo messaging.
//!
//! A thin shell over [`roovo_app::Driver`] that provides terminal-specific
//! I/O and the backend link. All orchestration logic lives in the generic
//! [`roovo_app::Runtime`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod remote;
pub mod system_env;
pub mod terminal;
pub mod ui;

pub use remote::Remote;
pub use system_env::SystemEnv;
pub use terminal::{TerminalDriver, TerminalError};
