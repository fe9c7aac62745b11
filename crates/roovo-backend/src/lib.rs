//! Backend clients for the Roovo chat service.
//!
//! Two channels reach the backend: fixed REST calls ([`RestClient`]) and a
//! push subscription over a websocket ([`RealtimeClient`]). Neither retries;
//! callers decide what a failure means.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod error;
pub mod realtime;
mod rest;

pub use config::{API_BASE_URL_ENV, BackendConfig, DEFAULT_API_BASE_URL, REALTIME_VSN};
pub use error::{BackendError, RealtimeError};
pub use realtime::{Channel, RealtimeClient, RealtimeEvent};
pub use rest::RestClient;
