//! Realtime push subscriptions over a Phoenix-channel websocket.

mod client;
mod protocol;

pub use client::{RealtimeClient, RealtimeEvent};
pub use protocol::{Channel, Incoming, PHOENIX_TOPIC, PhoenixMessage};
