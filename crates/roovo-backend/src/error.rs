//! Backend error types.

use roovo_chat::RecordError;
use thiserror::Error;

/// A REST call failed.
///
/// Callers treat every variant the same way (the request failed); the
/// variants exist for logs.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Transport failure (connect, timeout, TLS).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response.
    #[error("{url} returned {status}")]
    Status {
        /// Response status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// Response body did not decode.
    #[error("bad response body: {0}")]
    Decode(#[from] RecordError),

    /// Endpoint URL could not be built.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// The realtime connection failed.
#[derive(Error, Debug)]
pub enum RealtimeError {
    /// Websocket handshake or I/O failure.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Outgoing frame could not be encoded.
    #[error("frame encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// No realtime endpoint configured.
    #[error("realtime endpoint not configured")]
    NotConfigured,

    /// The connection task has exited.
    #[error("realtime connection closed")]
    Closed,
}
