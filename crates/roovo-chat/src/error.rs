//! Error types for wire record decoding.

use thiserror::Error;

/// A record from the backend could not be decoded.
///
/// Push deliveries that fail to decode are dropped by the caller. They are
/// never allowed to take down the conversation view.
#[derive(Error, Debug)]
pub enum RecordError {
    /// JSON did not match the record shape.
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Envelope is missing the record body.
    #[error("record missing field {0:?}")]
    MissingField(&'static str),
}
