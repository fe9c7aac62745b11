//! Identifier newtypes.
//!
//! Server-assigned ids are integers; users are opaque strings issued by the
//! auth service. Locally generated message ids are [`TempId`]s and never
//! collide with server ids because [`MessageId`] keeps the two apart.

use std::{fmt, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

/// Opaque user identifier from the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap a raw user id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                lenient_u64(deserializer).map(Self)
            }
        }
    };
}

numeric_id!(
    /// Server-assigned conversation id.
    ConversationId
);

numeric_id!(
    /// Server-assigned listing id.
    ListingId
);

/// Accept an integer either as a JSON number or a numeric string.
///
/// Bigint columns arrive as numbers over REST but may be strings in
/// realtime payloads.
pub(crate) fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

/// Client-generated temporary message id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TempId(String);

impl TempId {
    /// Wrap an arbitrary token. Callers must keep it unique per conversation.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Format 128 random bits as a UUID-shaped token.
    pub fn from_random(bits: u128) -> Self {
        let hex = format!("{bits:032x}");
        Self(format!(
            "{}-{}-{}-{}-{}",
            &hex[0..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..20],
            &hex[20..32]
        ))
    }

    /// Raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TempId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a rendered message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageId {
    /// Id assigned by the server on insert.
    Persisted(u64),
    /// Local id of an optimistic entry not yet confirmed.
    Temporary(TempId),
}

impl MessageId {
    /// True for server-assigned ids.
    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted(_))
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Persisted(id) => write!(f, "{id}"),
            Self::Temporary(id) => write!(f, "{id}"),
        }
    }
}

impl From<TempId> for MessageId {
    fn from(id: TempId) -> Self {
        Self::Temporary(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_id_is_uuid_shaped() {
        let id = TempId::from_random(0x0123_4567_89ab_cdef_0011_2233_4455_6677);
        assert_eq!(id.as_str(), "01234567-89ab-cdef-0011-223344556677");
    }

    #[test]
    fn numeric_ids_accept_strings() {
        let id: ConversationId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(id, ConversationId(42));
        let id: ConversationId = serde_json::from_str("42").unwrap();
        assert_eq!(id, ConversationId(42));
        assert!(serde_json::from_str::<ConversationId>("\"x\"").is_err());
    }

    #[test]
    fn temporary_and_persisted_never_equal() {
        assert_ne!(MessageId::Persisted(1), MessageId::Temporary(TempId::new("1")));
    }
}
