//! Error types for route registration and parameter decoding.
//!
//! Pattern errors are configuration mistakes caught when the route table is
//! built; they are never produced while matching. Parameter errors come from
//! typed decoding after a pattern has already matched.

use thiserror::Error;

/// A route pattern could not be compiled.
///
/// Always a programming mistake in the static route list. Startup should halt
/// rather than run with a partially registered table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// Pattern is empty.
    #[error("route pattern is empty")]
    Empty,

    /// Pattern does not start with `/`.
    #[error("route pattern {pattern:?} must start with '/'")]
    MissingLeadingSlash {
        /// Offending pattern
        pattern: String,
    },

    /// Pattern contains an empty segment (`//` or trailing `/`).
    #[error("route pattern {pattern:?} has an empty segment at position {position}")]
    EmptySegment {
        /// Offending pattern
        pattern: String,
        /// Zero-based segment index
        position: usize,
    },

    /// Parameter marker without a name (`/:`).
    #[error("route pattern {pattern:?} has a parameter marker without a name")]
    UnnamedParameter {
        /// Offending pattern
        pattern: String,
    },

    /// Parameter name contains characters outside `[A-Za-z0-9_]`.
    #[error("route pattern {pattern:?} has invalid parameter name {name:?}")]
    InvalidParameterName {
        /// Offending pattern
        pattern: String,
        /// Name as written
        name: String,
    },

    /// Parameter marker appears inside a literal segment (`/a:b`).
    #[error("route pattern {pattern:?} has a parameter marker inside segment {segment:?}")]
    MisplacedMarker {
        /// Offending pattern
        pattern: String,
        /// Segment containing the marker
        segment: String,
    },

    /// Two parameters share a name.
    #[error("route pattern {pattern:?} declares parameter {name:?} twice")]
    DuplicateParameter {
        /// Offending pattern
        pattern: String,
        /// Repeated name
        name: String,
    },
}

/// Captured parameters could not be decoded into a typed route.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamsError {
    /// The pattern has no parameter with this name.
    #[error("no parameter named {name:?}")]
    Missing {
        /// Requested name
        name: String,
    },

    /// The captured value does not parse as the requested type.
    #[error("parameter {name:?} has invalid value {value:?}: {reason}")]
    Invalid {
        /// Parameter name
        name: String,
        /// Raw captured value
        value: String,
        /// Parser message
        reason: String,
    },
}
