//! Client-side routing for Roovo.
//!
//! A static, ordered list of path patterns is matched against the current
//! location; the first match wins and its captures are decoded into a typed
//! route. The current location lives in an observable [`Navigator`].
//!
//! # Components
//!
//! - [`RoutePattern`]: anchored segment matcher with `:name` parameters
//! - [`RouteTable`]: ordered first-match resolution
//! - [`Navigator`]: session history with back/forward and change notification

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod navigator;
mod pattern;
mod table;

pub use error::{ParamsError, PatternError};
pub use navigator::{Location, NavigationKind, Navigator, normalize};
pub use pattern::{Captures, PARAM_MARKER, RoutePattern, Segment};
pub use table::{Resolution, RouteEntry, RouteFactory, RouteMatch, RouteTable, RouteTableBuilder};
