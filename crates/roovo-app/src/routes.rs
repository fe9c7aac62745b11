//! The application's route table.
//!
//! Order matters: resolution is first-match, so `/messages` is listed before
//! `/messages/:id` only for readability; the two never overlap.

use std::fmt;

use roovo_chat::{ConversationId, ListingId};
use roovo_router::{Captures, ParamsError, PatternError, RouteFactory, RouteTable};

/// A decoded location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Listing search and featured listings.
    Home,
    /// A single listing.
    Listing {
        /// Listing shown.
        id: ListingId,
    },
    /// Conversation list.
    Inbox,
    /// A single conversation.
    Conversation {
        /// Conversation shown.
        id: ConversationId,
    },
}

impl Route {
    /// Canonical path for this route.
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Listing { id } => format!("/listing/{id}"),
            Self::Inbox => "/messages".to_string(),
            Self::Conversation { id } => format!("/messages/{id}"),
        }
    }

    /// True for routes that need a signed-in user.
    pub fn requires_session(&self) -> bool {
        matches!(self, Self::Inbox | Self::Conversation { .. })
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

fn home(_: &Captures) -> Result<Route, ParamsError> {
    Ok(Route::Home)
}

fn listing(captures: &Captures) -> Result<Route, ParamsError> {
    Ok(Route::Listing { id: captures.parse("id")? })
}

fn inbox(_: &Captures) -> Result<Route, ParamsError> {
    Ok(Route::Inbox)
}

fn conversation(captures: &Captures) -> Result<Route, ParamsError> {
    Ok(Route::Conversation { id: captures.parse("id")? })
}

/// Build the application route table.
///
/// # Errors
///
/// Returns the first malformed pattern. The table is static, so this only
/// fails if the source is edited incorrectly.
pub fn route_table() -> Result<RouteTable<RouteFactory<Route>>, PatternError> {
    RouteTable::<RouteFactory<Route>>::builder()
        .route("/", home)
        .route("/listing/:id", listing)
        .route("/messages", inbox)
        .route("/messages/:id", conversation)
        .build()
}

/// Whether the bottom navigation bar is shown at `path`.
///
/// Listing detail pages use the full screen.
pub fn shows_bottom_nav(path: &str) -> bool {
    !path.starts_with("/listing/")
}

#[cfg(test)]
mod tests {
    use roovo_router::Resolution;

    use super::*;

    #[test]
    fn decodes_every_route() {
        let table = route_table().unwrap();
        let cases = [
            ("/", Route::Home),
            ("/listing/7", Route::Listing { id: ListingId(7) }),
            ("/messages", Route::Inbox),
            ("/messages/42", Route::Conversation { id: ConversationId(42) }),
        ];
        for (path, expected) in cases {
            assert_eq!(table.decode(path).route(), Some(&expected), "{path}");
            assert_eq!(expected.path(), path);
        }
    }

    #[test]
    fn non_numeric_id_is_rejected() {
        let table = route_table().unwrap();
        assert!(matches!(table.decode("/messages/abc"), Resolution::Rejected { .. }));
        assert_eq!(table.decode("/bookings"), Resolution::NoRoute);
    }

    #[test]
    fn bottom_nav_hidden_on_listing() {
        assert!(shows_bottom_nav("/"));
        assert!(shows_bottom_nav("/messages/1"));
        assert!(!shows_bottom_nav("/listing/1"));
    }
}
