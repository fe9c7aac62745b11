//! Session history and the observable current location.
//!
//! [`Navigator`] is the single source of truth for where the app is. It
//! behaves like browser session history: `navigate` pushes an entry and drops
//! anything forward of the cursor, `back` and `forward` move the cursor.
//! Every change is published on a `tokio::sync::watch` channel so any number
//! of views can observe the location without reading ambient state.
//!
//! Query strings and fragments are not part of routing and are stripped on
//! entry.

use tokio::sync::watch;

/// How the current entry was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    /// Initial location.
    Initial,
    /// New entry pushed by `navigate`.
    Push,
    /// History moved one entry back.
    Back,
    /// History moved one entry forward.
    Forward,
}

/// Snapshot of the current location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Normalized path (no query or fragment).
    pub path: String,
    /// Position in session history.
    pub index: usize,
    /// Monotonic navigation counter. Increments on every change.
    pub seq: u64,
    /// How this location was reached.
    pub kind: NavigationKind,
}

/// Observable session history.
#[derive(Debug)]
pub struct Navigator {
    entries: Vec<String>,
    cursor: usize,
    seq: u64,
    tx: watch::Sender<Location>,
}

impl Navigator {
    /// Create history with a single entry.
    pub fn new(initial: &str) -> Self {
        let path = normalize(initial);
        let location =
            Location { path: path.clone(), index: 0, seq: 0, kind: NavigationKind::Initial };
        let (tx, _rx) = watch::channel(location);
        Self { entries: vec![path], cursor: 0, seq: 0, tx }
    }

    /// Current path.
    pub fn current(&self) -> &str {
        // Cursor always indexes a live entry
        self.entries.get(self.cursor).map_or("/", String::as_str)
    }

    /// Current location snapshot.
    pub fn location(&self) -> Location {
        self.tx.borrow().clone()
    }

    /// Observe location changes.
    pub fn subscribe(&self) -> watch::Receiver<Location> {
        self.tx.subscribe()
    }

    /// Push `path` as a new history entry and make it current.
    ///
    /// Forward entries beyond the cursor are discarded, as with
    /// `history.pushState`.
    pub fn navigate(&mut self, path: &str) -> Location {
        let path = normalize(path);
        self.entries.truncate(self.cursor + 1);
        self.entries.push(path);
        self.cursor = self.entries.len() - 1;
        self.publish(NavigationKind::Push)
    }

    /// Move one entry back. Returns `None` when there is no prior entry; the
    /// caller decides what that means (for example, exiting).
    pub fn back(&mut self) -> Option<Location> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.publish(NavigationKind::Back))
    }

    /// Move one entry forward. Returns `None` at the newest entry.
    pub fn forward(&mut self) -> Option<Location> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.publish(NavigationKind::Forward))
    }

    /// True if `back` would move.
    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    /// True if `forward` would move.
    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Number of entries in session history.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: history holds at least the initial entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn publish(&mut self, kind: NavigationKind) -> Location {
        self.seq += 1;
        let location = Location {
            path: self.current().to_string(),
            index: self.cursor,
            seq: self.seq,
            kind,
        };
        tracing::debug!(path = %location.path, index = location.index, ?kind, "location changed");
        self.tx.send_replace(location.clone());
        location
    }
}

/// Strip query and fragment; guarantee a leading `/`.
pub fn normalize(path: &str) -> String {
    let bare = path.split(['?', '#']).next().unwrap_or_default();
    if bare.starts_with('/') { bare.to_string() } else { format!("/{bare}") }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigate_pushes_and_publishes() {
        let mut nav = Navigator::new("/");
        let rx = nav.subscribe();

        let loc = nav.navigate("/messages/42");
        assert_eq!(loc.path, "/messages/42");
        assert_eq!(loc.kind, NavigationKind::Push);
        assert_eq!(rx.borrow().path, "/messages/42");
        assert_eq!(nav.len(), 2);
    }

    #[test]
    fn back_at_first_entry_reports_none() {
        let mut nav = Navigator::new("/");
        assert!(nav.back().is_none());
        assert_eq!(nav.current(), "/");
    }

    #[test]
    fn back_then_navigate_drops_forward_entries() {
        let mut nav = Navigator::new("/");
        nav.navigate("/messages");
        nav.navigate("/messages/1");
        assert_eq!(nav.back().map(|l| l.path), Some("/messages".to_string()));
        assert!(nav.can_go_forward());

        nav.navigate("/listing/3");
        assert!(!nav.can_go_forward());
        assert_eq!(nav.len(), 3);
        assert!(nav.forward().is_none());
    }

    #[test]
    fn forward_after_back() {
        let mut nav = Navigator::new("/");
        nav.navigate("/messages");
        nav.back();
        let loc = nav.forward().unwrap();
        assert_eq!(loc.path, "/messages");
        assert_eq!(loc.kind, NavigationKind::Forward);
    }

    #[test]
    fn query_and_fragment_are_stripped() {
        assert_eq!(normalize("/messages/4?tab=all#end"), "/messages/4");
        assert_eq!(normalize("messages"), "/messages");
        assert_eq!(normalize("?q=1"), "/");
    }

    #[test]
    fn seq_is_monotonic() {
        let mut nav = Navigator::new("/");
        let a = nav.navigate("/a").seq;
        let b = nav.back().unwrap().seq;
        let c = nav.forward().unwrap().seq;
        assert!(a < b && b < c);
    }

    #[tokio::test]
    async fn observer_wakes_on_change() {
        let mut nav = Navigator::new("/");
        let mut rx = nav.subscribe();
        nav.navigate("/messages");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().path, "/messages");
    }
}
