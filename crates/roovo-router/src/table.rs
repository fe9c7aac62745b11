//! Ordered route table with first-match-wins resolution.
//!
//! Routes are registered once, in order, and never change afterwards. On
//! every navigation the table is scanned front to back and the first pattern
//! that matches the whole path is selected. Overlapping patterns are
//! resolved purely by registration order, never by specificity.

use crate::{
    error::{ParamsError, PatternError},
    pattern::{Captures, RoutePattern},
};

/// A registered (pattern, view) pair.
#[derive(Debug, Clone)]
pub struct RouteEntry<V> {
    pattern: RoutePattern,
    view: V,
}

impl<V> RouteEntry<V> {
    /// Compiled pattern.
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// View registered for the pattern.
    pub fn view(&self) -> &V {
        &self.view
    }
}

/// Result of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a, V> {
    /// Position of the winning entry in registration order.
    pub index: usize,
    /// Pattern that matched.
    pub pattern: &'a RoutePattern,
    /// View registered for the pattern.
    pub view: &'a V,
    /// Captured parameter values.
    pub captures: Captures,
}

/// Immutable, ordered list of routes.
#[derive(Debug, Clone)]
pub struct RouteTable<V> {
    entries: Vec<RouteEntry<V>>,
}

impl<V> RouteTable<V> {
    /// Start building a table.
    pub fn builder() -> RouteTableBuilder<V> {
        RouteTableBuilder { entries: Vec::new(), error: None }
    }

    /// Select the first route whose pattern matches `path`.
    ///
    /// `None` is the defined no-route state: nothing is rendered.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_, V>> {
        self.entries.iter().enumerate().find_map(|(index, entry)| {
            entry.pattern.matches(path).map(|captures| RouteMatch {
                index,
                pattern: &entry.pattern,
                view: &entry.view,
                captures,
            })
        })
    }

    /// Registered entries in order.
    pub fn entries(&self) -> &[RouteEntry<V>] {
        &self.entries
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no routes are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Typed view factory: decodes captures into a route value.
pub type RouteFactory<R> = fn(&Captures) -> Result<R, ParamsError>;

/// Outcome of resolving a path against a table of [`RouteFactory`] values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<R> {
    /// A pattern matched and its captures decoded.
    Matched {
        /// Decoded route
        route: R,
        /// Raw captures in positional order
        captures: Captures,
    },
    /// No pattern matched.
    NoRoute,
    /// The first matching pattern's captures failed to decode.
    ///
    /// Matching stops at the first pattern regardless, so a later pattern is
    /// never tried instead.
    Rejected {
        /// Pattern that matched
        pattern: String,
        /// Decode failure
        error: ParamsError,
    },
}

impl<R> Resolution<R> {
    /// Decoded route, if any.
    pub fn route(&self) -> Option<&R> {
        match self {
            Self::Matched { route, .. } => Some(route),
            Self::NoRoute | Self::Rejected { .. } => None,
        }
    }
}

impl<R> RouteTable<RouteFactory<R>> {
    /// Resolve `path` and decode the winning captures into `R`.
    pub fn decode(&self, path: &str) -> Resolution<R> {
        match self.resolve(path) {
            None => Resolution::NoRoute,
            Some(m) => match (m.view)(&m.captures) {
                Ok(route) => Resolution::Matched { route, captures: m.captures },
                Err(error) => {
                    tracing::debug!(pattern = %m.pattern, %path, %error, "route params rejected");
                    Resolution::Rejected { pattern: m.pattern.as_str().to_string(), error }
                },
            },
        }
    }
}

/// Builder that records the first malformed pattern.
///
/// Registration keeps chaining after an error so call sites stay a single
/// expression; [`RouteTableBuilder::build`] reports the error.
#[derive(Debug)]
pub struct RouteTableBuilder<V> {
    entries: Vec<RouteEntry<V>>,
    error: Option<PatternError>,
}

impl<V> RouteTableBuilder<V> {
    /// Register `pattern` after all previously registered routes.
    #[must_use]
    pub fn route(mut self, pattern: &str, view: V) -> Self {
        if self.error.is_some() {
            return self;
        }
        match RoutePattern::parse(pattern) {
            Ok(pattern) => self.entries.push(RouteEntry { pattern, view }),
            Err(e) => self.error = Some(e),
        }
        self
    }

    /// Finish registration.
    pub fn build(self) -> Result<RouteTable<V>, PatternError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(RouteTable { entries: self.entries }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(patterns: &[&'static str]) -> RouteTable<&'static str> {
        patterns
            .iter()
            .fold(RouteTable::builder(), |b, p| b.route(p, *p))
            .build()
            .unwrap()
    }

    #[test]
    fn messages_scenario() {
        let routes = table(&["/messages", "/messages/:id"]);

        let m = routes.resolve("/messages/42").unwrap();
        assert_eq!(*m.view, "/messages/:id");
        assert_eq!(m.captures.as_slice(), ["42"]);

        let m = routes.resolve("/messages").unwrap();
        assert_eq!(*m.view, "/messages");
        assert!(m.captures.is_empty());
    }

    #[test]
    fn no_match_is_none() {
        let routes = table(&["/", "/listing/:id"]);
        assert!(routes.resolve("/nowhere").is_none());
        assert!(routes.resolve("/listing").is_none());
    }

    #[test]
    fn first_registered_wins_on_overlap() {
        let routes = table(&["/listing/:id", "/listing/new"]);
        assert_eq!(routes.resolve("/listing/new").unwrap().index, 0);

        let routes = table(&["/listing/new", "/listing/:id"]);
        assert_eq!(routes.resolve("/listing/new").unwrap().index, 0);
        assert_eq!(*routes.resolve("/listing/new").unwrap().view, "/listing/new");
    }

    #[test]
    fn builder_reports_first_error() {
        let result = RouteTable::builder().route("/", 0).route("/bad/:", 1).route("nope", 2).build();
        assert!(matches!(result, Err(PatternError::UnnamedParameter { .. })));
    }

    #[derive(Debug, PartialEq)]
    enum Page {
        Listing(u64),
    }

    fn listing(c: &Captures) -> Result<Page, ParamsError> {
        Ok(Page::Listing(c.parse("id")?))
    }

    #[test]
    fn decode_typed_route() {
        let routes: RouteTable<RouteFactory<Page>> =
            RouteTable::builder().route("/listing/:id", listing as RouteFactory<Page>).build().unwrap();

        assert_eq!(routes.decode("/listing/9").route(), Some(&Page::Listing(9)));
        assert!(matches!(routes.decode("/listing/x"), Resolution::Rejected { .. }));
        assert_eq!(routes.decode("/"), Resolution::NoRoute);
    }
}
