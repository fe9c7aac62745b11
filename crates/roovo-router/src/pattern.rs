//! Route pattern compilation and matching.
//!
//! A pattern is a `/`-separated list of segments. A segment written as
//! `:name` is a parameter: it matches exactly one non-empty path segment and
//! captures it. Every other segment must match byte-for-byte. Matching is
//! anchored at both ends, case-sensitive, and has no wildcards or optional
//! segments.

use std::{fmt, str::FromStr};

use crate::error::{ParamsError, PatternError};

/// Prefix that marks a parameter segment.
pub const PARAM_MARKER: char = ':';

/// One compiled segment of a [`RoutePattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the path segment exactly.
    Literal(String),
    /// Matches any single non-empty path segment.
    Param(String),
}

/// A compiled, anchored route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    source: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Compile a pattern such as `/messages/:id`.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }
        let Some(rest) = pattern.strip_prefix('/') else {
            return Err(PatternError::MissingLeadingSlash { pattern: pattern.to_string() });
        };

        let mut segments = Vec::new();
        if !rest.is_empty() {
            for (position, raw) in rest.split('/').enumerate() {
                segments.push(Self::parse_segment(pattern, position, raw)?);
            }
        }

        let mut seen: Vec<&str> = Vec::new();
        for segment in &segments {
            if let Segment::Param(name) = segment {
                if seen.contains(&name.as_str()) {
                    return Err(PatternError::DuplicateParameter {
                        pattern: pattern.to_string(),
                        name: name.clone(),
                    });
                }
                seen.push(name);
            }
        }

        Ok(Self { source: pattern.to_string(), segments })
    }

    fn parse_segment(pattern: &str, position: usize, raw: &str) -> Result<Segment, PatternError> {
        if raw.is_empty() {
            return Err(PatternError::EmptySegment { pattern: pattern.to_string(), position });
        }

        match raw.strip_prefix(PARAM_MARKER) {
            Some("") => Err(PatternError::UnnamedParameter { pattern: pattern.to_string() }),
            Some(name) => {
                if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    Ok(Segment::Param(name.to_string()))
                } else {
                    Err(PatternError::InvalidParameterName {
                        pattern: pattern.to_string(),
                        name: name.to_string(),
                    })
                }
            },
            None if raw.contains(PARAM_MARKER) => Err(PatternError::MisplacedMarker {
                pattern: pattern.to_string(),
                segment: raw.to_string(),
            }),
            None => Ok(Segment::Literal(raw.to_string())),
        }
    }

    /// Pattern text as registered.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Compiled segments in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Parameter names in declaration order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Match a full path. Returns captures in positional order, or `None`.
    pub fn matches(&self, path: &str) -> Option<Captures> {
        let rest = path.strip_prefix('/')?;
        let parts: Vec<&str> = if rest.is_empty() { Vec::new() } else { rest.split('/').collect() };

        if parts.len() != self.segments.len() {
            return None;
        }

        let mut captures = Captures::default();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {},
                Segment::Param(name) if !part.is_empty() => {
                    captures.push(name, part);
                },
                _ => return None,
            }
        }
        Some(captures)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for RoutePattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parameter values captured by a successful match.
///
/// Values are positional: the first value belongs to the first parameter
/// marker in the pattern. Names are kept alongside so typed decoders can
/// look values up by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures {
    names: Vec<String>,
    values: Vec<String>,
}

impl Captures {
    fn push(&mut self, name: &str, value: &str) {
        self.names.push(name.to_string());
        self.values.push(value.to_string());
    }

    /// Number of captured values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the pattern had no parameters.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Captured value at `index`.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// Captured value for the parameter `name`.
    pub fn named(&self, name: &str) -> Option<&str> {
        self.names.iter().position(|n| n == name).and_then(|i| self.get(i))
    }

    /// Captured values in positional order.
    pub fn as_slice(&self) -> &[String] {
        &self.values
    }

    /// Decode the parameter `name` with [`FromStr`].
    pub fn parse<T>(&self, name: &str) -> Result<T, ParamsError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let value =
            self.named(name).ok_or_else(|| ParamsError::Missing { name: name.to_string() })?;
        value.parse().map_err(|e: T::Err| ParamsError::Invalid {
            name: name.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_matches_only_root() {
        let pattern = RoutePattern::parse("/").unwrap();
        assert!(pattern.matches("/").is_some());
        assert!(pattern.matches("/messages").is_none());
        assert!(pattern.matches("").is_none());
    }

    #[test]
    fn literal_match_is_anchored_and_case_sensitive() {
        let pattern = RoutePattern::parse("/messages").unwrap();
        assert!(pattern.matches("/messages").is_some());
        assert!(pattern.matches("/Messages").is_none());
        assert!(pattern.matches("/messages/").is_none());
        assert!(pattern.matches("/messages/42").is_none());
        assert!(pattern.matches("/x/messages").is_none());
    }

    #[test]
    fn parameter_captures_one_segment() {
        let pattern = RoutePattern::parse("/messages/:id").unwrap();
        let captures = pattern.matches("/messages/42").unwrap();
        assert_eq!(captures.as_slice(), ["42"]);
        assert_eq!(captures.named("id"), Some("42"));

        assert!(pattern.matches("/messages/").is_none());
        assert!(pattern.matches("/messages/42/extra").is_none());
    }

    #[test]
    fn captures_are_positional() {
        let pattern = RoutePattern::parse("/host/:host/listing/:listing").unwrap();
        let captures = pattern.matches("/host/abc/listing/7").unwrap();
        assert_eq!(captures.as_slice(), ["abc", "7"]);
        assert_eq!(pattern.param_names().collect::<Vec<_>>(), ["host", "listing"]);
    }

    #[test]
    fn typed_parse() {
        let pattern = RoutePattern::parse("/listing/:id").unwrap();
        let captures = pattern.matches("/listing/12").unwrap();
        assert_eq!(captures.parse::<u64>("id"), Ok(12));

        let captures = pattern.matches("/listing/abc").unwrap();
        assert!(matches!(captures.parse::<u64>("id"), Err(ParamsError::Invalid { .. })));
        assert!(matches!(captures.parse::<u64>("slug"), Err(ParamsError::Missing { .. })));
    }

    #[test]
    fn malformed_patterns_are_rejected() {
        assert_eq!(RoutePattern::parse(""), Err(PatternError::Empty));
        assert!(matches!(
            RoutePattern::parse("messages"),
            Err(PatternError::MissingLeadingSlash { .. })
        ));
        assert!(matches!(
            RoutePattern::parse("/messages/:"),
            Err(PatternError::UnnamedParameter { .. })
        ));
        assert!(matches!(
            RoutePattern::parse("/messages//x"),
            Err(PatternError::EmptySegment { position: 1, .. })
        ));
        assert!(matches!(
            RoutePattern::parse("/messages/"),
            Err(PatternError::EmptySegment { .. })
        ));
        assert!(matches!(
            RoutePattern::parse("/a:b"),
            Err(PatternError::MisplacedMarker { .. })
        ));
        assert!(matches!(
            RoutePattern::parse("/:id/:id"),
            Err(PatternError::DuplicateParameter { .. })
        ));
        assert!(matches!(
            RoutePattern::parse("/:id-x"),
            Err(PatternError::InvalidParameterName { .. })
        ));
    }
}
