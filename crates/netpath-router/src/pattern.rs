//! Route pattern parsing and path matching.
//!
//! A pattern and a request path are both split on `/`. They match when they
//! have the same number of segments, every literal segment equals the path
//! segment at that position (case-sensitive, byte-for-byte), and every
//! parameter segment binds whatever sits at its position.

use std::cmp::Ordering;

use crate::error::RouteError;
use crate::params::Params;

/// Leading character marking a parameter segment.
pub const PARAM_SENTINEL: char = ':';

/// One `/`-separated piece of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the path segment exactly.
    Literal(String),
    /// Binds the path segment under this name.
    Param(String),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        match raw.strip_prefix(PARAM_SENTINEL) {
            Some(name) => Self::Param(name.to_owned()),
            None => Self::Literal(raw.to_owned()),
        }
    }

    /// Returns true for a parameter segment.
    #[must_use]
    pub fn is_param(&self) -> bool {
        matches!(self, Self::Param(_))
    }
}

/// A parsed route pattern such as `/users/:id`.
///
/// Two patterns are equal when their source strings are equal; `/a/:x` and
/// `/a/:y` are different patterns even though they accept the same paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
    param_count: usize,
}

impl Pattern {
    /// Parses a pattern.
    ///
    /// # Errors
    ///
    /// Fails when the pattern does not start with `/`, contains a bare `:`
    /// segment, or names the same parameter twice.
    pub fn parse(raw: impl Into<String>) -> Result<Self, RouteError> {
        let raw = raw.into();
        if !raw.starts_with('/') {
            return Err(RouteError::MissingLeadingSlash { pattern: raw });
        }

        let segments: Vec<Segment> = raw.split('/').map(Segment::parse).collect();

        let mut names: Vec<&str> = Vec::new();
        for segment in &segments {
            if let Segment::Param(name) = segment {
                if name.is_empty() {
                    return Err(RouteError::EmptyParamName { pattern: raw });
                }
                if names.contains(&name.as_str()) {
                    return Err(RouteError::DuplicateParam {
                        name: name.clone(),
                        pattern: raw.clone(),
                    });
                }
                names.push(name);
            }
        }
        let param_count = names.len();

        Ok(Self {
            raw,
            segments,
            param_count,
        })
    }

    /// The verbatim pattern string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed segments, including the empty one before the leading `/`.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Parameter names in the order they appear.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Matches a request path, returning the bound parameters on success.
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<Params> {
        let mut parts = path.split('/');
        let mut params = Params::with_capacity(self.param_count);

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(literal) if literal != part => return None,
                Segment::Literal(_) => {}
                Segment::Param(name) => params.push(name.as_str(), part),
            }
        }

        if parts.next().is_some() {
            return None;
        }
        Some(params)
    }

    /// Orders patterns so that, at the first position where one pattern has
    /// a literal and the other a parameter, the literal sorts first.
    #[must_use]
    pub fn cmp_specificity(&self, other: &Self) -> Ordering {
        self.segments
            .iter()
            .map(Segment::is_param)
            .cmp(other.segments.iter().map(Segment::is_param))
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::str::FromStr for Pattern {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Matches `path` against an unparsed `pattern`.
///
/// Malformed patterns never match.
///
/// ```rust
/// use netpath_router::match_pattern;
///
/// let params = match_pattern("/users/:id", "/users/42").unwrap();
/// assert_eq!(params.get("id"), Some("42"));
///
/// assert!(match_pattern("/users/:id", "/users/42/posts").is_none());
/// ```
#[must_use]
pub fn match_pattern(pattern: &str, path: &str) -> Option<Params> {
    Pattern::parse(pattern).ok()?.matches(path)
}
