//! Compiled route matchers.

use serde::Serialize;

use crate::error::{Result, RouteError};
use crate::filter::{MatchFilter, MatchFilters, match_segment};
use crate::params::Params;
use crate::pattern::{self, PathSegment};

/// The result of matching a location against a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathMatch {
    /// The portion of the location consumed by the pattern.
    pub path: String,
    /// Captured parameters.
    pub params: Params,
}

/// A pattern compiled for matching.
///
/// Literal segments match case-insensitively; dynamic values are captured
/// with their original case.
#[derive(Debug, Clone)]
pub struct Matcher {
    /// The original pattern string.
    pattern: String,
    /// Parsed main-part segments.
    segments: Vec<PathSegment>,
    /// Splat name, `Some("")` for an anonymous splat.
    splat: Option<String>,
    /// Whether the pattern may match a prefix of a longer location.
    partial: bool,
    filters: MatchFilters,
}

impl Matcher {
    /// Compiles `pattern`.
    ///
    /// In `partial` mode the pattern also matches locations with extra
    /// trailing segments; those segments are not counted in the matched
    /// [`PathMatch::path`].
    ///
    /// # Errors
    ///
    /// Fails with [`RouteError::MalformedPattern`] if the pattern has more
    /// than one splat, a splat that is not the final segment, or an
    /// unexpanded optional segment.
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_route::{MatchFilters, Matcher};
    ///
    /// let matcher = Matcher::new("/users/:id", false, MatchFilters::new()).unwrap();
    /// let m = matcher.match_path("/users/42").unwrap();
    /// assert_eq!(m.params.get("id"), Some("42"));
    /// assert_eq!(m.path, "/users/42");
    /// assert!(matcher.match_path("/users/42/edit").is_none());
    /// ```
    pub fn new(pattern: &str, partial: bool, filters: MatchFilters) -> Result<Self> {
        let parsed = pattern::parse(pattern)?;
        Ok(Self {
            pattern: pattern.to_string(),
            segments: parsed.segments,
            splat: parsed.splat,
            partial,
            filters,
        })
    }

    /// Compiles `pattern` without filters for full-length matching.
    ///
    /// # Errors
    ///
    /// Fails like [`Matcher::new`] on a malformed pattern.
    pub fn exact(pattern: &str) -> Result<Self> {
        Self::new(pattern, false, MatchFilters::new())
    }

    /// Returns the original pattern string.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the splat name, if the pattern ends in a splat.
    #[must_use]
    pub fn splat(&self) -> Option<&str> {
        self.splat.as_deref()
    }

    /// Returns whether this matcher accepts longer locations.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        self.partial
    }

    /// Returns the dynamic parameter names in declaration order, splat last.
    #[must_use]
    pub fn param_names(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                PathSegment::Param(name) => Some(name.as_str()),
                PathSegment::Literal(_) => None,
            })
            .chain(self.splat.as_deref().filter(|s| !s.is_empty()))
            .collect()
    }

    fn filter(&self, name: &str) -> Option<&MatchFilter> {
        self.filters.get(name)
    }

    /// Matches a location path against this pattern.
    #[must_use]
    pub fn match_path(&self, location: &str) -> Option<PathMatch> {
        let loc_segments: Vec<&str> = location.split('/').filter(|s| !s.is_empty()).collect();
        let len = self.segments.len();
        let len_diff = loc_segments.len().checked_sub(len)?;
        if len_diff > 0 && self.splat.is_none() && !self.partial {
            return None;
        }

        let mut path = if len == 0 {
            String::from("/")
        } else {
            String::new()
        };
        let mut params = Params::new();

        for (segment, loc_segment) in self.segments.iter().zip(&loc_segments) {
            match segment {
                PathSegment::Param(name) => {
                    if !match_segment(loc_segment, self.filter(name)) {
                        return None;
                    }
                    params.insert(name.as_str(), *loc_segment);
                }
                PathSegment::Literal(literal) => {
                    if loc_segment.to_lowercase() != *literal {
                        return None;
                    }
                }
            }
            path.push('/');
            path.push_str(loc_segment);
        }

        if let Some(splat) = self.splat.as_deref().filter(|s| !s.is_empty()) {
            let remainder = loc_segments[len..].join("/");
            if !match_segment(&remainder, self.filter(splat)) {
                return None;
            }
            params.insert(splat, remainder);
        }

        Some(PathMatch { path, params })
    }

    /// Builds a location from parameters.
    ///
    /// Literal segments are emitted lower-cased. The splat is emitted only
    /// when present in `params`.
    ///
    /// # Errors
    ///
    /// Fails with [`RouteError::MissingValue`] when a dynamic parameter is
    /// absent.
    pub fn reverse(&self, params: &Params) -> Result<String> {
        let mut path = String::new();

        for segment in &self.segments {
            path.push('/');
            match segment {
                PathSegment::Literal(s) => path.push_str(s),
                PathSegment::Param(name) => path.push_str(params.get(name).ok_or_else(|| {
                    RouteError::MissingValue(format!(
                        "parameter '{name}' for pattern '{}'",
                        self.pattern
                    ))
                })?),
            }
        }

        if let Some(rest) = self
            .splat
            .as_deref()
            .filter(|s| !s.is_empty())
            .and_then(|name| params.get(name))
            .filter(|rest| !rest.is_empty())
        {
            path.push('/');
            path.push_str(rest.trim_start_matches('/'));
        }

        if path.is_empty() {
            path.push('/');
        }

        Ok(path)
    }
}
