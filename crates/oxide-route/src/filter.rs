//! Match filters restricting what a dynamic segment or splat accepts.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::error::Result;

/// A predicate over a segment value.
pub type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// A constraint on the value captured by a dynamic segment or splat.
#[derive(Clone)]
pub enum MatchFilter {
    /// Exact, case-sensitive equality.
    Literal(String),
    /// Equality with any of the listed values.
    OneOf(Vec<String>),
    /// An arbitrary predicate.
    Predicate(Predicate),
    /// A regular expression the value must satisfy.
    Pattern(Regex),
    /// A filter declaration that could not be understood. Never matches.
    Unsupported(String),
}

impl MatchFilter {
    /// Creates a literal filter.
    #[must_use]
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    /// Creates a filter accepting any of `values`.
    #[must_use]
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::OneOf(values.into_iter().map(Into::into).collect())
    }

    /// Creates a predicate filter.
    #[must_use]
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    /// Compiles a regex filter.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidFilter`](crate::RouteError::InvalidFilter)
    /// if `regex` does not compile.
    pub fn pattern(regex: &str) -> Result<Self> {
        Ok(Self::Pattern(Regex::new(regex)?))
    }

    /// Tests `input` against this filter.
    #[must_use]
    pub fn matches(&self, input: &str) -> bool {
        match self {
            Self::Literal(value) => value == input,
            Self::OneOf(values) => values.iter().any(|v| v == input),
            Self::Predicate(f) => f(input),
            Self::Pattern(regex) => regex.is_match(input),
            Self::Unsupported(_) => false,
        }
    }
}

impl fmt::Debug for MatchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::OneOf(values) => f.debug_tuple("OneOf").field(values).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
            Self::Pattern(regex) => f.debug_tuple("Pattern").field(&regex.as_str()).finish(),
            Self::Unsupported(what) => f.debug_tuple("Unsupported").field(what).finish(),
        }
    }
}

impl From<&str> for MatchFilter {
    fn from(value: &str) -> Self {
        Self::literal(value)
    }
}

impl From<Vec<&str>> for MatchFilter {
    fn from(values: Vec<&str>) -> Self {
        Self::one_of(values)
    }
}

impl From<Regex> for MatchFilter {
    fn from(regex: Regex) -> Self {
        Self::Pattern(regex)
    }
}

/// Filters keyed by parameter (or splat) name.
pub type MatchFilters = HashMap<String, MatchFilter>;

/// Tests a segment against an optional filter. An absent filter accepts
/// anything.
#[must_use]
pub fn match_segment(input: &str, filter: Option<&MatchFilter>) -> bool {
    filter.is_none_or(|f| f.matches(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_filter_matches_anything() {
        assert!(match_segment("anything", None));
        assert!(match_segment("", None));
    }

    #[test]
    fn test_literal_is_case_sensitive() {
        let filter = MatchFilter::literal("Edit");
        assert!(filter.matches("Edit"));
        assert!(!filter.matches("edit"));
    }

    #[test]
    fn test_one_of() {
        let filter = MatchFilter::from(vec!["json", "xml"]);
        assert!(filter.matches("xml"));
        assert!(!filter.matches("yaml"));
    }

    #[test]
    fn test_predicate() {
        let filter = MatchFilter::predicate(|s| s.len() == 3);
        assert!(filter.matches("abc"));
        assert!(!filter.matches("abcd"));
    }

    #[test]
    fn test_pattern() {
        let filter = MatchFilter::pattern(r"^\d+$").unwrap();
        assert!(filter.matches("42"));
        assert!(!filter.matches("4x2"));
    }

    #[test]
    fn test_invalid_regex_is_an_error() {
        assert!(MatchFilter::pattern("(").is_err());
    }

    #[test]
    fn test_unsupported_fails_closed() {
        let filter = MatchFilter::Unsupported("42".to_string());
        assert!(!filter.matches("42"));
        assert!(!match_segment("", Some(&filter)));
    }
}
