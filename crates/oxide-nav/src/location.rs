//! Location snapshots and change requests.

use oxide_route::{SearchParams, parse_search};
use serde::Serialize;
use serde_json::Value;

/// An immutable snapshot of the current location.
///
/// `value` is `pathname + search + hash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    /// The full location string.
    pub value: String,
    /// Application state attached to the history entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
}

impl Location {
    /// Creates a location without state.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            state: None,
        }
    }

    /// Attaches state.
    #[must_use]
    pub fn with_state(mut self, state: Option<Value>) -> Self {
        self.state = state;
        self
    }

    fn split(&self) -> (&str, &str, &str) {
        let (rest, hash) = self
            .value
            .find('#')
            .map_or((self.value.as_str(), ""), |i| self.value.split_at(i));
        let (path, search) = rest.find('?').map_or((rest, ""), |i| rest.split_at(i));
        (path, search, hash)
    }

    /// Returns the path part.
    #[must_use]
    pub fn pathname(&self) -> &str {
        self.split().0
    }

    /// Returns the query string including its `?`, or `""`.
    #[must_use]
    pub fn search(&self) -> &str {
        self.split().1
    }

    /// Returns the fragment including its `#`, or `""`.
    #[must_use]
    pub fn hash(&self) -> &str {
        self.split().2
    }

    /// Decodes the query string.
    #[must_use]
    pub fn query(&self) -> SearchParams {
        parse_search(self.search())
    }
}

/// A request to change the history location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationChange {
    /// The target location string.
    pub value: String,
    /// Replace the current entry instead of pushing a new one.
    pub replace: bool,
    /// Scroll to the target's hash (or top) after the change.
    pub scroll: bool,
    /// State to store with the entry.
    pub state: Option<Value>,
}

impl LocationChange {
    /// A push with scrolling and no state.
    #[must_use]
    pub fn push(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            replace: false,
            scroll: true,
            state: None,
        }
    }

    /// A replace with scrolling and no state.
    #[must_use]
    pub fn replace(value: impl Into<String>) -> Self {
        Self {
            replace: true,
            ..Self::push(value)
        }
    }

    /// Sets the state.
    #[must_use]
    pub fn state(mut self, state: Value) -> Self {
        self.state = Some(state);
        self
    }

    /// Sets whether to scroll.
    #[must_use]
    pub fn scroll(mut self, scroll: bool) -> Self {
        self.scroll = scroll;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/a/b?x=1#top", "/a/b", "?x=1", "#top")]
    #[case("/a", "/a", "", "")]
    #[case("/a#h?not-query", "/a", "", "#h?not-query")]
    #[case("?q", "", "?q", "")]
    fn test_parts(
        #[case] value: &str,
        #[case] pathname: &str,
        #[case] search: &str,
        #[case] hash: &str,
    ) {
        let loc = Location::new(value);
        assert_eq!(loc.pathname(), pathname);
        assert_eq!(loc.search(), search);
        assert_eq!(loc.hash(), hash);
    }

    #[test]
    fn test_query() {
        let loc = Location::new("/s?q=a+b&t=1&t=2");
        let q = loc.query();
        assert_eq!(q["q"].first(), Some("a b"));
        assert_eq!(q["t"].values(), vec!["1", "2"]);
    }

    #[test]
    fn test_change_builders() {
        let change = LocationChange::replace("/x").scroll(false);
        assert!(change.replace);
        assert!(!change.scroll);
        assert_eq!(change.state, None);
    }
}
