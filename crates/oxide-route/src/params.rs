//! Parameters captured from a location.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{Result, require};

/// Path parameters extracted from a location.
///
/// Keys are unique. A parameter that did not take part in a match is simply
/// absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Params {
    params: HashMap<String, String>,
}

impl Params {
    /// Creates new empty params.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    /// Gets a parameter value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Gets a parameter value or fails naming the missing key.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::MissingValue`](crate::RouteError::MissingValue)
    /// when `key` was not captured.
    pub fn require(&self, key: &str) -> Result<&str> {
        require(self.get(key), &format!("path parameter '{key}'"))
    }

    /// Parses a parameter as a specific type.
    #[must_use]
    pub fn parse<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns `true` if no parameters were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns an iterator over the parameters.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Copies every parameter of `other` into `self`, overwriting on
    /// conflict.
    pub fn extend(&mut self, other: &Self) {
        self.params
            .extend(other.params.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a String, &'a String);
    type IntoIter = std::collections::hash_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params() {
        let mut params = Params::new();
        params.insert("id", "123");
        params.insert("name", "test");

        assert_eq!(params.get("id"), Some("123"));
        assert_eq!(params.parse::<i64>("id"), Some(123));
        assert_eq!(params.get("missing"), None);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_require_missing() {
        let params = Params::new();
        let err = params.require("id").unwrap_err();
        assert!(matches!(err, crate::error::RouteError::MissingValue(_)));
        assert!(err.to_string().contains("'id'"));
    }

    #[test]
    fn test_extend_overwrites() {
        let mut outer: Params = [("org", "acme"), ("id", "1")].into_iter().collect();
        let inner: Params = [("id", "2")].into_iter().collect();
        outer.extend(&inner);
        assert_eq!(outer.get("id"), Some("2"));
        assert_eq!(outer.get("org"), Some("acme"));
    }

    #[test]
    fn test_serializes_as_map() {
        let params: Params = [("id", "42")].into_iter().collect();
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json, serde_json::json!({ "id": "42" }));
    }
}
