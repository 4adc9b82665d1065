//! Query string codec.
//!
//! Query strings are decoded as `application/x-www-form-urlencoded`, the
//! same way browsers treat `location.search`.

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::Serialize;
use url::form_urlencoded;

/// A query parameter value. `Multiple` is used only for repeated keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SearchValue {
    /// A key that appears once.
    Single(String),
    /// A key that appears more than once, values in first-seen order.
    Multiple(Vec<String>),
}

impl SearchValue {
    /// Returns the first value.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Single(v) => Some(v),
            Self::Multiple(vs) => vs.first().map(String::as_str),
        }
    }

    /// Returns all values.
    #[must_use]
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Single(v) => vec![v.as_str()],
            Self::Multiple(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    fn is_blank(&self) -> bool {
        match self {
            Self::Single(v) => v.is_empty(),
            Self::Multiple(vs) => vs.is_empty(),
        }
    }
}

impl From<&str> for SearchValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for SearchValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<&str>> for SearchValue {
    fn from(values: Vec<&str>) -> Self {
        Self::Multiple(values.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for SearchValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multiple(values)
    }
}

/// Decoded query parameters in first-seen key order.
pub type SearchParams = IndexMap<String, SearchValue>;

fn pairs(search: &str) -> Vec<(String, String)> {
    let query = search.strip_prefix('?').unwrap_or(search);
    form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

fn encode(pairs: &[(String, String)]) -> String {
    let s = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    if s.is_empty() {
        s
    } else {
        format!("?{s}")
    }
}

/// Decodes a query string (with or without its leading `?`).
///
/// ```
/// use oxide_route::{SearchValue, parse_search};
///
/// let params = parse_search("?q=rust+lang&tag=a&tag=b");
/// assert_eq!(params["q"], SearchValue::from("rust lang"));
/// assert_eq!(params["tag"], SearchValue::from(vec!["a", "b"]));
/// ```
#[must_use]
pub fn parse_search(search: &str) -> SearchParams {
    let mut params = SearchParams::new();
    for (key, value) in pairs(search) {
        match params.entry(key) {
            Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                let mut values =
                    match std::mem::replace(existing, SearchValue::Multiple(Vec::new())) {
                        SearchValue::Single(first) => vec![first],
                        SearchValue::Multiple(values) => values,
                    };
                values.push(value);
                *existing = SearchValue::Multiple(values);
            }
            Entry::Vacant(entry) => {
                entry.insert(SearchValue::Single(value));
            }
        }
    }
    params
}

/// Applies `updates` to the query string `search`.
///
/// `None`, an empty string, or an empty list removes the key. A list
/// replaces every occurrence of the key with one occurrence per element. A
/// single value replaces the key in place. Returns `""` when nothing is left,
/// otherwise a `?`-prefixed query string.
///
/// ```
/// use oxide_route::{SearchValue, merge_search_string};
///
/// assert_eq!(merge_search_string("?a=1", [("a", None::<SearchValue>)]), "");
/// assert_eq!(
///     merge_search_string("", [("tags", Some(vec!["x", "y"]))]),
///     "?tags=x&tags=y"
/// );
/// ```
#[must_use]
pub fn merge_search_string<I, K, V>(search: &str, updates: I) -> String
where
    I: IntoIterator<Item = (K, Option<V>)>,
    K: AsRef<str>,
    V: Into<SearchValue>,
{
    let mut merged = pairs(search);
    for (key, value) in updates {
        let key = key.as_ref();
        match value.map(Into::<SearchValue>::into).filter(|v| !v.is_blank()) {
            None => merged.retain(|(k, _)| k != key),
            Some(SearchValue::Multiple(values)) => {
                merged.retain(|(k, _)| k != key);
                merged.extend(values.into_iter().map(|v| (key.to_string(), v)));
            }
            Some(SearchValue::Single(value)) => set_pair(&mut merged, key, value),
        }
    }
    encode(&merged)
}

/// Encodes a parameter mapping as a query string.
#[must_use]
pub fn to_search_string(params: &SearchParams) -> String {
    let flat: Vec<(String, String)> = params
        .iter()
        .flat_map(|(k, v)| {
            v.values()
                .into_iter()
                .map(move |v| (k.clone(), v.to_string()))
        })
        .collect();
    encode(&flat)
}

/// Replaces the first occurrence of `key` and drops the rest, or appends.
fn set_pair(pairs: &mut Vec<(String, String)>, key: &str, value: String) {
    let Some(first) = pairs.iter().position(|(k, _)| k == key) else {
        pairs.push((key.to_string(), value));
        return;
    };
    pairs[first].1 = value;
    let mut idx = 0;
    pairs.retain(|(k, _)| {
        let keep = idx <= first || k != key;
        idx += 1;
        keep
    });
}
