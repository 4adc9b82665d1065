//! JSON router configuration.
//!
//! ```json
//! {
//!   "base": "/app",
//!   "routes": [
//!     { "path": "/", "name": "home" },
//!     {
//!       "path": "/users",
//!       "children": [
//!         { "path": "/:id", "name": "user", "filters": { "id": { "regex": "^\\d+$" } } }
//!       ]
//!     },
//!     { "path": "/lang/:code", "filters": { "code": ["en", "fr"] } }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use oxide_route::{MatchFilter, RouteDefinition};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::router::DEFAULT_MAX_REDIRECTS;

const fn default_max_redirects() -> usize {
    DEFAULT_MAX_REDIRECTS
}

/// Top-level router configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Path prefix shared by every route.
    #[serde(default)]
    pub base: String,
    /// Limit on navigations started from location listeners.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// Declared routes.
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            base: String::new(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            routes: Vec::new(),
        }
    }
}

impl RouterConfig {
    /// Parses a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::Config`](crate::NavError::Config) for malformed
    /// JSON or an unexpected shape.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::Io`](crate::NavError::Io) if the file cannot be
    /// read, otherwise fails like [`from_json_str`](Self::from_json_str).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading router configuration");
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Converts the declared routes into definitions.
    ///
    /// # Errors
    ///
    /// Fails if a regex filter does not compile.
    pub fn route_definitions(&self) -> Result<Vec<RouteDefinition>> {
        self.routes.iter().map(RouteConfig::to_definition).collect()
    }
}

/// One declared route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// The route pattern.
    pub path: String,
    /// Optional route name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Filters keyed by parameter name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub filters: BTreeMap<String, FilterConfig>,
    /// Nested routes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RouteConfig>,
}

impl RouteConfig {
    fn to_definition(&self) -> Result<RouteDefinition> {
        let mut def = RouteDefinition::new(&self.path);
        if let Some(name) = &self.name {
            def = def.name(name);
        }
        for (param, filter) in &self.filters {
            def = def.filter(param, filter.to_filter(&self.path, param)?);
        }
        let children = self
            .children
            .iter()
            .map(Self::to_definition)
            .collect::<Result<Vec<_>>>()?;
        Ok(def.children(children))
    }
}

/// A filter declaration.
///
/// A string is an exact value, an array of strings a set of values, and
/// `{ "regex": "..." }` a regular expression. Any other shape never matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterConfig {
    /// Exact value.
    Literal(String),
    /// Any of these values.
    OneOf(Vec<String>),
    /// A regular expression.
    Regex {
        /// The expression.
        regex: String,
    },
    /// An unrecognized declaration.
    Other(Value),
}

impl FilterConfig {
    fn to_filter(&self, path: &str, param: &str) -> Result<MatchFilter> {
        Ok(match self {
            Self::Literal(value) => MatchFilter::literal(value),
            Self::OneOf(values) => MatchFilter::one_of(values.iter().cloned()),
            Self::Regex { regex } => MatchFilter::pattern(regex)?,
            Self::Other(value) => {
                warn!(path, param, filter = %value, "Unsupported filter, route will never match");
                MatchFilter::Unsupported(value.to_string())
            }
        })
    }
}
