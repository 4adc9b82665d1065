//! Error types for route compilation and path building.

use thiserror::Error;

/// Route-specific errors.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The pattern cannot be compiled into a matcher.
    #[error("malformed route pattern '{pattern}': {reason}")]
    MalformedPattern {
        /// The offending pattern.
        pattern: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A regex filter failed to compile.
    #[error("invalid match filter: {0}")]
    InvalidFilter(#[from] regex::Error),

    /// A required value was absent.
    #[error("missing required value: {0}")]
    MissingValue(String),

    /// Two routes were declared with the same name.
    #[error("duplicate route name: {0}")]
    DuplicateName(String),

    /// No route is registered under this name.
    #[error("route not found: {0}")]
    RouteNotFound(String),
}

impl RouteError {
    pub(crate) fn malformed(pattern: &str, reason: impl Into<String>) -> Self {
        Self::MalformedPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for route operations.
pub type Result<T> = std::result::Result<T, RouteError>;

/// Unwraps a required value or fails with a [`RouteError::MissingValue`]
/// naming it.
///
/// ```
/// use oxide_route::require;
///
/// assert_eq!(require(Some(3), "count").unwrap(), 3);
/// assert!(require::<u32>(None, "count").is_err());
/// ```
///
/// # Errors
///
/// Returns [`RouteError::MissingValue`] when `value` is `None`.
pub fn require<T>(value: Option<T>, what: &str) -> Result<T> {
    value.ok_or_else(|| RouteError::MissingValue(what.to_string()))
}
