//! Error types for navigation.

use oxide_route::RouteError;

/// Errors that can occur while configuring or driving a router.
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    /// Route compilation or path building failed.
    #[error("Route error: {0}")]
    Route(#[from] RouteError),

    /// The router configuration could not be parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// IO error (reading a configuration file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Location listeners kept redirecting.
    #[error("Too many redirects ({limit}) while navigating to '{to}'")]
    TooManyRedirects {
        /// The configured redirect limit.
        limit: usize,
        /// The navigation target that exceeded it.
        to: String,
    },

    /// The router was disposed.
    #[error("Router has been disposed")]
    Disposed,
}

/// Result type for navigation operations.
pub type Result<T> = std::result::Result<T, NavError>;
