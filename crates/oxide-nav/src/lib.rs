//! Navigation history and cancellable transitions for client-side routing.
//!
//! `oxide-nav` drives the route tables of [`oxide_route`] through a history:
//!
//! - **Location** - immutable snapshots of `pathname + search + hash` with
//!   entry state
//! - **History** - the [`History`](history::History) trait with in-memory and
//!   platform-backed implementations, each exposing its entry depth
//! - **Before-leave** - listeners that may veto a transition, including
//!   backward traversals started by the platform
//! - **Router** - resolves targets, consults the guards, commits to history,
//!   and keeps the current match
//! - **Config** - JSON route declarations
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//!
//! use oxide_nav::prelude::*;
//!
//! let config = RouterConfig::from_json_str(
//!     r#"{ "routes": [{ "path": "/" }, { "path": "/edit", "name": "edit" }] }"#,
//! )
//! .unwrap();
//! let history = Rc::new(MemoryHistory::new());
//! let router = Router::new(history.clone(), &config).unwrap();
//!
//! router.navigate("/edit", NavigateOptions::default()).unwrap();
//!
//! // Unsaved changes: refuse to go back.
//! let _guard = router.on_before_leave(|event| {
//!     if event.delta().is_some() {
//!         event.prevent_default();
//!     }
//! });
//! router.back().unwrap();
//! assert_eq!(router.location().value, "/edit");
//! assert_eq!(history.depth(), 1);
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Show which route a location selects
//! oxide-nav match --config routes.json /users/42
//!
//! # Replay a navigation sequence against an in-memory history
//! oxide-nav replay --config routes.json push:/a push:/b back --block-back
//! ```

pub mod config;
pub mod error;
pub mod history;
pub mod lifecycle;
pub mod listeners;
pub mod location;
pub mod router;

pub use config::{FilterConfig, RouteConfig, RouterConfig};
pub use error::{NavError, Result};
pub use lifecycle::{BeforeLeave, BeforeLeaveEvent, Intercepted, NavigationTarget};
pub use listeners::{Listener, Listeners, Subscription};
pub use location::{Location, LocationChange};
pub use router::{DEFAULT_MAX_REDIRECTS, NavigateOptions, NavigationOutcome, Router};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::{FilterConfig, RouteConfig, RouterConfig};
    pub use crate::error::{NavError, Result};
    pub use crate::history::{BrowserHistory, History, MemoryHistory, NativeHistory};
    pub use crate::lifecycle::{BeforeLeaveEvent, NavigationTarget};
    pub use crate::location::{Location, LocationChange};
    pub use crate::router::{NavigateOptions, NavigationOutcome, Router};
    pub use oxide_route::{MatchFilter, Params, RouteDefinition, RouteTable};
}
