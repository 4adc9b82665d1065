//! # oxide-route
//!
//! Route pattern matching for client-side navigation.
//!
//! This crate provides:
//! - Path normalization, relative resolution and joining
//! - Pattern compilation with dynamic, optional and splat segments
//! - Per-segment match filters
//! - Specificity scoring and ranked matching over nested route trees
//! - A query string codec with multi-valued keys
//!
//! ## Quick Start
//!
//! ```
//! use oxide_route::{MatchFilter, RouteDefinition, RouteTable};
//!
//! let routes = RouteTable::new(
//!     "/",
//!     vec![
//!         RouteDefinition::new("/").name("home"),
//!         RouteDefinition::new("/users/:id")
//!             .name("user")
//!             .filter("id", MatchFilter::pattern(r"^\d+$").unwrap()),
//!         RouteDefinition::new("/docs/*path").name("docs"),
//!         RouteDefinition::new("/*all").name("not_found"),
//!     ],
//! )
//! .unwrap();
//!
//! let m = routes.match_path("/users/42").unwrap();
//! assert_eq!(m.name(), Some("user"));
//! assert_eq!(m.params().get("id"), Some("42"));
//!
//! // Filters reject, so the catch-all takes over.
//! assert_eq!(routes.match_path("/users/bob").unwrap().name(), Some("not_found"));
//! ```
//!
//! ## Pattern Syntax
//!
//! | Pattern | Matches |
//! |---|---|
//! | `/about` | `/about`, `/About` |
//! | `/users/:id` | `/users/42` with `id = "42"` |
//! | `/posts/:id?` | `/posts` and `/posts/7` |
//! | `/files/*path` | `/files`, `/files/a/b` with `path = "a/b"` |
//!
//! ## Ranking
//!
//! Every compiled pattern gets a score (literal 3, dynamic 2, splat -1).
//! When several routes match, the highest score wins and ties go to the
//! route declared first.

mod error;
mod filter;
mod matcher;
mod params;
mod path;
mod pattern;
mod route;
mod score;
mod search;

pub use error::{Result, RouteError, require};
pub use filter::{MatchFilter, MatchFilters, Predicate, match_segment};
pub use matcher::{Matcher, PathMatch};
pub use params::Params;
pub use path::{is_external, join_paths, normalize_path, resolve_path};
pub use pattern::{PathSegment, expand_optionals};
pub use route::{Branch, BranchMatch, RouteDefinition, RouteDescription, RouteMatch, RouteTable};
pub use score::score_route;
pub use search::{SearchParams, SearchValue, merge_search_string, parse_search, to_search_string};
