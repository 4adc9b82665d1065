//! Route pattern syntax: segments, splats and optional expansion.
//!
//! Pattern syntax:
//! - `/users` - literal segment (matched case-insensitively)
//! - `/users/:id` - dynamic segment
//! - `/posts/:id?` - optional dynamic segment, see [`expand_optionals`]
//! - `/files/*path` - trailing splat capturing the remainder (`/*` for an
//!   anonymous one)

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, RouteError};

static OPTIONAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(/?:[^/]+)\?").expect("optional regex is valid"));

static ADJACENT_OPTIONAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(/:[^/]+)\?").expect("optional regex is valid"));

/// A segment in the main (non-splat) part of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A literal segment, stored lower-cased.
    Literal(String),
    /// A dynamic `:name` segment.
    Param(String),
}

impl PathSegment {
    fn parse(raw: &str) -> Self {
        raw.strip_prefix(':').map_or_else(
            || Self::Literal(raw.to_lowercase()),
            |name| Self::Param(name.to_string()),
        )
    }

    /// Returns `true` for dynamic segments.
    #[must_use]
    pub const fn is_dynamic(&self) -> bool {
        matches!(self, Self::Param(_))
    }
}

/// A pattern split into its segments and optional splat name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPattern {
    pub segments: Vec<PathSegment>,
    /// `None` without a splat, `Some("")` for an anonymous `/*`.
    pub splat: Option<String>,
}

/// Splits a pattern at the first `/*` into its main part and splat name.
///
/// A pattern beginning with `*` is treated as a root splat.
pub fn split_splat(pattern: &str) -> (&str, Option<&str>) {
    if let Some(name) = pattern.strip_prefix('*') {
        return ("", Some(name));
    }
    pattern
        .split_once("/*")
        .map_or((pattern, None), |(main, splat)| (main, Some(splat)))
}

/// Tokenizes `pattern` without validating it.
pub fn tokenize(pattern: &str) -> ParsedPattern {
    let (main, splat) = split_splat(pattern);
    ParsedPattern {
        segments: main
            .split('/')
            .filter(|s| !s.is_empty())
            .map(PathSegment::parse)
            .collect(),
        splat: splat.map(str::to_string),
    }
}

/// Tokenizes and validates `pattern`.
pub fn parse(pattern: &str) -> Result<ParsedPattern> {
    let (main, splat) = split_splat(pattern);

    if main.contains('*') {
        return Err(RouteError::malformed(
            pattern,
            "splat must be the final segment",
        ));
    }
    if let Some(splat) = splat {
        if splat.contains('*') {
            return Err(RouteError::malformed(
                pattern,
                "only one splat is allowed",
            ));
        }
        if splat.contains('/') {
            return Err(RouteError::malformed(
                pattern,
                "splat must be the final segment",
            ));
        }
    }

    let parsed = tokenize(pattern);
    for segment in &parsed.segments {
        if let PathSegment::Param(name) = segment {
            if name.is_empty() {
                return Err(RouteError::malformed(pattern, "dynamic segment has no name"));
            }
            if name.ends_with('?') {
                return Err(RouteError::malformed(
                    pattern,
                    format!("optional segment ':{name}' must be expanded before matching"),
                ));
            }
        }
    }
    Ok(parsed)
}

/// Expands a pattern containing optional segments into the concrete
/// patterns it stands for.
///
/// Adjacent optional segments expand left to right rather than as a full
/// permutation, so `/:a?/:b?` yields `""`, `/:a`, `/:a/:b` but never `/:b`
/// on its own. Earlier parameters take precedence.
///
/// # Example
///
/// ```
/// use oxide_route::expand_optionals;
///
/// assert_eq!(expand_optionals("/a/:b?/:c?"), vec!["/a", "/a/:b", "/a/:b/:c"]);
/// assert_eq!(expand_optionals("/users/:id"), vec!["/users/:id"]);
/// ```
#[must_use]
pub fn expand_optionals(pattern: &str) -> Vec<String> {
    let Some(found) = OPTIONAL.captures(pattern) else {
        return vec![pattern.to_string()];
    };
    let (Some(whole), Some(token)) = (found.get(0), found.get(1)) else {
        return vec![pattern.to_string()];
    };

    let mut prefix = pattern[..whole.start()].to_string();
    let mut suffix = &pattern[whole.end()..];
    let mut prefixes = vec![prefix.clone()];
    prefix.push_str(token.as_str());
    prefixes.push(prefix.clone());

    while let Some(next) = ADJACENT_OPTIONAL.captures(suffix) {
        let (Some(whole), Some(token)) = (next.get(0), next.get(1)) else {
            break;
        };
        prefix.push_str(token.as_str());
        prefixes.push(prefix.clone());
        suffix = &suffix[whole.end()..];
    }

    expand_optionals(suffix)
        .into_iter()
        .flat_map(|expansion| {
            prefixes
                .iter()
                .map(move |p| format!("{p}{expansion}"))
                .collect::<Vec<_>>()
        })
        .collect()
}
