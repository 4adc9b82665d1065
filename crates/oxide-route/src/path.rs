//! Path normalization, resolution and joining.

use std::sync::LazyLock;

use regex::Regex;

static HAS_SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:[a-z0-9]+:)?//").expect("scheme regex is valid")
});

static TRAILING_SPLAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/*(\*.*)?$").expect("splat regex is valid"));

/// Canonicalizes a path string.
///
/// Leading slashes and the trailing slash run are stripped, then a single
/// leading slash is added back unless `omit_slash` is set or the remainder is
/// a bare query (`?…`) or hash (`#…`).
///
/// # Example
///
/// ```
/// use oxide_route::normalize_path;
///
/// assert_eq!(normalize_path("//a/b//", false), "/a/b");
/// assert_eq!(normalize_path("a/b", true), "a/b");
/// assert_eq!(normalize_path("?page=2", false), "?page=2");
/// assert_eq!(normalize_path("", false), "");
/// ```
#[must_use]
pub fn normalize_path(path: &str, omit_slash: bool) -> String {
    let trimmed = path.trim_start_matches('/').trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if omit_slash || trimmed.starts_with(['?', '#']) {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Returns `true` if `path` is an absolute URL (`scheme://…` or `//…`).
#[must_use]
pub fn is_external(path: &str) -> bool {
    HAS_SCHEME.is_match(path)
}

/// Resolves `path` against a router `base` and an optional `from` location.
///
/// Returns `None` for absolute URLs, which must not be resolved.
///
/// Relative segment paths resolve directory-style: the last segment of
/// `from` is replaced unless `from` ends with a slash or is no deeper than
/// `base`. Query and hash fragments attach to the whole of `from`.
///
/// # Example
///
/// ```
/// use oxide_route::resolve_path;
///
/// assert_eq!(resolve_path("/app", "foo", Some("/app/bar")).as_deref(), Some("/app/foo"));
/// assert_eq!(resolve_path("/app", "foo", Some("/app/bar/")).as_deref(), Some("/app/bar/foo"));
/// assert_eq!(resolve_path("/app", "/foo", None).as_deref(), Some("/app/foo"));
/// assert_eq!(resolve_path("/app", "http://x.com", None), None);
/// ```
#[must_use]
pub fn resolve_path(base: &str, path: &str, from: Option<&str>) -> Option<String> {
    if is_external(path) {
        return None;
    }

    let base_path = normalize_path(base, false);
    let from_path = from
        .map(|f| normalize_path(f, false))
        .filter(|f| !f.is_empty());

    let root = match from_path {
        Some(from_path) if !path.starts_with('/') => {
            let prefix = prefix_len_ignore_case(&from_path, &base_path);
            let floor = prefix.unwrap_or(base_path.len());
            let root = if prefix.is_some() {
                from_path
            } else {
                format!("{base_path}{from_path}")
            };
            let names_directory = from.is_some_and(|f| f.ends_with('/'));
            if is_segment_path(path) && !names_directory {
                parent_within(&root, floor)
            } else {
                root
            }
        }
        _ => base_path,
    };

    if root.is_empty() {
        Some(format!("/{}", normalize_path(path, true)))
    } else {
        Some(format!("{root}{}", normalize_path(path, false)))
    }
}

/// Joins a parent pattern and a child pattern.
///
/// A trailing splat on the parent is dropped, since the child takes over
/// the remainder of the location.
///
/// ```
/// use oxide_route::join_paths;
///
/// assert_eq!(join_paths("/users/*rest", "/:id"), "/users/:id");
/// assert_eq!(join_paths("", "about"), "/about");
/// ```
#[must_use]
pub fn join_paths(from: &str, to: &str) -> String {
    let parent = normalize_path(from, false);
    let parent = TRAILING_SPLAT.replace(&parent, "");
    format!("{parent}{}", normalize_path(to, false))
}

fn is_segment_path(path: &str) -> bool {
    !path.is_empty() && !path.starts_with(['?', '#'])
}

/// Returns the byte length of the part of `text` that equals `prefix`
/// ignoring case, or `None` if `text` does not start with `prefix`.
///
/// The length is measured in `text`, whose lowercase form may differ in
/// byte length from `prefix`.
fn prefix_len_ignore_case(text: &str, prefix: &str) -> Option<usize> {
    let mut wanted = prefix.chars().flat_map(char::to_lowercase).peekable();
    for (idx, ch) in text.char_indices() {
        if wanted.peek().is_none() {
            return Some(idx);
        }
        for lower in ch.to_lowercase() {
            if wanted.next() != Some(lower) {
                return None;
            }
        }
    }
    wanted.peek().is_none().then_some(text.len())
}

/// Drops the last segment of `root`, never cutting into the first
/// `floor` bytes (the router base).
fn parent_within(root: &str, floor: usize) -> String {
    if root.len() <= floor {
        return root.to_string();
    }
    match root.rfind('/') {
        Some(idx) if idx >= floor => root[..idx].to_string(),
        _ => root[..floor].to_string(),
    }
}
