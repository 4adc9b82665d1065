//! Route declarations and ranked matching over a route tree.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{Result, RouteError};
use crate::filter::{MatchFilter, MatchFilters};
use crate::matcher::{Matcher, PathMatch};
use crate::params::Params;
use crate::path::{join_paths, normalize_path};
use crate::pattern::expand_optionals;
use crate::score::score_route;

/// A declared route, possibly with nested children.
///
/// A route with children is a layout section: it only matches through one
/// of its children, and matches the location as a prefix.
#[derive(Debug, Clone, Default)]
pub struct RouteDefinition {
    path: String,
    name: Option<String>,
    filters: MatchFilters,
    children: Vec<RouteDefinition>,
}

impl RouteDefinition {
    /// Creates a route for `path`.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Sets the route name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Adds a filter for a dynamic segment or splat.
    #[must_use]
    pub fn filter(mut self, param: impl Into<String>, filter: impl Into<MatchFilter>) -> Self {
        self.filters.insert(param.into(), filter.into());
        self
    }

    /// Adds a nested route.
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Adds nested routes.
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }

    /// Returns the declared path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// One compiled route: a single optional-expansion of a definition, joined
/// under its parents.
#[derive(Debug)]
pub struct RouteDescription {
    /// Position of the definition in the tree (one index per level).
    pub key: Vec<usize>,
    /// The path as declared.
    pub original_path: String,
    /// The full pattern this route was compiled from.
    pub pattern: String,
    /// The route name, if any.
    pub name: Option<String>,
    /// Specificity score, see [`score_route`].
    pub score: i32,
    matcher: Matcher,
}

impl RouteDescription {
    /// Returns the compiled matcher.
    #[must_use]
    pub const fn matcher(&self) -> &Matcher {
        &self.matcher
    }
}

/// A route that matched, at one level of a branch.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The route.
    pub route: Arc<RouteDescription>,
    /// The portion of the location this level consumed.
    pub path: String,
    /// Parameters captured at this level.
    pub params: Params,
}

/// A root-to-leaf chain of routes.
#[derive(Debug, Clone)]
pub struct Branch {
    routes: Vec<Arc<RouteDescription>>,
    score: i32,
}

impl Branch {
    fn new(routes: Vec<Arc<RouteDescription>>) -> Self {
        let score = routes.last().map_or(0, |r| r.score);
        Self { routes, score }
    }

    /// Returns the ranking score (the leaf route's score).
    #[must_use]
    pub const fn score(&self) -> i32 {
        self.score
    }

    /// Returns the routes from outermost to leaf.
    #[must_use]
    pub fn routes(&self) -> &[Arc<RouteDescription>] {
        &self.routes
    }

    fn match_path(&self, location: &str) -> Option<Vec<RouteMatch>> {
        self.routes
            .iter()
            .map(|route| {
                route.matcher.match_path(location).map(|m| RouteMatch {
                    route: Arc::clone(route),
                    path: m.path,
                    params: m.params,
                })
            })
            .collect()
    }
}

/// The matches of the winning branch.
#[derive(Debug, Clone)]
pub struct BranchMatch {
    matches: Vec<RouteMatch>,
    params: Params,
}

impl BranchMatch {
    /// Returns each level's match, outermost first.
    #[must_use]
    pub fn matches(&self) -> &[RouteMatch] {
        &self.matches
    }

    /// Returns the parameters of every level merged, inner levels winning.
    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }

    /// Returns the leaf match.
    #[must_use]
    pub fn leaf(&self) -> Option<&RouteMatch> {
        self.matches.last()
    }

    /// Returns the leaf's matched path together with all parameters.
    #[must_use]
    pub fn best(&self) -> PathMatch {
        PathMatch {
            path: self.leaf().map(|m| m.path.clone()).unwrap_or_default(),
            params: self.params.clone(),
        }
    }

    /// Returns the leaf route's pattern.
    #[must_use]
    pub fn pattern(&self) -> Option<&str> {
        self.leaf().map(|m| m.route.pattern.as_str())
    }

    /// Returns the leaf route's name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.leaf().and_then(|m| m.route.name.as_deref())
    }
}

/// A compiled, ranked set of routes.
///
/// Branches are ordered by descending specificity; routes of equal score
/// keep their declaration order.
///
/// # Example
///
/// ```
/// use oxide_route::{RouteDefinition, RouteTable};
///
/// let table = RouteTable::new(
///     "",
///     vec![
///         RouteDefinition::new("/users/:id"),
///         RouteDefinition::new("/users/new").name("new_user"),
///     ],
/// )
/// .unwrap();
///
/// let m = table.match_path("/users/new").unwrap();
/// assert_eq!(m.name(), Some("new_user"));
/// ```
#[derive(Debug, Clone)]
pub struct RouteTable {
    base: String,
    branches: Vec<Branch>,
    named: HashMap<String, Vec<Arc<RouteDescription>>>,
}

impl RouteTable {
    /// Compiles `definitions` under `base`.
    ///
    /// # Errors
    ///
    /// Fails on the first malformed pattern or duplicate route name.
    pub fn new(
        base: &str,
        definitions: impl IntoIterator<Item = RouteDefinition>,
    ) -> Result<Self> {
        let definitions: Vec<RouteDefinition> = definitions.into_iter().collect();
        let base = normalize_path(base, false);
        let mut compiler = Compiler::default();
        compiler.compile(&definitions, &base, &mut Vec::new(), &[])?;

        let mut branches = compiler.branches;
        branches.sort_by_key(|b| Reverse(b.score));
        debug!(base = %base, branches = branches.len(), "Compiled route table");

        Ok(Self {
            base,
            branches,
            named: compiler.named,
        })
    }

    /// Returns the normalized base path.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Returns the branches in ranking order.
    #[must_use]
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Returns `true` if a route is registered under `name`.
    #[must_use]
    pub fn has_route(&self, name: &str) -> bool {
        self.named.contains_key(name)
    }

    /// Finds the most specific branch matching `location`.
    ///
    /// Any query string or hash on `location` is ignored.
    #[must_use]
    pub fn match_path(&self, location: &str) -> Option<BranchMatch> {
        let path = location.split(['?', '#']).next().unwrap_or_default();
        let (branch, matches) = self
            .branches
            .iter()
            .find_map(|b| b.match_path(path).map(|m| (b, m)))?;
        trace!(location = path, score = branch.score, "Matched route branch");

        let mut params = Params::new();
        for m in &matches {
            params.extend(&m.params);
        }
        Some(BranchMatch { matches, params })
    }

    /// Builds a location for the route registered under `name`.
    ///
    /// For a route with optional segments the longest expansion whose
    /// parameters are all present is used.
    ///
    /// # Errors
    ///
    /// [`RouteError::RouteNotFound`] for an unknown name,
    /// [`RouteError::MissingValue`] when a required parameter is absent.
    pub fn reverse(&self, name: &str, params: &Params) -> Result<String> {
        let routes = self
            .named
            .get(name)
            .ok_or_else(|| RouteError::RouteNotFound(name.to_string()))?;

        let mut last_err = None;
        for route in routes.iter().rev() {
            match route.matcher.reverse(params) {
                Ok(path) => return Ok(path),
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| RouteError::RouteNotFound(name.to_string())))
    }
}

#[derive(Default)]
struct Compiler {
    branches: Vec<Branch>,
    named: HashMap<String, Vec<Arc<RouteDescription>>>,
}

impl Compiler {
    fn compile(
        &mut self,
        definitions: &[RouteDefinition],
        parent: &str,
        stack: &mut Vec<Arc<RouteDescription>>,
        key: &[usize],
    ) -> Result<()> {
        for (index, def) in definitions.iter().enumerate() {
            let key: Vec<usize> = key.iter().copied().chain([index]).collect();
            let is_leaf = def.children.is_empty();

            if let Some(name) = &def.name {
                if self.named.contains_key(name) {
                    return Err(RouteError::DuplicateName(name.clone()));
                }
                self.named.insert(name.clone(), Vec::new());
            }

            for expansion in expand_optionals(&def.path) {
                let pattern = join_paths(parent, &expansion);
                let matcher = Matcher::new(&pattern, !is_leaf, def.filters.clone())?;
                let route = Arc::new(RouteDescription {
                    key: key.clone(),
                    original_path: def.path.clone(),
                    score: score_route(&pattern),
                    pattern,
                    name: def.name.clone(),
                    matcher,
                });

                if let Some(named) = def.name.as_ref().and_then(|n| self.named.get_mut(n)) {
                    named.push(Arc::clone(&route));
                }

                stack.push(Arc::clone(&route));
                if is_leaf {
                    self.branches.push(Branch::new(stack.clone()));
                } else {
                    self.compile(&def.children, &route.pattern, stack, &key)?;
                }
                stack.pop();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(defs: Vec<RouteDefinition>) -> RouteTable {
        RouteTable::new("", defs).unwrap()
    }

    #[test]
    fn test_more_specific_wins_regardless_of_order() {
        let t = table(vec![
            RouteDefinition::new("/users/:id").name("detail"),
            RouteDefinition::new("/users/new").name("new"),
        ]);
        assert_eq!(t.match_path("/users/new").unwrap().name(), Some("new"));
        assert_eq!(t.match_path("/users/7").unwrap().name(), Some("detail"));
    }

    #[test]
    fn test_ties_keep_declaration_order() {
        let t = table(vec![
            RouteDefinition::new("/:a").name("first"),
            RouteDefinition::new("/:b").name("second"),
        ]);
        assert_eq!(t.match_path("/x").unwrap().name(), Some("first"));
    }

    #[test]
    fn test_splat_is_fallback() {
        let t = table(vec![
            RouteDefinition::new("/*all").name("not_found"),
            RouteDefinition::new("/about").name("about"),
        ]);
        assert_eq!(t.match_path("/about").unwrap().name(), Some("about"));
        let m = t.match_path("/nope/deeper").unwrap();
        assert_eq!(m.name(), Some("not_found"));
        assert_eq!(m.params().get("all"), Some("nope/deeper"));
    }

    #[test]
    fn test_no_match() {
        let t = table(vec![RouteDefinition::new("/about")]);
        assert!(t.match_path("/contact").is_none());
    }

    #[test]
    fn test_optional_expansion() {
        let t = table(vec![RouteDefinition::new("/posts/:id?").name("posts")]);
        assert!(t.match_path("/posts").is_some());
        let m = t.match_path("/posts/9").unwrap();
        assert_eq!(m.params().get("id"), Some("9"));
        assert_eq!(m.pattern(), Some("/posts/:id"));
    }

    #[test]
    fn test_base_prefix() {
        let t = RouteTable::new("/app/", vec![RouteDefinition::new("/users")]).unwrap();
        assert_eq!(t.base(), "/app");
        assert!(t.match_path("/app/users").is_some());
        assert!(t.match_path("/users").is_none());
    }

    #[test]
    fn test_nested_routes_merge_params() {
        let t = table(vec![RouteDefinition::new("/orgs/:org").children([
            RouteDefinition::new("/").name("org_home"),
            RouteDefinition::new("/repos/:repo").name("repo"),
        ])]);

        let m = t.match_path("/orgs/acme/repos/site").unwrap();
        assert_eq!(m.name(), Some("repo"));
        assert_eq!(m.matches().len(), 2);
        assert_eq!(m.matches()[0].path, "/orgs/acme");
        assert_eq!(m.params().get("org"), Some("acme"));
        assert_eq!(m.params().get("repo"), Some("site"));
        assert_eq!(m.best().path, "/orgs/acme/repos/site");

        assert_eq!(t.match_path("/orgs/acme").unwrap().name(), Some("org_home"));
    }

    #[test]
    fn test_parent_without_children_match_is_not_a_branch() {
        let t = table(vec![
            RouteDefinition::new("/admin").child(RouteDefinition::new("/settings"))
        ]);
        assert!(t.match_path("/admin").is_none());
        assert!(t.match_path("/admin/settings").is_some());
    }

    #[test]
    fn test_query_and_hash_are_ignored() {
        let t = table(vec![RouteDefinition::new("/search")]);
        assert!(t.match_path("/search?q=x#results").is_some());
    }

    #[test]
    fn test_filters_apply_to_expansions() {
        let t = table(vec![
            RouteDefinition::new("/items/:id?").filter("id", MatchFilter::pattern(r"^\d+$").unwrap()),
        ]);
        assert!(t.match_path("/items").is_some());
        assert!(t.match_path("/items/12").is_some());
        assert!(t.match_path("/items/abc").is_none());
    }

    #[test]
    fn test_malformed_pattern_fails_registration() {
        let err = RouteTable::new("", vec![RouteDefinition::new("/a/*b/*c")]).unwrap_err();
        assert!(matches!(err, RouteError::MalformedPattern { .. }));
    }

    #[test]
    fn test_duplicate_name() {
        let err = RouteTable::new(
            "",
            vec![
                RouteDefinition::new("/a").name("x"),
                RouteDefinition::new("/b").name("x"),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, RouteError::DuplicateName(n) if n == "x"));
    }

    #[test]
    fn test_reverse_prefers_longest_expansion() {
        let t = table(vec![RouteDefinition::new("/posts/:id?").name("posts")]);
        let with_id: Params = [("id", "3")].into_iter().collect();
        assert_eq!(t.reverse("posts", &with_id).unwrap(), "/posts/3");
        assert_eq!(t.reverse("posts", &Params::new()).unwrap(), "/posts");
    }

    #[test]
    fn test_reverse_errors() {
        let t = table(vec![RouteDefinition::new("/users/:id").name("user")]);
        assert!(matches!(
            t.reverse("nope", &Params::new()),
            Err(RouteError::RouteNotFound(_))
        ));
        assert!(matches!(
            t.reverse("user", &Params::new()),
            Err(RouteError::MissingValue(_))
        ));
    }
}
