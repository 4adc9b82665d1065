//! End-to-end matching behavior over patterns and route tables.

mod common;
use common::*;

use oxide_route::{
    MatchFilter, RouteDefinition, SearchValue, expand_optionals, merge_search_string,
    normalize_path, resolve_path, score_route,
};

#[test]
fn expand_without_optionals_is_identity() {
    for pattern in ["/", "/users", "/users/:id", "/files/*rest", ""] {
        assert_eq!(expand_optionals(pattern), vec![pattern.to_string()]);
    }
}

#[test]
fn expand_adjacent_optionals_left_to_right() {
    assert_eq!(
        expand_optionals("/a/:b?/:c?"),
        vec!["/a", "/a/:b", "/a/:b/:c"]
    );
}

#[test]
fn resolve_paths() {
    assert_eq!(
        resolve_path("/app", "foo", Some("/app/bar")).as_deref(),
        Some("/app/foo")
    );
    assert_eq!(resolve_path("/app", "/foo", None).as_deref(), Some("/app/foo"));
    assert_eq!(resolve_path("/app", "http://x.com", None), None);
}

#[test]
fn normalize_paths() {
    assert_eq!(normalize_path("//a/b//", false), "/a/b");
    assert_eq!(normalize_path("", false), "");
}

#[test]
fn dynamic_segment() {
    let m = match_exact("/users/:id", "/users/42").unwrap();
    assert_eq!(m.params.get("id"), Some("42"));
    assert_eq!(m.path, "/users/42");

    assert!(match_exact("/users/:id", "/users").is_none());
    assert!(match_exact("/users/:id", "/users/42/edit").is_none());
    assert!(match_partial("/users/:id", "/users/42/edit").is_some());
}

#[test]
fn splat_segment() {
    let m = match_exact("/files/*rest", "/files/a/b/c").unwrap();
    assert_eq!(m.params.get("rest"), Some("a/b/c"));
}

#[test]
fn scoring_order() {
    assert!(score_route("/users/:id") < score_route("/users/new"));
    assert!(score_route("/users/:id/*rest") < score_route("/users/:id"));
    assert!(score_route("/users/new/*") < score_route("/users/new"));
}

#[test]
fn search_merging() {
    assert_eq!(merge_search_string("?a=1", [("a", None::<SearchValue>)]), "");
    assert_eq!(
        merge_search_string("", [("tags", Some(vec!["x", "y"]))]),
        "?tags=x&tags=y"
    );
}

#[test]
fn app_route_table() {
    let routes = table(vec![
        RouteDefinition::new("/").name("home"),
        RouteDefinition::new("/users").children([
            RouteDefinition::new("/").name("user_list"),
            RouteDefinition::new("/new").name("user_new"),
            RouteDefinition::new("/:id")
                .name("user_detail")
                .filter("id", MatchFilter::pattern(r"^\d+$").unwrap()),
            RouteDefinition::new("/:id/*tab").name("user_tab"),
        ]),
        RouteDefinition::new("/settings/:section?").name("settings"),
        RouteDefinition::new("/*all").name("not_found"),
    ]);

    assert_eq!(matches(&routes, "/").name(), Some("home"));
    assert_eq!(matches(&routes, "/users").name(), Some("user_list"));
    assert_eq!(matches(&routes, "/USERS/new").name(), Some("user_new"));
    assert_eq!(matches(&routes, "/users/12").name(), Some("user_detail"));

    let tab = matches(&routes, "/users/bob/posts/recent");
    assert_eq!(tab.name(), Some("user_tab"));
    assert_eq!(tab.params().get("id"), Some("bob"));
    assert_eq!(tab.params().get("tab"), Some("posts/recent"));

    assert_eq!(matches(&routes, "/settings").name(), Some("settings"));
    let section = matches(&routes, "/settings/profile");
    assert_eq!(section.params().get("section"), Some("profile"));

    let missing = matches(&routes, "/nowhere");
    assert_eq!(missing.name(), Some("not_found"));
    assert_eq!(missing.params().get("all"), Some("nowhere"));
}

#[test]
fn unsupported_filter_never_matches() {
    let routes = table(vec![RouteDefinition::new("/x/:id")
        .filter("id", MatchFilter::Unsupported("{\"min\": 3}".to_string()))]);
    assert!(routes.match_path("/x/1").is_none());
}
