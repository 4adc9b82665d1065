#![allow(dead_code)]

use oxide_route::{BranchMatch, MatchFilters, Matcher, PathMatch, RouteDefinition, RouteTable};

pub fn table(defs: Vec<RouteDefinition>) -> RouteTable {
    RouteTable::new("", defs).unwrap_or_else(|e| panic!("Failed to compile routes: {e}"))
}

pub fn matches(table: &RouteTable, location: &str) -> BranchMatch {
    table
        .match_path(location)
        .unwrap_or_else(|| panic!("Expected a match for: {location}"))
}

pub fn match_exact(pattern: &str, location: &str) -> Option<PathMatch> {
    Matcher::exact(pattern)
        .unwrap_or_else(|e| panic!("Failed to compile: {pattern}\nError: {e}"))
        .match_path(location)
}

pub fn match_partial(pattern: &str, location: &str) -> Option<PathMatch> {
    Matcher::new(pattern, true, MatchFilters::new())
        .unwrap_or_else(|e| panic!("Failed to compile: {pattern}\nError: {e}"))
        .match_path(location)
}
