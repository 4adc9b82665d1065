//! Specificity scoring for route patterns.

use crate::pattern::{self, PathSegment};

/// Points for a literal segment.
const STATIC_POINTS: i32 = 3;
/// Points for a dynamic segment.
const DYNAMIC_POINTS: i32 = 2;
/// Penalty for a trailing splat.
const SPLAT_PENALTY: i32 = 1;

/// Scores a pattern by specificity. Higher is more specific.
///
/// Each literal segment is worth 3, each dynamic segment 2, and a splat
/// costs 1, so a splat pattern always ranks below the same pattern without
/// one.
///
/// ```
/// use oxide_route::score_route;
///
/// assert!(score_route("/users/new") > score_route("/users/:id"));
/// assert!(score_route("/users/:id/*rest") < score_route("/users/:id"));
/// ```
#[must_use]
pub fn score_route(pattern: &str) -> i32 {
    let parsed = pattern::tokenize(pattern);
    let segments: i32 = parsed
        .segments
        .iter()
        .map(|s| match s {
            PathSegment::Literal(_) => STATIC_POINTS,
            PathSegment::Param(_) => DYNAMIC_POINTS,
        })
        .sum();
    if parsed.splat.is_some() {
        segments - SPLAT_PENALTY
    } else {
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/", 0)]
    #[case("/users", 3)]
    #[case("/users/:id", 5)]
    #[case("/users/new", 6)]
    #[case("/*all", -1)]
    #[case("/files/*", 2)]
    #[case("/files/:kind/*path", 4)]
    fn test_scores(#[case] pattern: &str, #[case] expected: i32) {
        assert_eq!(score_route(pattern), expected);
    }

    #[test]
    fn test_static_beats_dynamic() {
        assert!(score_route("/users/new") > score_route("/users/:id"));
    }

    #[test]
    fn test_splat_ranks_below_equivalent() {
        assert!(score_route("/users/*rest") < score_route("/users"));
        assert!(score_route("/a/:b/*") < score_route("/a/:b"));
    }
}
