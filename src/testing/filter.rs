//! Tag based test selection.

use std::collections::HashSet;

use crate::suite::Test;

/// Keep the tests whose `id` is a member of `tags`, in their original order.
///
/// Matching is exact string equality. Tests without a string `id` never match.
pub fn filter_by_tags(tests: &[Test], tags: &HashSet<String>) -> Vec<Test> {
    tests
        .iter()
        .filter(|test| test.id().is_some_and(|id| tags.contains(id)))
        .cloned()
        .collect()
}

/// Apply the tag filter when a non-empty tag set was requested; otherwise
/// every test runs.
pub fn select_tests(tests: &[Test], tags: Option<&HashSet<String>>) -> Vec<Test> {
    match tags {
        Some(tags) if !tags.is_empty() => filter_by_tags(tests, tags),
        _ => tests.to_vec(),
    }
}
