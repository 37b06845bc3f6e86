// src/sources/patch.rs

//! Unified diff helpers.

/// Added lines of a unified diff patch, with the `+` marker removed.
///
/// File headers (`+++ b/README.md`) are skipped.
pub fn added_lines(patch: &str) -> Vec<String> {
    patch
        .lines()
        .filter(|line| !line.starts_with("+++"))
        .filter_map(|line| line.strip_prefix('+'))
        .map(str::to_string)
        .collect()
}
