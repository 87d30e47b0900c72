//! Command-line command handlers for dawnlight.
//!
//! This module contains implementations for one-shot CLI commands like `schedule` and `fire`.
//! Each command is implemented in its own submodule to keep the code organized and maintainable.

pub mod fire;
pub mod help;
pub mod schedule;
pub mod simulate;

/// Calculate Levenshtein distance between two strings for similarity matching
fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();

    if s1_chars.is_empty() {
        return s2_chars.len();
    }
    if s2_chars.is_empty() {
        return s1_chars.len();
    }

    // Single rolling row instead of the full matrix
    let mut row: Vec<usize> = (0..=s2_chars.len()).collect();
    for (i, c1) in s1_chars.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, c2) in s2_chars.iter().enumerate() {
            let cost = usize::from(c1 != c2);
            let next = (row[j] + 1).min(row[j + 1] + 1).min(diagonal + cost);
            diagonal = row[j + 1];
            row[j + 1] = next;
        }
    }

    row[s2_chars.len()]
}

/// Find the event name closest to `target`, if any is reasonably close.
pub(crate) fn closest_name<'a>(target: &str, available: &[&'a str]) -> Option<&'a str> {
    let target_lower = target.to_lowercase();
    available
        .iter()
        .map(|name| (*name, levenshtein_distance(&target_lower, &name.to_lowercase())))
        .filter(|(name, distance)| *distance <= name.len().max(target.len()) / 2)
        .min_by_key(|(_, distance)| *distance)
        .map(|(name, _)| name)
}
