//! Numeric suffix helpers shared by both allocators.

use std::collections::BTreeSet;

/// Parses the trailing number of a hostname value.
///
/// Accepts `web-3` (digits after the last `-`) as well as a bare `3`.
/// Returns `None` when the tail is empty or not made only of ASCII digits.
#[must_use]
pub fn parse_suffix(value: &str) -> Option<u32> {
    let digits = value.rsplit_once('-').map_or(value, |(_, tail)| tail);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Returns the smallest number in `1..=capacity` missing from `used`.
#[must_use]
pub fn first_free(used: &BTreeSet<u32>, capacity: u32) -> Option<u32> {
    (1..=capacity).find(|n| !used.contains(n))
}
