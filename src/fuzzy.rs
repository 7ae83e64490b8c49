//! Ranking of branch and tag names against a typed query.
//!
//! Each item is scored by the first tier that accepts it:
//!
//! | Tier | Condition                                   | Score      |
//! |------|---------------------------------------------|------------|
//! | 1    | query is empty                              | 100        |
//! | 2    | case-insensitive substring                  | 100        |
//! | 3    | case-insensitive subsequence (`ftr` in `feature`) | 95   |
//! | 4    | best approximate ratio >= threshold         | the ratio  |
//!
//! Results are ordered by score descending, then name ascending, so the same
//! input always produces the same list.

use std::cmp::Ordering;

use similar::TextDiff;

/// Minimum approximate-similarity score for tier 4.
pub const DEFAULT_THRESHOLD: u8 = 95;

const EXACT_SCORE: u8 = 100;
const SUBSEQUENCE_SCORE: u8 = 95;

/// One accepted item and its score (0..=100).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub item: String,
    pub score: u8,
}

impl Ord for Match {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| self.item.cmp(&other.item))
    }
}

impl PartialOrd for Match {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Score and order `items` against `query`, dropping items below `threshold`.
pub fn rank<S: AsRef<str>>(items: &[S], query: &str, threshold: u8) -> Vec<Match> {
    let query = query.to_lowercase();
    let mut matches: Vec<Match> = items
        .iter()
        .filter_map(|item| {
            let item = item.as_ref();
            score(&query, &item.to_lowercase(), threshold).map(|score| Match {
                item: item.to_string(),
                score,
            })
        })
        .collect();
    matches.sort();
    matches
}

/// [`rank`], keeping only the names.
pub fn filter_names<S: AsRef<str>>(items: &[S], query: &str, threshold: u8) -> Vec<String> {
    rank(items, query, threshold)
        .into_iter()
        .map(|m| m.item)
        .collect()
}

/// Both arguments are already lowercased.
fn score(query: &str, item: &str, threshold: u8) -> Option<u8> {
    if query.is_empty() || item.contains(query) {
        return Some(EXACT_SCORE);
    }
    if is_subsequence(query, item) {
        return Some(SUBSEQUENCE_SCORE);
    }
    let approximate = partial_ratio(query, item).max(token_sort_ratio(query, item));
    (approximate >= threshold).then_some(approximate)
}

fn is_subsequence(query: &str, item: &str) -> bool {
    let mut chars = item.chars();
    query.chars().all(|q| chars.any(|c| c == q))
}

/// Similarity of two strings in 0..=100 (`2 * matches / total_len`).
fn ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let similarity = TextDiff::from_chars(a, b).ratio();
    (similarity * 100.0).round() as u8
}

/// Best [`ratio`] of the shorter string against every same-length window of
/// the longer one.
fn partial_ratio(a: &str, b: &str) -> u8 {
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    let long: Vec<char> = long.chars().collect();
    let width = short.chars().count();
    if width == 0 {
        return 0;
    }

    let mut best = 0;
    for window in long.windows(width) {
        let window: String = window.iter().collect();
        best = best.max(ratio(short, &window));
        if best == EXACT_SCORE {
            break;
        }
    }
    best
}

/// [`ratio`] after splitting both strings into alphanumeric tokens and
/// sorting them, so word order does not matter.
fn token_sort_ratio(a: &str, b: &str) -> u8 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

fn sorted_tokens(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}
