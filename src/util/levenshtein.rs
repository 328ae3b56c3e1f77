//! Levenshtein edit distance.
//!
//! Distances count insertions, deletions and substitutions of Unicode scalar
//! values, so `"苹果"` and `"平果"` are one edit apart.

use std::cmp::min;

/// Edit distance between two strings (full dynamic programming, two rows).
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    distance_chars(&a, &b, usize::MAX).unwrap_or(usize::MAX)
}

/// Edit distance, or `None` as soon as it is known to exceed `threshold`.
pub fn levenshtein_distance_threshold(s1: &str, s2: &str, threshold: usize) -> Option<usize> {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    distance_chars(&a, &b, threshold)
}

fn distance_chars(a: &[char], b: &[char], threshold: usize) -> Option<usize> {
    if a.len().abs_diff(b.len()) > threshold {
        return None;
    }
    if a.is_empty() || b.is_empty() {
        let distance = a.len().max(b.len());
        return (distance <= threshold).then_some(distance);
    }

    let mut prev_row: Vec<usize> = (0..=b.len()).collect();
    let mut curr_row = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr_row[0] = i + 1;
        let mut row_min = curr_row[0];

        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr_row[j + 1] = min(
                min(prev_row[j + 1] + 1, curr_row[j] + 1),
                prev_row[j] + cost,
            );
            row_min = min(row_min, curr_row[j + 1]);
        }

        // The row minimum never decreases further down the table.
        if row_min > threshold {
            return None;
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    let distance = prev_row[b.len()];
    (distance <= threshold).then_some(distance)
}

/// Compares one query string against many candidates.
#[derive(Debug, Clone)]
pub struct LevenshteinMatcher {
    query: String,
    query_chars: Vec<char>,
}

impl LevenshteinMatcher {
    pub fn new<S: Into<String>>(query: S) -> Self {
        let query = query.into();
        let query_chars = query.chars().collect();
        LevenshteinMatcher { query, query_chars }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn distance(&self, candidate: &str) -> usize {
        let candidate: Vec<char> = candidate.chars().collect();
        distance_chars(&self.query_chars, &candidate, usize::MAX).unwrap_or(usize::MAX)
    }

    /// Distance to `candidate` if it is within `max_distance` edits.
    pub fn distance_within(&self, candidate: &str, max_distance: usize) -> Option<usize> {
        let candidate: Vec<char> = candidate.chars().collect();
        distance_chars(&self.query_chars, &candidate, max_distance)
    }
}
