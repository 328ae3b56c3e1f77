//! Fuzzy query for approximate term matching.

use std::fmt;

use crate::error::{LucernaError, Result};
use crate::query::{fmt_boost, validate_boost, validate_field};
use crate::util::levenshtein::LevenshteinMatcher;

/// Matches documents containing terms within an edit distance of the query text.
///
/// Distance is the plain Levenshtein distance over characters. Each matching
/// term contributes its weight scaled by `1 / (1 + distance)`, so closer
/// terms score higher. Every term within `max_edits` matches unless a cap is
/// set with [`FuzzyQuery::max_expansions`], which keeps the closest terms.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyQuery {
    field: String,
    text: String,
    max_edits: usize,
    /// Leading characters that must match exactly.
    prefix_length: usize,
    max_expansions: Option<usize>,
    boost: f32,
}

impl FuzzyQuery {
    pub fn new<F: Into<String>, T: Into<String>>(field: F, text: T, max_edits: i32) -> Result<Self> {
        let field = field.into();
        let text = text.into();
        validate_field(&field)?;
        if text.is_empty() {
            return Err(LucernaError::invalid_argument("fuzzy text must not be empty"));
        }
        let max_edits = usize::try_from(max_edits).map_err(|_| {
            LucernaError::invalid_argument(format!(
                "max edits must not be negative, got {max_edits}"
            ))
        })?;

        Ok(FuzzyQuery {
            field,
            text,
            max_edits,
            prefix_length: 0,
            max_expansions: None,
            boost: 1.0,
        })
    }

    pub fn prefix_length(mut self, prefix_length: usize) -> Self {
        self.prefix_length = prefix_length;
        self
    }

    pub fn max_expansions(mut self, max_expansions: usize) -> Result<Self> {
        if max_expansions == 0 {
            return Err(LucernaError::invalid_argument(
                "max expansions must be at least 1",
            ));
        }
        self.max_expansions = Some(max_expansions);
        Ok(self)
    }

    pub fn with_boost(mut self, boost: f32) -> Result<Self> {
        self.boost = validate_boost(boost)?;
        Ok(self)
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn max_edits(&self) -> usize {
        self.max_edits
    }

    pub fn get_prefix_length(&self) -> usize {
        self.prefix_length
    }

    /// Cap on expanded terms; `None` means unbounded.
    pub fn get_max_expansions(&self) -> Option<usize> {
        self.max_expansions
    }

    pub fn boost(&self) -> f32 {
        self.boost
    }

    /// The exact-match prefix of the query text.
    pub fn required_prefix(&self) -> &str {
        match self.text.char_indices().nth(self.prefix_length) {
            Some((idx, _)) => &self.text[..idx],
            None => &self.text,
        }
    }

    /// Pick the vocabulary terms this query expands to.
    ///
    /// Returns `(term, distance)` pairs ordered by distance, then term, and
    /// capped at `max_expansions` when one is set.
    pub fn expand<'a, I>(&self, terms: I) -> Vec<(&'a str, usize)>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let matcher = LevenshteinMatcher::new(&self.text);
        let prefix = self.required_prefix();

        let mut candidates: Vec<(&'a str, usize)> = terms
            .into_iter()
            .filter(|term| term.starts_with(prefix))
            .filter_map(|term| {
                matcher
                    .distance_within(term, self.max_edits)
                    .map(|distance| (term, distance))
            })
            .collect();

        candidates.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        if let Some(max_expansions) = self.max_expansions {
            candidates.truncate(max_expansions);
        }
        candidates
    }
}

impl fmt::Display for FuzzyQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}~{}", self.field, self.text, self.max_edits)?;
        fmt_boost(f, self.boost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation() {
        assert!(FuzzyQuery::new("title", "apple", -1).is_err());
        assert!(FuzzyQuery::new("title", "", 1).is_err());
        assert!(FuzzyQuery::new("title", "apple", 0).is_ok());

        let query = FuzzyQuery::new("title", "apple", 2).unwrap();
        assert_eq!(query.get_max_expansions(), None);
        assert!(query.max_expansions(0).is_err());
    }

    #[test]
    fn test_expand_orders_by_distance() {
        let query = FuzzyQuery::new("title", "eaple", 2).unwrap();
        let vocabulary = ["apple", "eagle", "orange", "maple", "eaple"];

        let expanded = query.expand(vocabulary);
        assert_eq!(
            expanded,
            vec![("eaple", 0), ("eagle", 1), ("maple", 1), ("apple", 2)]
        );
    }

    #[test]
    fn test_max_expansions_caps_terms() {
        let query = FuzzyQuery::new("title", "cat", 1)
            .unwrap()
            .max_expansions(2)
            .unwrap();
        let expanded = query.expand(["bat", "cat", "cut", "hat"]);
        assert_eq!(expanded, vec![("cat", 0), ("bat", 1)]);
    }

    #[test]
    fn test_expansion_is_unbounded_by_default() {
        let query = FuzzyQuery::new("t", "5g", 2).unwrap();
        let vocabulary: Vec<String> = (0..100).map(|i| format!("{i}g")).collect();

        let expanded = query.expand(vocabulary.iter().map(String::as_str));
        assert_eq!(expanded.len(), 100);
        assert_eq!(expanded[0], ("5g", 0));
    }

    #[test]
    fn test_prefix_length() {
        let query = FuzzyQuery::new("title", "苹果手机", 1)
            .unwrap()
            .prefix_length(2);
        assert_eq!(query.required_prefix(), "苹果");

        let expanded = query.expand(["苹果手表", "平果手机"]);
        assert_eq!(expanded, vec![("苹果手表", 1)]);
    }

    #[test]
    fn test_display() {
        let query = FuzzyQuery::new("title", "eaple", 2).unwrap();
        assert_eq!(query.to_string(), "title:eaple~2");
    }
}
