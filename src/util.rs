//! Shared utilities for the index codec and fuzzy matching.

pub mod levenshtein;
pub mod varint;
