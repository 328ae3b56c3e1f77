//! Term weighting.

use std::fmt::Debug;

/// Computes how much a term occurrence contributes to a document's score.
pub trait Similarity: Send + Sync + Debug {
    /// Rarity of a term among `num_docs` documents.
    fn idf(&self, doc_freq: u64, num_docs: u64) -> f32;

    /// Weight of a term occurring `freq` times in one document.
    fn tf(&self, freq: u32) -> f32;

    /// Weight of one term in one document.
    fn term_weight(&self, freq: u32, doc_freq: u64, num_docs: u64) -> f32 {
        self.tf(freq) * self.idf(doc_freq, num_docs)
    }

    fn name(&self) -> &'static str;
}

/// TF-IDF weighting with logarithmic term frequency.
///
/// `tf = 1 + ln(freq)` and `idf = 1 + ln(num_docs / (doc_freq + 1))`.
/// Because `doc_freq <= num_docs`, idf stays above `1 - ln 2`, so every
/// matching term adds a positive weight.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicSimilarity;

impl ClassicSimilarity {
    pub fn new() -> Self {
        ClassicSimilarity
    }
}

impl Similarity for ClassicSimilarity {
    fn idf(&self, doc_freq: u64, num_docs: u64) -> f32 {
        let num_docs = num_docs.max(doc_freq) as f64;
        (1.0 + (num_docs / (doc_freq as f64 + 1.0)).ln()) as f32
    }

    fn tf(&self, freq: u32) -> f32 {
        if freq == 0 {
            0.0
        } else {
            1.0 + (freq as f32).ln()
        }
    }

    fn name(&self) -> &'static str {
        "classic"
    }
}
