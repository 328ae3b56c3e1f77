//! Collector that keeps the top N documents by score.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::index::DocId;
use crate::search::{SearchHit, SearchResults};

/// Keeps the `max_docs` best hits: higher score first, lower doc id on ties.
#[derive(Debug)]
pub struct TopDocsCollector {
    max_docs: usize,
    /// Worst retained hit on top.
    hits: BinaryHeap<ScoredDoc>,
    total_hits: u64,
    max_score: f32,
}

#[derive(Debug, Clone, Copy)]
struct ScoredDoc {
    doc_id: DocId,
    score: f32,
}

impl ScoredDoc {
    /// Rank order: `Less` means `self` ranks ahead of `other`.
    fn rank(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.doc_id.cmp(&other.doc_id))
    }
}

impl PartialEq for ScoredDoc {
    fn eq(&self, other: &Self) -> bool {
        self.rank(other) == Ordering::Equal
    }
}

impl Eq for ScoredDoc {}

impl PartialOrd for ScoredDoc {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredDoc {
    // Max-heap on rank puts the lowest ranked hit on top.
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank(other)
    }
}

impl TopDocsCollector {
    pub fn new(max_docs: usize) -> Self {
        TopDocsCollector {
            max_docs,
            hits: BinaryHeap::with_capacity(max_docs.min(1024)),
            total_hits: 0,
            max_score: 0.0,
        }
    }

    pub fn max_docs(&self) -> usize {
        self.max_docs
    }

    pub fn total_hits(&self) -> u64 {
        self.total_hits
    }

    /// Record a matching document.
    pub fn collect(&mut self, doc_id: DocId, score: f32) {
        self.total_hits += 1;
        if score > self.max_score {
            self.max_score = score;
        }
        if self.max_docs == 0 {
            return;
        }

        let doc = ScoredDoc { doc_id, score };
        if self.hits.len() < self.max_docs {
            self.hits.push(doc);
        } else if let Some(worst) = self.hits.peek() {
            if doc.rank(worst) == Ordering::Less {
                self.hits.pop();
                self.hits.push(doc);
            }
        }
    }

    /// Final results in rank order.
    pub fn into_results(self) -> SearchResults {
        let hits = self
            .hits
            .into_sorted_vec()
            .into_iter()
            .map(|doc| SearchHit {
                doc_id: doc.doc_id,
                score: doc.score,
                document: None,
            })
            .collect();

        SearchResults {
            hits,
            total_hits: self.total_hits,
            max_score: self.max_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_top_n_in_rank_order() {
        let mut collector = TopDocsCollector::new(3);
        for (doc_id, score) in [(1, 0.5), (2, 2.0), (3, 1.0), (4, 3.0), (5, 0.1)] {
            collector.collect(doc_id, score);
        }

        let results = collector.into_results();
        assert_eq!(results.doc_ids(), vec![4, 2, 3]);
        assert_eq!(results.total_hits, 5);
        assert_eq!(results.max_score, 3.0);
    }

    #[test]
    fn test_ties_break_on_doc_id() {
        let mut collector = TopDocsCollector::new(2);
        for doc_id in [7, 3, 9, 1] {
            collector.collect(doc_id, 1.0);
        }

        assert_eq!(collector.into_results().doc_ids(), vec![1, 3]);
    }

    #[test]
    fn test_zero_top_n_still_counts() {
        let mut collector = TopDocsCollector::new(0);
        collector.collect(1, 1.0);
        collector.collect(2, 2.0);

        let results = collector.into_results();
        assert!(results.is_empty());
        assert_eq!(results.total_hits, 2);
        assert_eq!(results.max_score, 2.0);
    }

    #[test]
    fn test_no_matches() {
        let results = TopDocsCollector::new(10).into_results();
        assert!(results.is_empty());
        assert_eq!(results.total_hits, 0);
        assert_eq!(results.max_score, 0.0);
    }
}
