//! Query execution and scoring.
//!
//! A [`searcher::Searcher`] evaluates a [`Query`](crate::query::Query)
//! against one committed generation, scores matches with a
//! [`similarity::Similarity`] and keeps the best ones with a
//! [`collector::TopDocsCollector`].

use serde::{Deserialize, Serialize};

use crate::document::document::Document;
use crate::index::DocId;

pub mod collector;
pub mod searcher;
pub mod similarity;

/// A single scored match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: f32,
    /// Stored fields, when the request asked for them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<Document>,
}

/// Ranked results of a search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    /// Hits ordered by score descending, then doc id ascending.
    pub hits: Vec<SearchHit>,
    /// Number of matching documents, including those beyond `top_n`.
    pub total_hits: u64,
    /// Highest score among all matches; 0 when nothing matched.
    pub max_score: f32,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Doc ids of the hits, in rank order.
    pub fn doc_ids(&self) -> Vec<DocId> {
        self.hits.iter().map(|hit| hit.doc_id).collect()
    }
}
