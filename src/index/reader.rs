//! Point-in-time view of a committed index.

use std::sync::Arc;
use std::time::Instant;

use log::debug;

use crate::document::document::Document;
use crate::error::{LucernaError, Result};
use crate::index::DocId;
use crate::index::inverted::Term;
use crate::index::segment::{CommitPoint, Segment};
use crate::query::Query;
use crate::search::SearchResults;
use crate::search::searcher::Searcher;
use crate::search::similarity::{ClassicSimilarity, Similarity};
use crate::storage::Storage;

/// Searches the generation that was committed when it was opened.
///
/// Later commits are not visible until [`reopen`](Self::reopen) returns a
/// new reader. Clones share the loaded generation.
#[derive(Debug, Clone)]
pub struct IndexReader {
    storage: Arc<dyn Storage>,
    segment: Arc<Segment>,
    similarity: Arc<dyn Similarity>,
}

impl IndexReader {
    /// Open the committed generation; fails if nothing was ever committed.
    pub fn open(storage: Arc<dyn Storage>) -> Result<Self> {
        let (commit, segment) = Segment::load_committed(storage.as_ref())?
            .ok_or_else(|| LucernaError::illegal_state("no committed index to read"))?;
        debug!(
            "opened reader on generation {} ({} docs)",
            commit.generation, commit.doc_count
        );

        Ok(IndexReader {
            storage,
            segment: Arc::new(segment),
            similarity: Arc::new(ClassicSimilarity::new()),
        })
    }

    /// Use a different similarity for scoring.
    pub fn with_similarity(mut self, similarity: Arc<dyn Similarity>) -> Self {
        self.similarity = similarity;
        self
    }

    /// A reader on the latest commit, or `None` if nothing changed.
    pub fn reopen(&self) -> Result<Option<IndexReader>> {
        match CommitPoint::read(self.storage.as_ref())? {
            Some(commit) if commit.generation != self.generation() => {
                let reader = IndexReader::open(Arc::clone(&self.storage))?
                    .with_similarity(Arc::clone(&self.similarity));
                Ok(Some(reader))
            }
            _ => Ok(None),
        }
    }

    /// Run a query and return at most `top_n` hits.
    pub fn search(&self, query: &Query, top_n: usize) -> Result<SearchResults> {
        let start = Instant::now();
        let results = self.searcher().search(query, top_n)?;
        debug!(
            "query {query} matched {} docs in {:?}",
            results.total_hits,
            start.elapsed()
        );
        Ok(results)
    }

    /// Like [`search`](Self::search), with each hit's stored fields attached.
    pub fn search_with_documents(&self, query: &Query, top_n: usize) -> Result<SearchResults> {
        let mut results = self.search(query, top_n)?;
        for hit in &mut results.hits {
            hit.document = self.fetch(hit.doc_id);
        }
        Ok(results)
    }

    /// Number of documents matching a query.
    pub fn count(&self, query: &Query) -> Result<u64> {
        self.searcher().count(query)
    }

    /// Stored fields of a document.
    pub fn fetch(&self, doc_id: DocId) -> Option<Document> {
        self.segment.store().get(doc_id)
    }

    pub fn num_docs(&self) -> u64 {
        self.segment.num_docs()
    }

    /// One past the highest doc id ever assigned in this index.
    pub fn max_doc(&self) -> DocId {
        self.segment.next_doc_id()
    }

    pub fn generation(&self) -> u64 {
        self.segment.generation()
    }

    /// Number of documents containing a term.
    pub fn doc_freq(&self, term: &Term) -> u64 {
        self.segment.inverted().doc_freq(term)
    }

    /// Indexed field names, text and numeric, sorted.
    pub fn field_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .segment
            .inverted()
            .field_names()
            .into_iter()
            .chain(self.segment.doc_values().field_names())
            .map(str::to_string)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    fn searcher(&self) -> Searcher<'_> {
        Searcher::new(&self.segment, self.similarity.as_ref())
    }
}
