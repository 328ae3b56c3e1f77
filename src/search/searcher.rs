//! Query evaluation over one generation.

use std::collections::BTreeMap;

use ahash::AHashSet;
use log::trace;

use crate::error::Result;
use crate::index::DocId;
use crate::index::posting::PostingList;
use crate::index::segment::Segment;
use crate::query::Query;
use crate::query::boolean::{BooleanQuery, Occur};
use crate::query::fuzzy::FuzzyQuery;
use crate::query::range::NumericRangeQuery;
use crate::query::term::TermQuery;
use crate::query::wildcard::WildcardQuery;
use crate::search::SearchResults;
use crate::search::collector::TopDocsCollector;
use crate::search::similarity::Similarity;

/// Matching documents and their scores, ordered by doc id.
pub type DocScores = BTreeMap<DocId, f32>;

/// Evaluates queries against an immutable generation.
#[derive(Debug, Clone, Copy)]
pub struct Searcher<'a> {
    segment: &'a Segment,
    similarity: &'a dyn Similarity,
}

impl<'a> Searcher<'a> {
    pub fn new(segment: &'a Segment, similarity: &'a dyn Similarity) -> Self {
        Searcher {
            segment,
            similarity,
        }
    }

    /// Run a query and keep the `top_n` best hits.
    pub fn search(&self, query: &Query, top_n: usize) -> Result<SearchResults> {
        let scores = self.evaluate(query)?;

        let mut collector = TopDocsCollector::new(top_n);
        for (doc_id, score) in scores {
            collector.collect(doc_id, score);
        }
        Ok(collector.into_results())
    }

    /// Number of documents matching a query.
    pub fn count(&self, query: &Query) -> Result<u64> {
        Ok(self.evaluate(query)?.len() as u64)
    }

    /// Every matching document with its score.
    pub fn evaluate(&self, query: &Query) -> Result<DocScores> {
        let scores = match query {
            Query::Term(q) => self.term_scores(q),
            Query::NumericRange(q) => self.range_scores(q),
            Query::Wildcard(q) => self.wildcard_scores(q),
            Query::Fuzzy(q) => self.fuzzy_scores(q),
            Query::MatchAll(q) => self.constant_scores(self.segment.store().doc_ids(), q.boost()),
            Query::Boolean(q) => self.boolean_scores(q)?,
        };
        trace!("{query} matched {} docs", scores.len());
        Ok(scores)
    }

    fn num_docs(&self) -> u64 {
        self.segment.num_docs()
    }

    /// Add `scale` times each posting's term weight to `scores`.
    fn accumulate(&self, scores: &mut DocScores, postings: &PostingList, scale: f32) {
        let doc_freq = postings.doc_frequency();
        let num_docs = self.num_docs();
        for posting in postings.iter() {
            let weight = self
                .similarity
                .term_weight(posting.frequency, doc_freq, num_docs);
            *scores.entry(posting.doc_id).or_insert(0.0) += weight * scale;
        }
    }

    fn constant_scores<I>(&self, docs: I, score: f32) -> DocScores
    where
        I: IntoIterator<Item = DocId>,
    {
        docs.into_iter().map(|doc_id| (doc_id, score)).collect()
    }

    fn term_scores(&self, query: &TermQuery) -> DocScores {
        let mut scores = DocScores::new();
        if let Some(postings) = self.segment.inverted().postings(query.term()) {
            self.accumulate(&mut scores, postings, query.boost());
        }
        scores
    }

    fn range_scores(&self, query: &NumericRangeQuery) -> DocScores {
        let docs = self.segment.doc_values().range(
            query.field(),
            query.min(),
            query.max(),
            query.min_inclusive(),
            query.max_inclusive(),
        );
        self.constant_scores(docs, query.boost())
    }

    fn wildcard_scores(&self, query: &WildcardQuery) -> DocScores {
        let prefix = query.scan_prefix();
        let match_all_terms = query.matches_everything();

        let mut scores = DocScores::new();
        let mut expanded = 0usize;
        for (text, postings) in self
            .segment
            .inverted()
            .terms_with_prefix(query.field(), &prefix)
        {
            if match_all_terms || query.matches(text) {
                self.accumulate(&mut scores, postings, query.boost());
                expanded += 1;
            }
        }
        trace!("{query} expanded to {expanded} terms");
        scores
    }

    fn fuzzy_scores(&self, query: &FuzzyQuery) -> DocScores {
        let vocabulary: Vec<(&str, &PostingList)> = self
            .segment
            .inverted()
            .terms_with_prefix(query.field(), query.required_prefix())
            .collect();
        let expanded = query.expand(vocabulary.iter().map(|(text, _)| *text));
        trace!("{query} expanded to {} terms", expanded.len());

        let mut scores = DocScores::new();
        for (text, distance) in expanded {
            if let Ok(idx) = vocabulary.binary_search_by(|(t, _)| (*t).cmp(text)) {
                let scale = query.boost() / (1.0 + distance as f32);
                self.accumulate(&mut scores, vocabulary[idx].1, scale);
            }
        }
        scores
    }

    fn boolean_scores(&self, query: &BooleanQuery) -> Result<DocScores> {
        let mut required: Option<DocScores> = None;
        let mut optional: Vec<DocScores> = Vec::new();
        let mut excluded: AHashSet<DocId> = AHashSet::new();

        for clause in query.clauses() {
            let scores = self.evaluate(&clause.query)?;
            match clause.occur {
                Occur::Must => {
                    required = Some(match required {
                        None => scores,
                        Some(mut acc) => {
                            acc.retain(|doc_id, score| match scores.get(doc_id) {
                                Some(other) => {
                                    *score += other;
                                    true
                                }
                                None => false,
                            });
                            acc
                        }
                    })
                }
                Occur::Should => optional.push(scores),
                Occur::MustNot => excluded.extend(scores.into_keys()),
            }
        }

        if required.is_none() && optional.is_empty() {
            let docs = self
                .segment
                .store()
                .doc_ids()
                .filter(|doc_id| !excluded.contains(doc_id));
            return Ok(self.constant_scores(docs, query.boost()));
        }

        // Without MUST clauses at least one SHOULD clause has to match.
        let min_should = match required {
            Some(_) => query.minimum_should_match(),
            None => query.minimum_should_match().max(1),
        };
        let candidates = match required {
            Some(scores) => scores,
            None => {
                let mut union = DocScores::new();
                for scores in &optional {
                    for doc_id in scores.keys() {
                        union.insert(*doc_id, 0.0);
                    }
                }
                union
            }
        };

        let mut result = DocScores::new();
        for (doc_id, mut score) in candidates {
            if excluded.contains(&doc_id) {
                continue;
            }
            let mut matched = 0usize;
            for scores in &optional {
                if let Some(should_score) = scores.get(&doc_id) {
                    score += should_score;
                    matched += 1;
                }
            }
            if matched >= min_should {
                result.insert(doc_id, score * query.boost());
            }
        }
        Ok(result)
    }
}
