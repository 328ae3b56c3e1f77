//! Index writer.
//!
//! The writer owns the storage's `write.lock` for its whole lifetime and
//! builds the next generation in memory. Nothing it does is visible to
//! readers until [`IndexWriter::commit`] (or [`IndexWriter::close`]) writes the
//! generation file and swaps the commit point. Dropping a writer without
//! closing it discards uncommitted work and releases the lock.

use std::sync::Arc;

use ahash::AHashMap;
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::chinese::ChineseAnalyzer;
use crate::analysis::tokenize;
use crate::document::document::Document;
use crate::document::field::{Field, FieldValue, Numeric};
use crate::error::{LucernaError, Result};
use crate::index::segment::{
    CommitPoint, Segment, parse_segment_file_name, segment_file_name,
};
use crate::index::{DocId, OpenMode};
use crate::storage::{Storage, StorageLock};

/// Name of the exclusive writer lock.
pub const WRITE_LOCK: &str = "write.lock";

/// Configuration for [`IndexWriter`].
#[derive(Clone)]
pub struct IndexWriterConfig {
    /// How to treat an existing index.
    pub open_mode: OpenMode,

    /// Analyzer for tokenized text fields.
    pub analyzer: Arc<dyn Analyzer>,

    /// Record token positions in postings.
    pub store_positions: bool,
}

impl std::fmt::Debug for IndexWriterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexWriterConfig")
            .field("open_mode", &self.open_mode)
            .field("analyzer", &self.analyzer.name())
            .field("store_positions", &self.store_positions)
            .finish()
    }
}

impl Default for IndexWriterConfig {
    fn default() -> Self {
        IndexWriterConfig {
            open_mode: OpenMode::default(),
            analyzer: Arc::new(ChineseAnalyzer::new()),
            store_positions: true,
        }
    }
}

/// Counters describing the writer's pending generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// Documents admitted by this writer.
    pub docs_added: u64,
    /// Distinct (field, term) pairs in the pending generation.
    pub unique_terms: u64,
    /// Postings in the pending generation.
    pub total_postings: u64,
    /// Successful commits by this writer.
    pub commits: u64,
}

/// A term with its positions inside one document.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedTerm {
    pub field: String,
    pub text: String,
    pub positions: Vec<u32>,
}

/// A document broken down into what each index structure needs.
#[derive(Debug, Clone, Default)]
pub struct AnalyzedDocument {
    pub terms: Vec<AnalyzedTerm>,
    pub numerics: Vec<(String, Numeric)>,
    pub stored: Vec<Field>,
}

/// Validate and analyze a document without touching any index state.
pub fn analyze_document(doc: &Document, analyzer: &dyn Analyzer) -> Result<AnalyzedDocument> {
    doc.validate()?;

    let mut terms: AHashMap<(&str, String), Vec<u32>> = AHashMap::new();
    let mut next_position: AHashMap<&str, u32> = AHashMap::new();
    let mut analyzed = AnalyzedDocument::default();

    for field in doc.fields() {
        let name = field.name();
        match field.value() {
            FieldValue::Text(text) | FieldValue::Exact(text) => {
                // Repeated values of one field continue the position sequence.
                let base = next_position.get(name).copied().unwrap_or(0);
                let mut end = base;
                for token in tokenize(name, text, field.kind(), analyzer)? {
                    if token.is_empty() {
                        continue;
                    }
                    let position = base + token.position as u32;
                    end = end.max(position + 1);
                    terms.entry((name, token.text)).or_default().push(position);
                }
                next_position.insert(name, end);
            }
            FieldValue::Numeric(value) => analyzed.numerics.push((name.to_string(), *value)),
            FieldValue::StoredOnly(_) => {}
        }

        if field.is_stored() {
            analyzed.stored.push(field.clone());
        }
    }

    analyzed.terms = terms
        .into_iter()
        .map(|((field, text), positions)| AnalyzedTerm {
            field: field.to_string(),
            text,
            positions,
        })
        .collect();
    analyzed
        .terms
        .sort_by(|a, b| (&a.field, &a.text).cmp(&(&b.field, &b.text)));

    Ok(analyzed)
}

/// Single writer of an index.
pub struct IndexWriter {
    storage: Arc<dyn Storage>,
    config: IndexWriterConfig,
    lock: Option<Box<dyn StorageLock>>,
    segment: Segment,
    last_generation: u64,
    dirty: bool,
    closed: bool,
    stats: WriterStats,
}

impl std::fmt::Debug for IndexWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexWriter")
            .field("config", &self.config)
            .field("last_generation", &self.last_generation)
            .field("next_doc_id", &self.segment.next_doc_id())
            .field("dirty", &self.dirty)
            .field("closed", &self.closed)
            .field("stats", &self.stats)
            .finish()
    }
}

impl IndexWriter {
    /// Open a writer, taking the write lock.
    pub fn open(storage: Arc<dyn Storage>, config: IndexWriterConfig) -> Result<Self> {
        let lock = storage.try_lock(WRITE_LOCK)?.ok_or_else(|| {
            LucernaError::illegal_state(format!(
                "index is locked by another writer ({WRITE_LOCK} is held)"
            ))
        })?;

        let commit = CommitPoint::read(storage.as_ref())?;
        let last_generation = commit.as_ref().map_or(0, |c| c.generation);

        let (segment, dirty) = match (config.open_mode, commit) {
            (OpenMode::Create, _) | (OpenMode::CreateOrAppend, None) => (Segment::empty(), true),
            (OpenMode::Append, None) => {
                return Err(LucernaError::illegal_state(
                    "cannot append: no committed index exists",
                ));
            }
            (OpenMode::Append, Some(_)) | (OpenMode::CreateOrAppend, Some(_)) => {
                match Segment::load_committed(storage.as_ref())? {
                    Some((_, segment)) => (segment, false),
                    None => {
                        return Err(LucernaError::illegal_state(
                            "commit point disappeared while opening writer",
                        ));
                    }
                }
            }
        };

        info!(
            "opened index writer (mode {:?}, generation {last_generation}, next doc id {})",
            config.open_mode,
            segment.next_doc_id()
        );

        Ok(IndexWriter {
            storage,
            config,
            lock: Some(lock),
            segment,
            last_generation,
            dirty,
            closed: false,
            stats: WriterStats::default(),
        })
    }

    /// Admit one document and return its id.
    pub fn add_document(&mut self, doc: Document) -> Result<DocId> {
        self.check_closed()?;

        let analyzed = analyze_document(&doc, self.config.analyzer.as_ref())?;
        Ok(self.add_analyzed_document(analyzed))
    }

    /// Admit a batch of documents.
    ///
    /// Documents are analyzed in parallel; ids are assigned in input order.
    /// If any document is invalid, none of the batch is admitted.
    pub fn add_documents(&mut self, docs: Vec<Document>) -> Result<Vec<DocId>> {
        self.check_closed()?;

        let analyzer = self.config.analyzer.as_ref();
        let analyzed = docs
            .par_iter()
            .map(|doc| analyze_document(doc, analyzer))
            .collect::<Result<Vec<_>>>()?;

        Ok(analyzed
            .into_iter()
            .map(|doc| self.add_analyzed_document(doc))
            .collect())
    }

    fn add_analyzed_document(&mut self, analyzed: AnalyzedDocument) -> DocId {
        let doc_id = self.segment.allocate_doc_id();
        let store_positions = self.config.store_positions;

        for term in analyzed.terms {
            let frequency = term.positions.len() as u32;
            let positions = store_positions.then_some(term.positions);
            self.segment
                .inverted_mut()
                .add(&term.field, &term.text, doc_id, frequency, positions);
        }

        for (field, value) in analyzed.numerics {
            self.segment.doc_values_mut().add(&field, doc_id, value);
        }

        self.segment.store_mut().insert(doc_id, analyzed.stored);

        self.stats.docs_added += 1;
        self.dirty = true;
        doc_id
    }

    /// Publish the pending generation.
    ///
    /// A no-op when nothing changed since the last commit.
    pub fn commit(&mut self) -> Result<()> {
        self.check_closed()?;

        if !self.dirty {
            debug!("commit skipped: no pending changes");
            return Ok(());
        }

        let generation = self.last_generation + 1;
        let file = segment_file_name(generation);
        self.segment.set_generation(generation);

        let checksum = self.segment.write(self.storage.as_ref(), &file)?;
        let commit = CommitPoint {
            generation,
            file,
            doc_count: self.segment.num_docs(),
            next_doc_id: self.segment.next_doc_id(),
            checksum,
        };
        commit.write(self.storage.as_ref())?;

        self.last_generation = generation;
        self.dirty = false;
        self.stats.commits += 1;
        self.delete_stale_generations(generation);

        info!(
            "committed generation {generation} ({} docs)",
            commit.doc_count
        );
        Ok(())
    }

    /// Remove generation files other than the live one and its predecessor.
    fn delete_stale_generations(&self, live: u64) {
        let files = match self.storage.list_files() {
            Ok(files) => files,
            Err(e) => {
                warn!("could not list index files for cleanup: {e}");
                return;
            }
        };

        for name in files {
            let Some(generation) = parse_segment_file_name(&name) else {
                continue;
            };
            if generation + 1 >= live && generation <= live {
                continue;
            }
            match self.storage.delete_file(&name) {
                Ok(()) => debug!("deleted stale generation file {name}"),
                Err(e) => warn!("could not delete stale generation file {name}: {e}"),
            }
        }
    }

    /// Discard uncommitted changes and close the writer.
    pub fn rollback(&mut self) -> Result<()> {
        self.check_closed()?;

        if self.dirty {
            info!(
                "rolling back {} uncommitted documents",
                self.stats.docs_added
            );
        }
        self.release();
        Ok(())
    }

    /// Commit pending changes and release the write lock.
    pub fn close(&mut self) -> Result<()> {
        self.check_closed()?;

        self.commit()?;
        self.release();
        Ok(())
    }

    fn release(&mut self) {
        self.closed = true;
        if let Some(mut lock) = self.lock.take() {
            if let Err(e) = lock.release() {
                warn!("failed to release {WRITE_LOCK}: {e}");
            }
        }
    }

    fn check_closed(&self) -> Result<()> {
        if self.closed {
            Err(LucernaError::illegal_state("index writer is closed"))
        } else {
            Ok(())
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Documents in the pending generation (committed plus newly added).
    pub fn num_docs(&self) -> u64 {
        self.segment.num_docs()
    }

    /// The id the next admitted document will get.
    pub fn next_doc_id(&self) -> DocId {
        self.segment.next_doc_id()
    }

    /// Last committed generation, 0 if none.
    pub fn generation(&self) -> u64 {
        self.last_generation
    }

    pub fn has_uncommitted_changes(&self) -> bool {
        self.dirty
    }

    pub fn stats(&self) -> WriterStats {
        WriterStats {
            unique_terms: self.segment.inverted().term_count() as u64,
            total_postings: self.segment.inverted().posting_count() as u64,
            ..self.stats.clone()
        }
    }

    pub fn config(&self) -> &IndexWriterConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }
}

impl Drop for IndexWriter {
    fn drop(&mut self) {
        if !self.closed {
            if self.dirty {
                warn!("index writer dropped without close; discarding uncommitted changes");
            }
            self.release();
        }
    }
}
