//! Generations and commit points.
//!
//! A [`Segment`] is one immutable generation of the index: document store,
//! inverted index, numeric doc values and the next doc id to assign. It is
//! written to `gen_NNNNNN.idx` with a checksum footer. The [`CommitPoint`]
//! in `commit.json` names the generation currently visible to readers; it is
//! replaced by writing a temporary file and renaming it over the old one.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{LucernaError, Result};
use crate::index::DocId;
use crate::index::doc_values::DocValues;
use crate::index::inverted::InvertedIndex;
use crate::index::store::DocumentStore;
use crate::storage::Storage;
use crate::storage::structured::{StructReader, StructWriter};

/// Name of the commit point file.
pub const COMMIT_FILE: &str = "commit.json";

const COMMIT_TEMP_FILE: &str = "commit.json.tmp";
const MAGIC: &[u8; 4] = b"LCRN";
const FORMAT_VERSION: u32 = 1;
const OPEN_ATTEMPTS: usize = 3;

/// File name of a generation.
pub fn segment_file_name(generation: u64) -> String {
    format!("gen_{generation:06}.idx")
}

/// Generation number encoded in a file name, if it is a generation file.
pub fn parse_segment_file_name(name: &str) -> Option<u64> {
    name.strip_prefix("gen_")?.strip_suffix(".idx")?.parse().ok()
}

/// The committed state: which generation file is live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitPoint {
    pub generation: u64,
    pub file: String,
    pub doc_count: u64,
    pub next_doc_id: DocId,
    pub checksum: u32,
}

impl CommitPoint {
    /// Read `commit.json`; `Ok(None)` when nothing was ever committed.
    pub fn read(storage: &dyn Storage) -> Result<Option<CommitPoint>> {
        if !storage.file_exists(COMMIT_FILE) {
            return Ok(None);
        }

        let input = storage.open_input(COMMIT_FILE)?;
        let commit: CommitPoint = serde_json::from_reader(input)?;
        Ok(Some(commit))
    }

    /// Atomically publish this commit point.
    pub fn write(&self, storage: &dyn Storage) -> Result<()> {
        let mut output = storage.create_output(COMMIT_TEMP_FILE)?;
        serde_json::to_writer_pretty(&mut output, self)?;
        output.flush_and_sync()?;
        output.close()?;
        storage.rename_file(COMMIT_TEMP_FILE, COMMIT_FILE)
    }
}

/// One immutable generation of the index.
#[derive(Debug, Clone)]
pub struct Segment {
    generation: u64,
    next_doc_id: DocId,
    store: DocumentStore,
    inverted: InvertedIndex,
    doc_values: DocValues,
}

impl Segment {
    /// An empty generation 0 whose first doc id is 1.
    pub fn empty() -> Self {
        Segment {
            generation: 0,
            next_doc_id: 1,
            store: DocumentStore::new(),
            inverted: InvertedIndex::new(),
            doc_values: DocValues::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }

    pub fn next_doc_id(&self) -> DocId {
        self.next_doc_id
    }

    /// Reserve the next doc id.
    pub fn allocate_doc_id(&mut self) -> DocId {
        let doc_id = self.next_doc_id;
        self.next_doc_id += 1;
        doc_id
    }

    pub fn num_docs(&self) -> u64 {
        self.store.len() as u64
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut DocumentStore {
        &mut self.store
    }

    pub fn inverted(&self) -> &InvertedIndex {
        &self.inverted
    }

    pub fn inverted_mut(&mut self) -> &mut InvertedIndex {
        &mut self.inverted
    }

    pub fn doc_values(&self) -> &DocValues {
        &self.doc_values
    }

    pub fn doc_values_mut(&mut self) -> &mut DocValues {
        &mut self.doc_values
    }

    /// Write this generation to `name`, returning the file checksum.
    pub fn write(&self, storage: &dyn Storage, name: &str) -> Result<u32> {
        let mut writer = StructWriter::new(storage.create_output(name)?);

        writer.write_raw(MAGIC)?;
        writer.write_u32(FORMAT_VERSION)?;
        writer.write_u64(self.generation)?;
        writer.write_u64(self.next_doc_id)?;
        self.store.encode(&mut writer)?;
        self.inverted.encode(&mut writer)?;
        self.doc_values.encode(&mut writer)?;

        let size = writer.position();
        let checksum = writer.close()?;
        debug!("wrote {name}: {size} bytes, checksum {checksum:#010x}");
        Ok(checksum)
    }

    /// Read and verify a generation file.
    pub fn read(storage: &dyn Storage, name: &str) -> Result<Segment> {
        let mut reader = StructReader::new(storage.open_input(name)?)?;

        if reader.read_raw(MAGIC.len())? != MAGIC {
            return Err(LucernaError::corrupt(format!("{name} is not a generation file")));
        }
        let version = reader.read_u32()?;
        if version != FORMAT_VERSION {
            return Err(LucernaError::corrupt(format!(
                "{name} has unsupported format version {version}"
            )));
        }

        let generation = reader.read_u64()?;
        let next_doc_id = reader.read_u64()?;
        let store = DocumentStore::decode(&mut reader)?;
        let inverted = InvertedIndex::decode(&mut reader)?;
        let doc_values = DocValues::decode(&mut reader)?;

        if !reader.is_eof() {
            return Err(LucernaError::corrupt(format!(
                "{name} has {} trailing bytes",
                reader.remaining()
            )));
        }
        if store.max_doc_id().is_some_and(|max| max >= next_doc_id) {
            return Err(LucernaError::corrupt(format!(
                "{name} contains doc ids beyond its next doc id {next_doc_id}"
            )));
        }

        Ok(Segment {
            generation,
            next_doc_id,
            store,
            inverted,
            doc_values,
        })
    }

    /// Load the generation named by the commit point.
    ///
    /// Returns `Ok(None)` if nothing has been committed. If a concurrent
    /// commit removes the file between reading the commit point and opening
    /// the generation, the newer commit point is tried instead.
    pub fn load_committed(storage: &dyn Storage) -> Result<Option<(CommitPoint, Segment)>> {
        let mut attempt = 0;
        loop {
            let commit = match CommitPoint::read(storage)? {
                Some(commit) => commit,
                None => return Ok(None),
            };

            match Self::load_commit(storage, &commit) {
                Ok(segment) => return Ok(Some((commit, segment))),
                Err(e) => {
                    attempt += 1;
                    let current = CommitPoint::read(storage)?;
                    let moved_on = current.is_some_and(|c| c.generation != commit.generation);
                    if !moved_on || attempt >= OPEN_ATTEMPTS {
                        return Err(e);
                    }
                    debug!(
                        "generation {} went away while opening, retrying",
                        commit.generation
                    );
                }
            }
        }
    }

    fn load_commit(storage: &dyn Storage, commit: &CommitPoint) -> Result<Segment> {
        let segment = Self::read(storage, &commit.file)?;

        if segment.generation != commit.generation {
            return Err(LucernaError::corrupt(format!(
                "commit point names generation {} but {} holds {}",
                commit.generation, commit.file, segment.generation
            )));
        }
        if segment.num_docs() != commit.doc_count {
            return Err(LucernaError::corrupt(format!(
                "commit point records {} docs but {} holds {}",
                commit.doc_count,
                commit.file,
                segment.num_docs()
            )));
        }

        Ok(segment)
    }
}

impl Default for Segment {
    fn default() -> Self {
        Self::empty()
    }
}
