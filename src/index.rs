//! Index storage, writing and reading.
//!
//! An index directory holds immutable generation files plus a commit point
//! naming the live one. A single [`IndexWriter`] (guarded by the storage's
//! `write.lock`) builds the next generation; any number of [`IndexReader`]s
//! search the generation that was committed when they were opened.
//!
//! # Examples
//!
//! ```
//! use lucerna::document::document::Document;
//! use lucerna::index::{open_reader, open_writer, OpenMode};
//! use lucerna::query::Query;
//! use lucerna::query::term::TermQuery;
//!
//! # fn main() -> lucerna::error::Result<()> {
//! let dir = tempfile::TempDir::new()?;
//!
//! let mut writer = open_writer(dir.path(), OpenMode::Create)?;
//! let id = writer.add_document(
//!     Document::builder()
//!         .add_numeric("id", 1)
//!         .add_text("title", "Apple/苹果 iPhone")
//!         .build(),
//! )?;
//! writer.close()?;
//! assert_eq!(id, 1);
//!
//! let reader = open_reader(dir.path())?;
//! let results = reader.search(&Query::from(TermQuery::new("title", "苹果")?), 10)?;
//! assert_eq!(results.total_hits, 1);
//! assert_eq!(results.hits[0].doc_id, 1);
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{LucernaError, Result};
use crate::storage::file::FileStorage;

pub mod doc_values;
pub mod inverted;
pub mod posting;
pub mod reader;
pub mod segment;
pub mod store;
pub mod writer;

pub use reader::IndexReader;
pub use writer::{IndexWriter, IndexWriterConfig, WriterStats};

/// Document identifier, assigned sequentially from 1 within an index.
pub type DocId = u64;

/// How a writer treats an existing index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OpenMode {
    /// Start a new, empty index; the old one stays visible until the first commit.
    Create,
    /// Extend the committed index; fails if there is none.
    Append,
    /// Append if an index exists, create one otherwise.
    #[default]
    CreateOrAppend,
}

/// Open a writer on an index directory with the default configuration.
pub fn open_writer<P: AsRef<Path>>(path: P, mode: OpenMode) -> Result<IndexWriter> {
    let storage = Arc::new(FileStorage::open(path)?);
    let config = IndexWriterConfig {
        open_mode: mode,
        ..IndexWriterConfig::default()
    };
    IndexWriter::open(storage, config)
}

/// Open a reader on the committed generation of an index directory.
///
/// Fails with [`LucernaError::IllegalState`] if the directory does not exist
/// or holds no commit.
pub fn open_reader<P: AsRef<Path>>(path: P) -> Result<IndexReader> {
    let path = path.as_ref();
    if !path.is_dir() {
        return Err(LucernaError::illegal_state(format!(
            "no index at {}",
            path.display()
        )));
    }
    let storage = Arc::new(FileStorage::open(path)?);
    IndexReader::open(storage)
}
