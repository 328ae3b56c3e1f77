//! # Lucerna
//!
//! An embeddable full-text search library with an inverted index,
//! Chinese-aware analysis and a Lucene-style query model.
//!
//! ## Features
//!
//! - Jieba-based Chinese segmentation alongside Unicode word analysis
//! - Stored, tokenized, exact and numeric fields
//! - Term, numeric range, wildcard, fuzzy, match-all and boolean queries
//! - TF-IDF ranking with top-N collection
//! - Crash-safe generation files with atomic commit points
//!
//! ## Example
//!
//! ```
//! use lucerna::prelude::*;
//! use lucerna::query::parser::QueryParser;
//! use lucerna::analysis::analyzer::chinese::ChineseAnalyzer;
//! use std::sync::Arc;
//!
//! # fn main() -> lucerna::Result<()> {
//! let dir = tempfile::TempDir::new()?;
//!
//! let mut writer = open_writer(dir.path(), OpenMode::Create)?;
//! for i in 1..=3i64 {
//!     writer.add_document(
//!         Document::builder()
//!             .add_numeric("id", i)
//!             .add_text("title", format!("{i}我爱爪哇 Apple/苹果 iPhone"))
//!             .build(),
//!     )?;
//! }
//! writer.close()?;
//!
//! let reader = open_reader(dir.path())?;
//! let parser = QueryParser::new("title", Arc::new(ChineseAnalyzer::new()));
//! let results = reader.search(&parser.parse("苹果 AND id:[2 TO 3]")?, 10)?;
//! assert_eq!(results.total_hits, 2);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod cli;
pub mod document;
pub mod error;
pub mod index;
pub mod query;
pub mod search;
pub mod storage;
pub mod util;

pub use document::document::Document;
pub use document::field::{Field, FieldKind, Numeric};
pub use error::{LucernaError, Result};
pub use index::{
    DocId, IndexReader, IndexWriter, IndexWriterConfig, OpenMode, open_reader, open_writer,
};
pub use query::Query;
pub use search::{SearchHit, SearchResults};

pub mod prelude {
    pub use crate::document::document::Document;
    pub use crate::document::field::{Field, FieldKind, Numeric};
    pub use crate::error::{LucernaError, Result};
    pub use crate::index::{DocId, IndexReader, IndexWriter, OpenMode, open_reader, open_writer};
    pub use crate::query::Query;
    pub use crate::search::{SearchHit, SearchResults};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
