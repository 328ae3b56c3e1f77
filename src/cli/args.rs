//! Command line argument parsing for the Lucerna CLI using clap.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::chinese::ChineseAnalyzer;
use crate::analysis::analyzer::keyword::KeywordAnalyzer;
use crate::analysis::analyzer::standard::StandardAnalyzer;
use crate::index::{DocId, OpenMode};

/// Lucerna - an embeddable inverted-index search engine
#[derive(Parser, Debug, Clone)]
#[command(name = "lucerna")]
#[command(about = "Index JSON Lines documents and search them")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct LucernaArgs {
    /// Verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl LucernaArgs {
    /// Effective verbosity: 0 quiet, 1 normal, higher is more detail.
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose.saturating_add(1)
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Add JSON Lines documents to an index
    Index(IndexArgs),

    /// Search an index with a query string
    Search(SearchArgs),

    /// Print stored documents by id
    Get(GetArgs),

    /// Show index statistics
    Stats(StatsArgs),
}

/// Location of the index directory.
#[derive(clap::Args, Debug, Clone)]
pub struct IndexLocation {
    /// Path to the index directory
    #[arg(short, long = "index", value_name = "INDEX_PATH", env = "LUCERNA_INDEX")]
    pub index_path: PathBuf,
}

/// Arguments for indexing documents
#[derive(Parser, Debug, Clone)]
pub struct IndexArgs {
    #[command(flatten)]
    pub location: IndexLocation,

    /// JSON Lines file to read, or `-` for standard input
    #[arg(value_name = "DOCUMENT_FILE")]
    pub document_file: PathBuf,

    /// How to treat an existing index
    #[arg(short, long, default_value = "create-or-append")]
    pub mode: ModeArg,

    /// Analyzer for text fields
    #[arg(short, long, default_value = "chinese")]
    pub analyzer: AnalyzerArg,

    /// Fields indexed as a single untouched term
    #[arg(long = "exact", value_name = "FIELD", value_delimiter = ',')]
    pub exact_fields: Vec<String>,

    /// Fields kept in the store but not indexed
    #[arg(long = "stored-only", value_name = "FIELD", value_delimiter = ',')]
    pub stored_only_fields: Vec<String>,

    /// Documents analyzed per batch
    #[arg(short, long, default_value = "1000")]
    pub batch_size: usize,

    /// Skip lines that fail to parse instead of aborting
    #[arg(long)]
    pub skip_invalid: bool,
}

/// Arguments for searching
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    #[command(flatten)]
    pub location: IndexLocation,

    /// Query string, e.g. `+title:苹果 -title:90g id:[1 TO 50]`
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Field searched by terms without a field prefix
    #[arg(short = 'F', long, default_value = "title")]
    pub field: String,

    /// Maximum number of hits to return
    #[arg(short, long, default_value = "10")]
    pub limit: usize,

    /// Require every unprefixed term instead of any
    #[arg(long)]
    pub and: bool,

    /// Analyzer for query text; use the one the index was built with
    #[arg(short, long, default_value = "chinese")]
    pub analyzer: AnalyzerArg,

    /// Include stored fields of each hit
    #[arg(short = 'd', long)]
    pub show_documents: bool,
}

/// Arguments for fetching documents
#[derive(Parser, Debug, Clone)]
pub struct GetArgs {
    #[command(flatten)]
    pub location: IndexLocation,

    /// Document ids to print
    #[arg(value_name = "DOC_ID", required = true)]
    pub doc_ids: Vec<DocId>,
}

/// Arguments for index statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    #[command(flatten)]
    pub location: IndexLocation,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Human,
    /// JSON
    Json,
}

/// Writer open modes
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    /// Replace any existing index
    Create,
    /// Extend an existing index
    Append,
    /// Append if an index exists, create one otherwise
    CreateOrAppend,
}

impl From<ModeArg> for OpenMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Create => OpenMode::Create,
            ModeArg::Append => OpenMode::Append,
            ModeArg::CreateOrAppend => OpenMode::CreateOrAppend,
        }
    }
}

/// Built-in analyzers
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerArg {
    /// jieba segmentation with lowercasing
    Chinese,
    /// Unicode word boundaries with lowercasing
    Standard,
    /// Whole value as one term
    Keyword,
}

impl AnalyzerArg {
    pub fn build(self) -> Arc<dyn Analyzer> {
        match self {
            AnalyzerArg::Chinese => Arc::new(ChineseAnalyzer::new()),
            AnalyzerArg::Standard => Arc::new(StandardAnalyzer::new()),
            AnalyzerArg::Keyword => Arc::new(KeywordAnalyzer::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_args() {
        let args = LucernaArgs::try_parse_from([
            "lucerna",
            "index",
            "--index",
            "/tmp/idx",
            "docs.jsonl",
            "--mode",
            "append",
            "--exact",
            "sku,url",
            "--stored-only",
            "image",
        ])
        .unwrap();

        match args.command {
            Command::Index(index) => {
                assert_eq!(index.location.index_path, PathBuf::from("/tmp/idx"));
                assert_eq!(index.document_file, PathBuf::from("docs.jsonl"));
                assert_eq!(index.mode, ModeArg::Append);
                assert_eq!(index.analyzer, AnalyzerArg::Chinese);
                assert_eq!(index.exact_fields, vec!["sku", "url"]);
                assert_eq!(index.stored_only_fields, vec!["image"]);
                assert_eq!(index.batch_size, 1000);
            }
            other => panic!("expected index command, got {other:?}"),
        }
    }

    #[test]
    fn test_search_args() {
        let args = LucernaArgs::try_parse_from([
            "lucerna", "search", "-i", "/tmp/idx", "苹果 -90g", "--limit", "5", "--and", "-d",
        ])
        .unwrap();

        match args.command {
            Command::Search(search) => {
                assert_eq!(search.query, "苹果 -90g");
                assert_eq!(search.field, "title");
                assert_eq!(search.limit, 5);
                assert!(search.and);
                assert!(search.show_documents);
            }
            other => panic!("expected search command, got {other:?}"),
        }
    }

    #[test]
    fn test_get_requires_ids() {
        assert!(LucernaArgs::try_parse_from(["lucerna", "get", "-i", "/tmp/idx"]).is_err());

        let args = LucernaArgs::try_parse_from(["lucerna", "get", "-i", "/tmp/idx", "3", "7"])
            .unwrap();
        match args.command {
            Command::Get(get) => assert_eq!(get.doc_ids, vec![3, 7]),
            other => panic!("expected get command, got {other:?}"),
        }
    }

    #[test]
    fn test_verbosity_levels() {
        let args = LucernaArgs::try_parse_from(["lucerna", "stats", "-i", "x"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        let args = LucernaArgs::try_parse_from(["lucerna", "-vv", "stats", "-i", "x"]).unwrap();
        assert_eq!(args.verbosity(), 3);

        let args = LucernaArgs::try_parse_from(["lucerna", "--quiet", "stats", "-i", "x"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_output_format() {
        let args =
            LucernaArgs::try_parse_from(["lucerna", "--format", "json", "stats", "-i", "x"])
                .unwrap();
        assert_eq!(args.output_format, OutputFormat::Json);
    }
}
