//! Analyzers: a tokenizer followed by a chain of token filters.
//!
//! ```text
//! Raw Text → Tokenizer → Filter 1 → ... → Filter N → Index
//! ```
//!
//! # Available Implementations
//!
//! - [`chinese::ChineseAnalyzer`] - jieba segmentation + lowercase (writer default)
//! - [`standard::StandardAnalyzer`] - Unicode word boundaries + lowercase
//! - [`keyword::KeywordAnalyzer`] - Entire input as one untouched token
//! - [`pipeline::PipelineAnalyzer`] - Custom tokenizer + filter chains
//! - [`per_field::PerFieldAnalyzer`] - A different analyzer per field
//!
//! # Examples
//!
//! ```
//! use lucerna::analysis::analyzer::Analyzer;
//! use lucerna::analysis::analyzer::standard::StandardAnalyzer;
//!
//! let analyzer = StandardAnalyzer::new();
//! let tokens: Vec<_> = analyzer.analyze("Hello World").unwrap().collect();
//!
//! assert_eq!(tokens[0].text, "hello");
//! assert_eq!(tokens[1].text, "world");
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for analyzers that convert text into processed tokens.
///
/// The trait requires `Send + Sync` so one analyzer can be shared by the
/// writer's parallel batch analysis and by query parsers.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Analyze the value of a named field.
    ///
    /// Analyzers that treat every field alike keep the default.
    fn analyze_field(&self, field: &str, text: &str) -> Result<TokenStream> {
        let _ = field;
        self.analyze(text)
    }

    /// Get the name of this analyzer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod chinese;
pub mod keyword;
pub mod per_field;
pub mod pipeline;
pub mod standard;
