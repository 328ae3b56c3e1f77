//! Standard analyzer for space-separated languages.
//!
//! # Pipeline
//!
//! 1. UnicodeWordTokenizer (CJK text degrades to single-character tokens)
//! 2. LowercaseFilter
//!
//! # Examples
//!
//! ```
//! use lucerna::analysis::analyzer::Analyzer;
//! use lucerna::analysis::analyzer::standard::StandardAnalyzer;
//!
//! let analyzer = StandardAnalyzer::new();
//! let tokens: Vec<_> = analyzer.analyze("Hello the World").unwrap().collect();
//!
//! assert_eq!(tokens.len(), 3);
//! assert_eq!(tokens[0].text, "hello");
//! assert_eq!(tokens[2].text, "world");
//! ```

use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::lowercase::LowercaseFilter;
use crate::analysis::tokenizer::unicode_word::UnicodeWordTokenizer;
use crate::error::Result;

/// A standard analyzer: Unicode word boundaries plus lowercasing.
#[derive(Debug, Clone)]
pub struct StandardAnalyzer {
    inner: PipelineAnalyzer,
}

impl StandardAnalyzer {
    /// Create a new standard analyzer.
    pub fn new() -> Self {
        let analyzer = PipelineAnalyzer::new(Arc::new(UnicodeWordTokenizer::new()))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .with_name("standard");

        StandardAnalyzer { inner: analyzer }
    }
}

impl Default for StandardAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for StandardAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &'static str {
        "standard"
    }
}
