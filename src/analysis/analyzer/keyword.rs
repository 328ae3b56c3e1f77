//! Keyword analyzer that treats the entire input as a single token.
//!
//! Used for exact-match fields: no splitting, no normalization.
//!
//! # Examples
//!
//! ```
//! use lucerna::analysis::analyzer::Analyzer;
//! use lucerna::analysis::analyzer::keyword::KeywordAnalyzer;
//!
//! let analyzer = KeywordAnalyzer::new();
//! let tokens: Vec<_> = analyzer.analyze("User-123-ABC").unwrap().collect();
//!
//! assert_eq!(tokens.len(), 1);
//! assert_eq!(tokens[0].text, "User-123-ABC");
//! ```

use crate::analysis::analyzer::Analyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::tokenizer::Tokenizer;
use crate::analysis::tokenizer::whole::WholeTokenizer;
use crate::error::Result;

/// A keyword analyzer that treats the entire input as a single token.
#[derive(Debug, Clone, Default)]
pub struct KeywordAnalyzer {
    tokenizer: WholeTokenizer,
}

impl KeywordAnalyzer {
    /// Create a new keyword analyzer.
    pub fn new() -> Self {
        KeywordAnalyzer {
            tokenizer: WholeTokenizer::new(),
        }
    }
}

impl Analyzer for KeywordAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.tokenizer.tokenize(text)
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}
