//! Tokenizer implementations for text analysis.
//!
//! Tokenizers are the first step of the analysis pipeline: they split input
//! text into tokens.
//!
//! # Available Tokenizers
//!
//! - [`unicode_word::UnicodeWordTokenizer`] - Unicode word boundaries (UAX #29)
//! - [`jieba::JiebaTokenizer`] - Dictionary-based Chinese word segmentation
//! - [`whole::WholeTokenizer`] - Treats entire text as single token
//!
//! # Examples
//!
//! ```
//! use lucerna::analysis::tokenizer::Tokenizer;
//! use lucerna::analysis::tokenizer::unicode_word::UnicodeWordTokenizer;
//!
//! let tokenizer = UnicodeWordTokenizer::new();
//! let tokens: Vec<_> = tokenizer.tokenize("Hello world").unwrap().collect();
//! assert_eq!(tokens.len(), 2);
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for tokenizers that convert text into tokens.
///
/// Implementations must be deterministic: tokenizing the same text twice
/// yields the same tokens in the same order.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod jieba;
pub mod unicode_word;
pub mod whole;
