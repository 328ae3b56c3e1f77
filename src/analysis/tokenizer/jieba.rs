//! Chinese word segmentation backed by `jieba-rs`.
//!
//! Han runs are segmented against jieba's built-in dictionary by picking the
//! maximum-probability path through the word DAG. The HMM pass for unknown
//! words is disabled, so segmentation depends only on the input text and the
//! dictionary. Latin letters and digits adjacent to each other stay together
//! (`"4G"`, `"iPhone"`); whitespace and punctuation segments are dropped.
//!
//! # Examples
//!
//! ```
//! use lucerna::analysis::tokenizer::Tokenizer;
//! use lucerna::analysis::tokenizer::jieba::JiebaTokenizer;
//!
//! let tokenizer = JiebaTokenizer::new();
//! let tokens: Vec<String> = tokenizer
//!     .tokenize("Apple/苹果 iPhone")
//!     .unwrap()
//!     .map(|t| t.text)
//!     .collect();
//! assert_eq!(tokens, vec!["Apple", "苹果", "iPhone"]);
//! ```

use jieba_rs::Jieba;
use lazy_static::lazy_static;

use crate::analysis::token::{Token, TokenStream, TokenType};
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

lazy_static! {
    /// Shared segmenter; loading the dictionary is the expensive part.
    static ref JIEBA: Jieba = Jieba::new();
}

/// A tokenizer that segments Chinese text into dictionary words.
#[derive(Clone, Debug, Default)]
pub struct JiebaTokenizer;

impl JiebaTokenizer {
    /// Create a new jieba tokenizer.
    pub fn new() -> Self {
        JiebaTokenizer
    }
}

impl Tokenizer for JiebaTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = Vec::new();
        let mut cursor = 0;

        for word in JIEBA.cut(text, false) {
            let start = text[cursor..]
                .find(word)
                .map(|relative| cursor + relative)
                .unwrap_or(cursor);
            let end = start + word.len();
            cursor = end;

            if !word.chars().any(|c| c.is_alphanumeric()) {
                continue;
            }

            let position = tokens.len();
            tokens.push(
                Token::with_offsets(word, position, start, end)
                    .with_token_type(TokenType::detect(word)),
            );
        }

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "jieba"
    }
}
