//! Single-token tokenizer for exact values.
//!
//! Backs [`KeywordAnalyzer`](crate::analysis::analyzer::keyword::KeywordAnalyzer):
//! SKUs, URLs and codes such as `"SKU-042"` stay one untouched term.

use crate::analysis::token::{Token, TokenStream, TokenType};
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

/// Emits the whole input as one token; empty input yields nothing.
#[derive(Clone, Debug, Default)]
pub struct WholeTokenizer;

impl WholeTokenizer {
    pub fn new() -> Self {
        WholeTokenizer
    }
}

impl Tokenizer for WholeTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let token = (!text.is_empty()).then(|| {
            Token::with_offsets(text, 0, 0, text.len()).with_token_type(TokenType::detect(text))
        });
        Ok(Box::new(token.into_iter()))
    }

    fn name(&self) -> &'static str {
        "whole"
    }
}
