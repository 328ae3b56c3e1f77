//! Token types for text analysis.
//!
//! A [`Token`] is the unit that flows from a tokenizer through token filters
//! into the index writer. A [`TokenStream`] is a boxed iterator of tokens;
//! streams are finite, and calling the tokenizer again on the same input
//! restarts the stream with identical output.
//!
//! # Examples
//!
//! ```
//! use lucerna::analysis::token::Token;
//!
//! let token = Token::with_offsets("world", 1, 6, 11);
//! assert_eq!(token.text, "world");
//! assert_eq!(token.position, 1);
//! assert_eq!(token.end_offset, 11);
//! ```

use serde::{Deserialize, Serialize};

/// A token represents a single unit of text after tokenization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The text content of the token
    pub text: String,

    /// The position of the token in the token stream (0-based)
    pub position: usize,

    /// The byte offset where this token starts in the original text
    pub start_offset: usize,

    /// The byte offset where this token ends in the original text
    pub end_offset: usize,

    /// Script classification, when the tokenizer knows it
    pub token_type: Option<TokenType>,
}

/// Token type classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    /// Alphanumeric text (English, Latin scripts)
    Alphanum,
    /// Numeric values
    Num,
    /// CJK (Chinese, Japanese, Korean) characters
    Cjk,
    /// Other/unknown token types
    Other,
}

impl TokenType {
    /// Classify a word by its characters.
    pub fn detect(word: &str) -> TokenType {
        if word.is_empty() {
            return TokenType::Other;
        }

        if word.chars().all(|c| c.is_numeric()) {
            return TokenType::Num;
        }

        if word.chars().any(is_cjk) {
            return TokenType::Cjk;
        }

        if word.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
            return TokenType::Alphanum;
        }

        TokenType::Other
    }
}

/// Whether a character belongs to a script written without word separators.
pub fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}' |  // CJK Unified Ideographs
        '\u{3400}'..='\u{4DBF}' |  // CJK Extension A
        '\u{20000}'..='\u{2A6DF}' | // CJK Extension B
        '\u{F900}'..='\u{FAFF}' |  // CJK Compatibility Ideographs
        '\u{3040}'..='\u{30FF}' |  // Hiragana, Katakana
        '\u{AC00}'..='\u{D7AF}'    // Hangul Syllables
    )
}

impl Token {
    /// Create a new token with the given text and position.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset: 0,
            end_offset: 0,
            token_type: None,
        }
    }

    /// Create a new token with text, position, and byte offsets.
    pub fn with_offsets<S: Into<String>>(
        text: S,
        position: usize,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset,
            end_offset,
            token_type: None,
        }
    }

    /// Set the token type.
    pub fn with_token_type(mut self, token_type: TokenType) -> Self {
        self.token_type = Some(token_type);
        self
    }

    /// Get the length of the token text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if the token is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A stream of tokens produced by a tokenizer or filter.
pub type TokenStream = Box<dyn Iterator<Item = Token> + Send>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_creation() {
        let token = Token::new("hello", 0);
        assert_eq!(token.text, "hello");
        assert_eq!(token.position, 0);
        assert!(token.token_type.is_none());
        assert_eq!(token.len(), 5);
    }

    #[test]
    fn test_detect_token_type() {
        assert_eq!(TokenType::detect("2024"), TokenType::Num);
        assert_eq!(TokenType::detect("苹果"), TokenType::Cjk);
        assert_eq!(TokenType::detect("iphone"), TokenType::Alphanum);
        assert_eq!(TokenType::detect("90g"), TokenType::Alphanum);
        assert_eq!(TokenType::detect("5.5"), TokenType::Other);
    }
}
