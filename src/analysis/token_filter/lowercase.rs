//! Lowercase filter implementation.
//!
//! # Examples
//!
//! ```
//! use lucerna::analysis::token_filter::Filter;
//! use lucerna::analysis::token_filter::lowercase::LowercaseFilter;
//! use lucerna::analysis::token::Token;
//!
//! let filter = LowercaseFilter::new();
//! let tokens = vec![Token::new("Hello", 0), Token::new("WORLD", 1)];
//! let filtered: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(filtered[0].text, "hello");
//! assert_eq!(filtered[1].text, "world");
//! ```

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// A filter that converts tokens to lowercase.
///
/// Positions and offsets are preserved; ASCII-only tokens take the cheap path.
#[derive(Clone, Debug, Default)]
pub struct LowercaseFilter;

impl LowercaseFilter {
    /// Create a new lowercase filter.
    pub fn new() -> Self {
        LowercaseFilter
    }
}

impl Filter for LowercaseFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered = tokens.map(|mut token| {
            if token.text.is_ascii() {
                token.text.make_ascii_lowercase();
            } else {
                token.text = token.text.to_lowercase();
            }
            token
        });

        Ok(Box::new(filtered))
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    #[test]
    fn test_lowercase_filter() {
        let filter = LowercaseFilter::new();
        let tokens = vec![
            Token::new("The", 0),
            Token::new("QUICK", 1),
            Token::new("ÉCOLE", 2),
            Token::new("苹果", 3),
        ];

        let result: Vec<Token> = filter
            .filter(Box::new(tokens.into_iter()))
            .unwrap()
            .collect();

        assert_eq!(result[0].text, "the");
        assert_eq!(result[1].text, "quick");
        assert_eq!(result[2].text, "école");
        assert_eq!(result[3].text, "苹果");
        assert_eq!(result[3].position, 3);
    }
}
