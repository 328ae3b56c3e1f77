//! Text analysis: tokenizers, token filters and analyzers.
//!
//! Field values are turned into tokens according to their [`FieldKind`]:
//! tokenized text runs through an [`Analyzer`], exact values become a single
//! untouched token, and stored-only or numeric values produce no tokens at
//! all. [`tokenize`] is the one entry point the index writer uses.
//!
//! # Examples
//!
//! ```
//! use lucerna::analysis::analyzer::chinese::ChineseAnalyzer;
//! use lucerna::analysis::tokenize;
//! use lucerna::document::field::FieldKind;
//!
//! let analyzer = ChineseAnalyzer::new();
//!
//! let exact: Vec<_> = tokenize("image", "http://x/1.jpg", FieldKind::IndexedExact, &analyzer)
//!     .unwrap()
//!     .collect();
//! assert_eq!(exact.len(), 1);
//! assert_eq!(exact[0].text, "http://x/1.jpg");
//!
//! let numeric: Vec<_> = tokenize("id", "42", FieldKind::Numeric, &analyzer).unwrap().collect();
//! assert!(numeric.is_empty());
//! ```

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::token::{Token, TokenStream};
use crate::document::field::FieldKind;
use crate::error::Result;

/// Produce the index tokens of a field value of the given kind.
pub fn tokenize(
    field: &str,
    text: &str,
    kind: FieldKind,
    analyzer: &dyn Analyzer,
) -> Result<TokenStream> {
    match kind {
        FieldKind::IndexedTokenized => analyzer.analyze_field(field, text),
        FieldKind::IndexedExact => {
            let token = Token::with_offsets(text, 0, 0, text.len());
            Ok(Box::new(std::iter::once(token)))
        }
        FieldKind::StoredOnly | FieldKind::Numeric => Ok(Box::new(std::iter::empty())),
    }
}
