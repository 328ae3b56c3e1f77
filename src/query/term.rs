//! Term query.

use std::fmt;

use crate::error::{LucernaError, Result};
use crate::index::inverted::Term;
use crate::query::{fmt_boost, validate_boost, validate_field};

/// Matches documents containing an exact term in a field.
///
/// The text is compared against indexed terms as-is; it is not analyzed.
/// Use [`QueryParser`](crate::query::parser::QueryParser) to analyze user input.
///
/// # Examples
///
/// ```
/// use lucerna::query::term::TermQuery;
///
/// let query = TermQuery::new("title", "苹果").unwrap();
/// assert_eq!(query.field(), "title");
/// assert!(TermQuery::new("title", "").is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TermQuery {
    term: Term,
    boost: f32,
}

impl TermQuery {
    pub fn new<F: Into<String>, T: Into<String>>(field: F, text: T) -> Result<Self> {
        let term = Term::new(field, text);
        validate_field(&term.field)?;
        if term.text.is_empty() {
            return Err(LucernaError::invalid_argument("term text must not be empty"));
        }

        Ok(TermQuery { term, boost: 1.0 })
    }

    pub fn with_boost(mut self, boost: f32) -> Result<Self> {
        self.boost = validate_boost(boost)?;
        Ok(self)
    }

    pub fn term(&self) -> &Term {
        &self.term
    }

    pub fn field(&self) -> &str {
        &self.term.field
    }

    pub fn text(&self) -> &str {
        &self.term.text
    }

    pub fn boost(&self) -> f32 {
        self.boost
    }
}

impl fmt::Display for TermQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.term)?;
        fmt_boost(f, self.boost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_query_validation() {
        assert!(TermQuery::new("", "apple").is_err());
        assert!(TermQuery::new("title", "").is_err());

        let query = TermQuery::new("title", "apple").unwrap();
        assert_eq!(query.term(), &Term::new("title", "apple"));
        assert_eq!(query.boost(), 1.0);
    }

    #[test]
    fn test_term_query_with_boost() {
        let query = TermQuery::new("title", "apple")
            .unwrap()
            .with_boost(2.5)
            .unwrap();
        assert_eq!(query.boost(), 2.5);
        assert_eq!(query.to_string(), "title:apple^2.5");
        assert!(query.with_boost(-1.0).is_err());
    }
}
