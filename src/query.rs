//! Query model.
//!
//! [`Query`] is a closed set of query kinds evaluated by the searcher:
//!
//! - [`term::TermQuery`] - exact term in a field
//! - [`range::NumericRangeQuery`] - numeric field within bounds
//! - [`wildcard::WildcardQuery`] - terms matching a `?`/`*` pattern
//! - [`fuzzy::FuzzyQuery`] - terms within an edit distance
//! - [`match_all::MatchAllQuery`] - every document
//! - [`boolean::BooleanQuery`] - MUST / MUST_NOT / SHOULD combination
//!
//! Constructors validate their arguments and fail with
//! [`LucernaError::InvalidArgument`](crate::error::LucernaError::InvalidArgument),
//! so a `Query` that exists is always executable. [`parser::QueryParser`]
//! builds queries from query strings.
//!
//! # Examples
//!
//! ```
//! use lucerna::query::Query;
//! use lucerna::query::boolean::BooleanQuery;
//! use lucerna::query::range::NumericRangeQuery;
//! use lucerna::query::term::TermQuery;
//! use lucerna::query::wildcard::WildcardQuery;
//!
//! # fn main() -> lucerna::error::Result<()> {
//! let query = BooleanQuery::builder()
//!     .must(NumericRangeQuery::new_inclusive("id", 80, 100)?)
//!     .must(WildcardQuery::new("title", "9*g")?)
//!     .must_not(TermQuery::new("title", "90g")?)
//!     .build()?;
//!
//! assert_eq!(Query::from(query).to_string(), "+id:[80 TO 100] +title:9*g -title:90g");
//! # Ok(())
//! # }
//! ```

use std::fmt;

pub mod boolean;
pub mod fuzzy;
pub mod match_all;
pub mod parser;
pub mod range;
pub mod term;
pub mod wildcard;

use crate::error::{LucernaError, Result};
use crate::query::boolean::BooleanQuery;
use crate::query::fuzzy::FuzzyQuery;
use crate::query::match_all::MatchAllQuery;
use crate::query::range::NumericRangeQuery;
use crate::query::term::TermQuery;
use crate::query::wildcard::WildcardQuery;

/// A search query.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Term(TermQuery),
    NumericRange(NumericRangeQuery),
    Wildcard(WildcardQuery),
    Fuzzy(FuzzyQuery),
    MatchAll(MatchAllQuery),
    Boolean(BooleanQuery),
}

impl Query {
    /// Score multiplier of the query.
    pub fn boost(&self) -> f32 {
        match self {
            Query::Term(q) => q.boost(),
            Query::NumericRange(q) => q.boost(),
            Query::Wildcard(q) => q.boost(),
            Query::Fuzzy(q) => q.boost(),
            Query::MatchAll(q) => q.boost(),
            Query::Boolean(q) => q.boost(),
        }
    }

    /// The same query with a different boost.
    pub fn with_boost(self, boost: f32) -> Result<Self> {
        Ok(match self {
            Query::Term(q) => Query::Term(q.with_boost(boost)?),
            Query::NumericRange(q) => Query::NumericRange(q.with_boost(boost)?),
            Query::Wildcard(q) => Query::Wildcard(q.with_boost(boost)?),
            Query::Fuzzy(q) => Query::Fuzzy(q.with_boost(boost)?),
            Query::MatchAll(q) => Query::MatchAll(q.with_boost(boost)?),
            Query::Boolean(q) => Query::Boolean(q.with_boost(boost)?),
        })
    }
}

/// Check that a boost is a usable multiplier.
pub(crate) fn validate_boost(boost: f32) -> Result<f32> {
    if boost.is_finite() && boost >= 0.0 {
        Ok(boost)
    } else {
        Err(LucernaError::invalid_argument(format!(
            "boost must be finite and non-negative, got {boost}"
        )))
    }
}

/// Check that a field name is usable.
pub(crate) fn validate_field(field: &str) -> Result<()> {
    if field.is_empty() {
        Err(LucernaError::invalid_argument("query field must not be empty"))
    } else {
        Ok(())
    }
}

/// Format the `^boost` suffix used by the query string syntax.
pub(crate) fn fmt_boost(f: &mut fmt::Formatter<'_>, boost: f32) -> fmt::Result {
    if boost != 1.0 {
        write!(f, "^{boost}")?;
    }
    Ok(())
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Term(q) => q.fmt(f),
            Query::NumericRange(q) => q.fmt(f),
            Query::Wildcard(q) => q.fmt(f),
            Query::Fuzzy(q) => q.fmt(f),
            Query::MatchAll(q) => q.fmt(f),
            Query::Boolean(q) => q.fmt(f),
        }
    }
}

impl From<TermQuery> for Query {
    fn from(query: TermQuery) -> Self {
        Query::Term(query)
    }
}

impl From<NumericRangeQuery> for Query {
    fn from(query: NumericRangeQuery) -> Self {
        Query::NumericRange(query)
    }
}

impl From<WildcardQuery> for Query {
    fn from(query: WildcardQuery) -> Self {
        Query::Wildcard(query)
    }
}

impl From<FuzzyQuery> for Query {
    fn from(query: FuzzyQuery) -> Self {
        Query::Fuzzy(query)
    }
}

impl From<MatchAllQuery> for Query {
    fn from(query: MatchAllQuery) -> Self {
        Query::MatchAll(query)
    }
}

impl From<BooleanQuery> for Query {
    fn from(query: BooleanQuery) -> Self {
        Query::Boolean(query)
    }
}
