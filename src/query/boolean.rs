//! Boolean query for combining queries.

use std::fmt;

use crate::error::{LucernaError, Result};
use crate::query::{Query, fmt_boost, validate_boost};

/// Occurrence requirements for boolean clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Occur {
    /// The clause must match (equivalent to AND).
    Must,
    /// The clause should match (equivalent to OR).
    Should,
    /// The clause must not match (equivalent to NOT).
    MustNot,
}

impl Occur {
    /// Prefix used by the query string syntax.
    pub fn prefix(&self) -> &'static str {
        match self {
            Occur::Must => "+",
            Occur::Should => "",
            Occur::MustNot => "-",
        }
    }
}

/// A clause in a boolean query.
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanClause {
    pub query: Query,
    pub occur: Occur,
}

impl BooleanClause {
    pub fn new<Q: Into<Query>>(query: Q, occur: Occur) -> Self {
        BooleanClause {
            query: query.into(),
            occur,
        }
    }

    pub fn must<Q: Into<Query>>(query: Q) -> Self {
        BooleanClause::new(query, Occur::Must)
    }

    pub fn should<Q: Into<Query>>(query: Q) -> Self {
        BooleanClause::new(query, Occur::Should)
    }

    pub fn must_not<Q: Into<Query>>(query: Q) -> Self {
        BooleanClause::new(query, Occur::MustNot)
    }
}

/// Combines clauses with boolean logic.
///
/// A document matches when it matches every MUST clause and no MUST_NOT
/// clause. Without MUST clauses it must also match at least one SHOULD
/// clause (or `minimum_should_match` of them, when set). A query made only
/// of MUST_NOT clauses matches every document not excluded, with a constant
/// score.
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanQuery {
    clauses: Vec<BooleanClause>,
    boost: f32,
    minimum_should_match: usize,
}

impl BooleanQuery {
    /// Create a boolean query; at least one clause is required.
    pub fn new(clauses: Vec<BooleanClause>) -> Result<Self> {
        if clauses.is_empty() {
            return Err(LucernaError::invalid_argument(
                "boolean query needs at least one clause",
            ));
        }

        Ok(BooleanQuery {
            clauses,
            boost: 1.0,
            minimum_should_match: 0,
        })
    }

    pub fn builder() -> BooleanQueryBuilder {
        BooleanQueryBuilder::new()
    }

    pub fn with_boost(mut self, boost: f32) -> Result<Self> {
        self.boost = validate_boost(boost)?;
        Ok(self)
    }

    /// Require at least `minimum` SHOULD clauses to match.
    pub fn with_minimum_should_match(mut self, minimum: usize) -> Result<Self> {
        let should = self.clauses_by_occur(Occur::Should).len();
        if minimum > should {
            return Err(LucernaError::invalid_argument(format!(
                "minimum should match {minimum} exceeds {should} SHOULD clauses"
            )));
        }
        self.minimum_should_match = minimum;
        Ok(self)
    }

    pub fn clauses(&self) -> &[BooleanClause] {
        &self.clauses
    }

    pub fn boost(&self) -> f32 {
        self.boost
    }

    pub fn minimum_should_match(&self) -> usize {
        self.minimum_should_match
    }

    /// Get clauses by occurrence type.
    pub fn clauses_by_occur(&self, occur: Occur) -> Vec<&BooleanClause> {
        self.clauses.iter().filter(|c| c.occur == occur).collect()
    }

    /// Whether every clause is MUST_NOT.
    pub fn is_pure_negation(&self) -> bool {
        self.clauses.iter().all(|c| c.occur == Occur::MustNot)
    }
}

impl fmt::Display for BooleanQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let wrap = self.boost != 1.0;
        if wrap {
            write!(f, "(")?;
        }
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", clause.occur.prefix())?;
            match &clause.query {
                Query::Boolean(nested) if nested.boost == 1.0 => write!(f, "({nested})")?,
                query => write!(f, "{query}")?,
            }
        }
        if wrap {
            write!(f, ")")?;
            fmt_boost(f, self.boost)?;
        }
        Ok(())
    }
}

/// Builder for [`BooleanQuery`].
#[derive(Debug, Default)]
pub struct BooleanQueryBuilder {
    clauses: Vec<BooleanClause>,
    boost: Option<f32>,
    minimum_should_match: Option<usize>,
}

impl BooleanQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn must<Q: Into<Query>>(mut self, query: Q) -> Self {
        self.clauses.push(BooleanClause::must(query));
        self
    }

    pub fn should<Q: Into<Query>>(mut self, query: Q) -> Self {
        self.clauses.push(BooleanClause::should(query));
        self
    }

    pub fn must_not<Q: Into<Query>>(mut self, query: Q) -> Self {
        self.clauses.push(BooleanClause::must_not(query));
        self
    }

    pub fn clause(mut self, clause: BooleanClause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn boost(mut self, boost: f32) -> Self {
        self.boost = Some(boost);
        self
    }

    pub fn minimum_should_match(mut self, minimum: usize) -> Self {
        self.minimum_should_match = Some(minimum);
        self
    }

    pub fn build(self) -> Result<BooleanQuery> {
        let mut query = BooleanQuery::new(self.clauses)?;
        if let Some(boost) = self.boost {
            query = query.with_boost(boost)?;
        }
        if let Some(minimum) = self.minimum_should_match {
            query = query.with_minimum_should_match(minimum)?;
        }
        Ok(query)
    }
}
