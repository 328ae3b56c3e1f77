//! Query parser for converting query strings to [`Query`] values.
//!
//! Supported syntax:
//! - Bare words: `苹果`, analyzed like indexed text
//! - Field prefixes: `title:iphone`, `title:(apple iphone)`
//! - Required and prohibited clauses: `+apple -android`
//! - Keyword operators: `apple AND iphone`, `apple OR pear`, `NOT android`
//! - Numeric ranges: `id:[20 TO 40]`, `id:{20 TO 40}`, `id:[80 TO *]`
//! - Wildcards: `title:9*g`, `title:ap?le`
//! - Fuzzy terms: `eaple~2`, `eaple~` (two edits)
//! - Quoted text: `"iphone plus"`, every token required
//! - Match all: `*:*`
//! - Boosts: `apple^2`
//! - Escapes: `\:` `\*` and friends make the next character literal
//!
//! Wildcard and fuzzy terms are not analyzed.

use std::iter::Peekable;
use std::str::Chars;
use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::document::field::Numeric;
use crate::error::{LucernaError, Result};
use crate::query::Query;
use crate::query::boolean::{BooleanClause, BooleanQuery, Occur};
use crate::query::fuzzy::FuzzyQuery;
use crate::query::match_all::MatchAllQuery;
use crate::query::range::NumericRangeQuery;
use crate::query::term::TermQuery;
use crate::query::wildcard::WildcardQuery;

const MAX_DEPTH: usize = 32;
const DEFAULT_FUZZY_EDITS: i32 = 2;

/// How clauses without a prefix combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operator {
    /// Unprefixed clauses are SHOULD.
    #[default]
    Or,
    /// Unprefixed clauses are MUST.
    And,
}

/// Parses query strings against a default field.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use lucerna::analysis::analyzer::chinese::ChineseAnalyzer;
/// use lucerna::query::parser::QueryParser;
///
/// let parser = QueryParser::new("title", Arc::new(ChineseAnalyzer::new()));
/// let query = parser.parse("+id:[80 TO 100] 9*g -title:90g").unwrap();
/// assert_eq!(query.to_string(), "+id:[80 TO 100] title:9*g -title:90g");
/// ```
#[derive(Clone)]
pub struct QueryParser {
    default_field: String,
    analyzer: Arc<dyn Analyzer>,
    default_operator: Operator,
}

impl QueryParser {
    pub fn new<S: Into<String>>(default_field: S, analyzer: Arc<dyn Analyzer>) -> Self {
        QueryParser {
            default_field: default_field.into(),
            analyzer,
            default_operator: Operator::Or,
        }
    }

    pub fn with_default_operator(mut self, operator: Operator) -> Self {
        self.default_operator = operator;
        self
    }

    pub fn default_field(&self) -> &str {
        &self.default_field
    }

    pub fn default_operator(&self) -> Operator {
        self.default_operator
    }

    /// Parse a query string.
    pub fn parse(&self, query_str: &str) -> Result<Query> {
        let mut state = ParseState {
            chars: query_str.chars().peekable(),
            pos: 0,
            depth: 0,
            parser: self,
        };

        let clauses = state.parse_clauses(&self.default_field, false)?;
        combine(clauses)?.ok_or_else(|| {
            LucernaError::invalid_argument(format!(
                "query string '{query_str}' produced no clauses"
            ))
        })
    }

    fn implicit_occur(&self) -> Occur {
        match self.default_operator {
            Operator::Or => Occur::Should,
            Operator::And => Occur::Must,
        }
    }
}

impl std::fmt::Debug for QueryParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryParser")
            .field("default_field", &self.default_field)
            .field("analyzer", &self.analyzer.name())
            .field("default_operator", &self.default_operator)
            .finish()
    }
}

/// Collapse parsed clauses into one query.
fn combine(mut clauses: Vec<BooleanClause>) -> Result<Option<Query>> {
    match clauses.len() {
        0 => Ok(None),
        1 if clauses[0].occur != Occur::MustNot => Ok(clauses.pop().map(|c| c.query)),
        _ => Ok(Some(BooleanQuery::new(clauses)?.into())),
    }
}

/// A term as written: unescaped text, the raw pattern and whether it holds wildcards.
struct RawTerm {
    text: String,
    pattern: String,
    wildcard: bool,
}

struct ParseState<'a> {
    chars: Peekable<Chars<'a>>,
    pos: usize,
    depth: usize,
    parser: &'a QueryParser,
}

impl ParseState<'_> {
    fn parse_clauses(&mut self, field: &str, nested: bool) -> Result<Vec<BooleanClause>> {
        let mut clauses: Vec<BooleanClause> = Vec::new();
        // Whether the last clause took its occur from the default operator.
        let mut last_implicit = false;
        let mut forced: Option<Occur> = None;

        loop {
            self.skip_whitespace();
            match self.chars.peek() {
                None if nested => return Err(self.error("missing closing ')'")),
                None => break,
                Some(')') if nested => {
                    self.bump();
                    break;
                }
                Some(')') => return Err(self.error("unexpected ')'")),
                _ => {}
            }

            if let Some(keyword) = self.peek_keyword(&["AND", "OR", "NOT"]) {
                self.skip_chars(keyword.len());
                match keyword {
                    "AND" => {
                        if let Some(last) = clauses.last_mut() {
                            if last.occur == Occur::Should {
                                last.occur = Occur::Must;
                            }
                        }
                        forced = Some(Occur::Must);
                    }
                    "OR" => {
                        if let Some(last) = clauses.last_mut() {
                            if last_implicit && last.occur == Occur::Must {
                                last.occur = Occur::Should;
                            }
                        }
                        forced = Some(Occur::Should);
                    }
                    _ => forced = Some(Occur::MustNot),
                }
                continue;
            }

            let prefix = match self.chars.peek() {
                Some('+') => Some(Occur::Must),
                Some('-') => Some(Occur::MustNot),
                _ => None,
            };
            if prefix.is_some() {
                self.bump();
            }

            let (occur, implicit) = match (prefix, forced.take()) {
                (Some(occur), _) => (occur, false),
                (None, Some(Occur::MustNot)) => (Occur::MustNot, false),
                (None, Some(occur)) => (occur, true),
                (None, None) => (self.parser.implicit_occur(), true),
            };

            if let Some(query) = self.parse_clause(field)? {
                clauses.push(BooleanClause::new(query, occur));
                last_implicit = implicit;
            }
        }

        Ok(clauses)
    }

    /// One clause without its prefix; `None` if analysis left nothing to search.
    fn parse_clause(&mut self, field: &str) -> Result<Option<Query>> {
        let query = match self.chars.peek() {
            Some('(') => self.parse_group(field)?,
            Some('"') => self.parse_quoted(field)?,
            Some('[') | Some('{') => Some(self.parse_range(field)?),
            _ => {
                let term = self.read_term()?;
                if self.chars.peek() == Some(&':') {
                    self.bump();
                    self.parse_field_clause(term)?
                } else {
                    self.term_query(field, term)?
                }
            }
        };

        match query {
            Some(query) => self.parse_boost(query).map(Some),
            None => {
                self.parse_boost_value()?;
                Ok(None)
            }
        }
    }

    fn parse_field_clause(&mut self, field: RawTerm) -> Result<Option<Query>> {
        if field.wildcard {
            if field.text == "*" && self.chars.peek() == Some(&'*') {
                let value = self.read_term()?;
                if value.text == "*" {
                    return Ok(Some(MatchAllQuery::new().into()));
                }
            }
            return Err(self.error("wildcards are not allowed in field names"));
        }

        match self.chars.peek() {
            Some('(') => self.parse_group(&field.text),
            Some('"') => self.parse_quoted(&field.text),
            Some('[') | Some('{') => self.parse_range(&field.text).map(Some),
            _ => {
                let term = self.read_term()?;
                self.term_query(&field.text, term)
            }
        }
    }

    fn parse_group(&mut self, field: &str) -> Result<Option<Query>> {
        self.bump();
        if self.depth >= MAX_DEPTH {
            return Err(self.error("query nests too deeply"));
        }
        self.depth += 1;
        let clauses = self.parse_clauses(field, true)?;
        self.depth -= 1;
        combine(clauses)
    }

    fn parse_quoted(&mut self, field: &str) -> Result<Option<Query>> {
        self.bump();
        let mut text = String::new();
        loop {
            match self.bump() {
                Some('"') => break,
                Some('\\') => match self.bump() {
                    Some(c) => text.push(c),
                    None => return Err(self.error("dangling escape")),
                },
                Some(c) => text.push(c),
                None => return Err(self.error("missing closing '\"'")),
            }
        }
        self.analyzed_query(field, &text, Occur::Must)
    }

    fn parse_range(&mut self, field: &str) -> Result<Query> {
        let min_inclusive = self.bump() == Some('[');

        self.skip_whitespace();
        let lower = self.read_bound()?;
        self.skip_whitespace();
        if self.peek_keyword(&["TO"]).is_none() {
            return Err(self.error("expected 'TO' in range"));
        }
        self.skip_chars(2);
        self.skip_whitespace();
        let upper = self.read_bound()?;
        self.skip_whitespace();

        let max_inclusive = match self.bump() {
            Some(']') => true,
            Some('}') => false,
            _ => return Err(self.error("expected ']' or '}' to close range")),
        };

        NumericRangeQuery::with_bounds(
            field,
            self.parse_numeric(&lower)?,
            self.parse_numeric(&upper)?,
            min_inclusive,
            max_inclusive,
        )
        .map(Query::from)
    }

    fn read_bound(&mut self) -> Result<String> {
        let mut bound = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() || c == ']' || c == '}' {
                break;
            }
            bound.push(c);
            self.bump();
        }
        if bound.is_empty() {
            return Err(self.error("missing range bound"));
        }
        Ok(bound)
    }

    fn parse_numeric(&self, bound: &str) -> Result<Option<Numeric>> {
        if bound == "*" {
            return Ok(None);
        }
        if let Ok(value) = bound.parse::<i64>() {
            return Ok(Some(Numeric::Integer(value)));
        }
        match bound.parse::<f64>() {
            Ok(value) => Ok(Some(Numeric::Float(value))),
            Err(_) => Err(self.error(&format!("range bound '{bound}' is not a number"))),
        }
    }

    fn term_query(&mut self, field: &str, term: RawTerm) -> Result<Option<Query>> {
        if term.wildcard {
            return WildcardQuery::new(field, term.pattern).map(|q| Some(q.into()));
        }

        if self.chars.peek() == Some(&'~') {
            self.bump();
            let digits = self.read_number();
            let max_edits = if digits.is_empty() {
                DEFAULT_FUZZY_EDITS
            } else {
                digits
                    .parse::<i32>()
                    .map_err(|_| self.error(&format!("invalid edit distance '{digits}'")))?
            };
            return FuzzyQuery::new(field, term.text, max_edits).map(|q| Some(q.into()));
        }

        self.analyzed_query(field, &term.text, Occur::Should)
    }

    /// Analyze text; several tokens become a boolean group joined by `occur`.
    fn analyzed_query(&self, field: &str, text: &str, occur: Occur) -> Result<Option<Query>> {
        let mut terms = Vec::new();
        for token in self.parser.analyzer.analyze_field(field, text)? {
            if !token.is_empty() {
                terms.push(TermQuery::new(field, token.text)?);
            }
        }

        if terms.len() <= 1 {
            return Ok(terms.pop().map(Query::from));
        }
        let clauses = terms
            .into_iter()
            .map(|term| BooleanClause::new(term, occur))
            .collect();
        Ok(Some(BooleanQuery::new(clauses)?.into()))
    }

    fn parse_boost(&mut self, query: Query) -> Result<Query> {
        match self.parse_boost_value()? {
            Some(boost) => query.with_boost(boost),
            None => Ok(query),
        }
    }

    fn parse_boost_value(&mut self) -> Result<Option<f32>> {
        if self.chars.peek() != Some(&'^') {
            return Ok(None);
        }
        self.bump();
        let digits = self.read_number();
        digits
            .parse::<f32>()
            .map(Some)
            .map_err(|_| self.error(&format!("invalid boost '{digits}'")))
    }

    fn read_term(&mut self) -> Result<RawTerm> {
        let mut term = RawTerm {
            text: String::new(),
            pattern: String::new(),
            wildcard: false,
        };

        while let Some(&c) = self.chars.peek() {
            match c {
                '\\' => {
                    self.bump();
                    match self.bump() {
                        Some(escaped) => {
                            term.text.push(escaped);
                            term.pattern.push('\\');
                            term.pattern.push(escaped);
                        }
                        None => return Err(self.error("dangling escape")),
                    }
                }
                '*' | '?' => {
                    self.bump();
                    term.wildcard = true;
                    term.text.push(c);
                    term.pattern.push(c);
                }
                c if is_term_end(c) => break,
                c => {
                    self.bump();
                    term.text.push(c);
                    term.pattern.push(c);
                }
            }
        }

        if term.text.is_empty() {
            return Err(self.error("expected a term"));
        }
        Ok(term)
    }

    fn read_number(&mut self) -> String {
        let mut digits = String::new();
        while let Some(&c) = self.chars.peek() {
            if !(c.is_ascii_digit() || c == '.') {
                break;
            }
            digits.push(c);
            self.bump();
        }
        digits
    }

    /// One of `keywords` at the cursor, followed by a separator.
    fn peek_keyword(&self, keywords: &[&'static str]) -> Option<&'static str> {
        let ahead: String = self.chars.clone().take(4).collect();
        keywords.iter().copied().find(|keyword| {
            ahead.starts_with(keyword)
                && ahead[keyword.len()..]
                    .chars()
                    .next()
                    .is_none_or(|c| c.is_whitespace() || c == '(')
        })
    }

    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.bump();
        }
    }

    fn skip_chars(&mut self, count: usize) {
        for _ in 0..count {
            self.bump();
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn error(&self, message: &str) -> LucernaError {
        LucernaError::invalid_argument(format!(
            "query syntax error at character {}: {message}",
            self.pos
        ))
    }
}

fn is_term_end(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            '(' | ')' | ':' | '^' | '~' | '"' | '[' | ']' | '{' | '}'
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyzer::chinese::ChineseAnalyzer;
    use crate::analysis::analyzer::standard::StandardAnalyzer;

    fn parser() -> QueryParser {
        QueryParser::new("title", Arc::new(StandardAnalyzer::new()))
    }

    fn parse(query: &str) -> String {
        parser().parse(query).unwrap().to_string()
    }

    #[test]
    fn test_single_term() {
        let query = parser().parse("Apple").unwrap();
        assert_eq!(
            query,
            Query::from(TermQuery::new("title", "apple").unwrap())
        );
    }

    #[test]
    fn test_field_and_occur_prefixes() {
        assert_eq!(parse("+apple -android iphone"), "+title:apple -title:android title:iphone");
        assert_eq!(parse("body:hello"), "body:hello");
    }

    #[test]
    fn test_keyword_operators() {
        assert_eq!(parse("apple AND iphone"), "+title:apple +title:iphone");
        assert_eq!(parse("apple OR iphone"), "title:apple title:iphone");
        assert_eq!(parse("apple AND NOT android"), "+title:apple -title:android");
    }

    #[test]
    fn test_default_and_operator() {
        let parser = parser().with_default_operator(Operator::And);
        let query = parser.parse("apple iphone").unwrap();
        assert_eq!(query.to_string(), "+title:apple +title:iphone");

        let query = parser.parse("apple OR iphone").unwrap();
        assert_eq!(query.to_string(), "title:apple title:iphone");
    }

    #[test]
    fn test_ranges() {
        assert_eq!(parse("id:[20 TO 40]"), "id:[20 TO 40]");
        assert_eq!(parse("id:{20 TO 40}"), "id:{20 TO 40}");
        assert_eq!(parse("id:[20 TO 40}"), "id:[20 TO 40}");
        assert_eq!(parse("price:[1.5 TO *]"), "price:[1.5 TO *]");

        assert!(parser().parse("id:[40 TO 20]").is_err());
        assert!(parser().parse("id:[a TO b]").is_err());
        assert!(parser().parse("id:[1 20]").is_err());
    }

    #[test]
    fn test_wildcard_and_fuzzy() {
        let query = parser().parse("9*g").unwrap();
        assert!(matches!(query, Query::Wildcard(_)));
        assert_eq!(query.to_string(), "title:9*g");

        let query = parser().parse("eaple~2").unwrap();
        match query {
            Query::Fuzzy(fuzzy) => {
                assert_eq!(fuzzy.text(), "eaple");
                assert_eq!(fuzzy.max_edits(), 2);
            }
            other => panic!("expected fuzzy query, got {other:?}"),
        }

        assert_eq!(parse("eaple~"), "title:eaple~2");
    }

    #[test]
    fn test_match_all() {
        assert_eq!(parser().parse("*:*").unwrap(), MatchAllQuery::new().into());
        assert_eq!(parse("*:* -title:apple"), "*:* -title:apple");
    }

    #[test]
    fn test_groups_and_boosts() {
        assert_eq!(
            parse("+title:(apple iphone) -android"),
            "+(title:apple title:iphone) -title:android"
        );
        assert_eq!(parse("apple^2"), "title:apple^2");
        assert_eq!(parse("(apple iphone)^3"), "(title:apple title:iphone)^3");
    }

    #[test]
    fn test_escapes() {
        let query = parser().parse(r"sku:AB\:12").unwrap();
        // StandardAnalyzer still splits and lowercases escaped text.
        assert!(matches!(query, Query::Boolean(_) | Query::Term(_)));

        let query = parser().parse(r"what\?").unwrap();
        assert!(matches!(query, Query::Term(_)));
    }

    #[test]
    fn test_multi_token_word_becomes_should_group() {
        let parser = QueryParser::new("title", Arc::new(ChineseAnalyzer::new()));
        let query = parser.parse("我爱苹果").unwrap();
        match query {
            Query::Boolean(boolean) => {
                assert!(boolean.clauses().len() > 1);
                assert!(boolean.clauses().iter().all(|c| c.occur == Occur::Should));
            }
            other => panic!("expected boolean query, got {other:?}"),
        }
    }

    #[test]
    fn test_quoted_text_requires_every_token() {
        let query = parser().parse("\"iphone plus\"").unwrap();
        assert_eq!(query.to_string(), "+title:iphone +title:plus");
    }

    #[test]
    fn test_syntax_errors() {
        assert!(parser().parse("").is_err());
        assert!(parser().parse("   ").is_err());
        assert!(parser().parse("(apple").is_err());
        assert!(parser().parse("apple)").is_err());
        assert!(parser().parse("\"apple").is_err());
        assert!(parser().parse("title:").is_err());
        assert!(parser().parse("apple^x").is_err());
        assert!(parser().parse("ti*le:apple").is_err());
    }

    #[test]
    fn test_pure_negation_stays_boolean() {
        let query = parser().parse("-apple").unwrap();
        match query {
            Query::Boolean(boolean) => assert!(boolean.is_pure_negation()),
            other => panic!("expected boolean query, got {other:?}"),
        }
    }
}
