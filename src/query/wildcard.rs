//! Wildcard query.

use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::error::{LucernaError, Result};
use crate::query::{fmt_boost, validate_boost, validate_field};

/// Matches documents containing any term that matches a wildcard pattern.
///
/// `?` matches exactly one character and `*` any run of characters,
/// including none. A backslash makes the next character literal. The pattern
/// must match the whole term. Matching ignores case unless
/// [`case_sensitive`](Self::case_sensitive) turns it on.
///
/// # Examples
///
/// ```
/// use lucerna::query::wildcard::WildcardQuery;
///
/// let query = WildcardQuery::new("title", "9*g").unwrap();
/// assert!(query.matches("90g"));
/// assert!(query.matches("9G"));
/// assert!(!query.matches("19g"));
/// ```
#[derive(Debug, Clone)]
pub struct WildcardQuery {
    field: String,
    pattern: String,
    case_sensitive: bool,
    boost: f32,
    matcher: Regex,
}

impl WildcardQuery {
    pub fn new<F: Into<String>, P: Into<String>>(field: F, pattern: P) -> Result<Self> {
        let field = field.into();
        let pattern = pattern.into();
        validate_field(&field)?;
        if pattern.is_empty() {
            return Err(LucernaError::invalid_argument(
                "wildcard pattern must not be empty",
            ));
        }

        let matcher = Self::compile_pattern(&pattern, false)?;
        Ok(WildcardQuery {
            field,
            pattern,
            case_sensitive: false,
            boost: 1.0,
            matcher,
        })
    }

    pub fn with_boost(mut self, boost: f32) -> Result<Self> {
        self.boost = validate_boost(boost)?;
        Ok(self)
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Result<Self> {
        if case_sensitive != self.case_sensitive {
            self.matcher = Self::compile_pattern(&self.pattern, case_sensitive)?;
            self.case_sensitive = case_sensitive;
        }
        Ok(self)
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn boost(&self) -> f32 {
        self.boost
    }

    /// Whether a term matches the pattern.
    pub fn matches(&self, term: &str) -> bool {
        self.matcher.is_match(term)
    }

    /// Literal characters before the first wildcard.
    pub fn literal_prefix(&self) -> String {
        let mut prefix = String::new();
        let mut chars = self.pattern.chars();
        while let Some(c) = chars.next() {
            match c {
                '*' | '?' => break,
                '\\' => match chars.next() {
                    Some(escaped) => prefix.push(escaped),
                    None => break,
                },
                c => prefix.push(c),
            }
        }
        prefix
    }

    /// Prefix every matching term must start with, usable to narrow a
    /// vocabulary scan.
    ///
    /// Case-insensitive patterns only contribute their leading caseless
    /// characters (digits, CJK, punctuation).
    pub fn scan_prefix(&self) -> String {
        let prefix = self.literal_prefix();
        if self.case_sensitive {
            return prefix;
        }
        prefix
            .chars()
            .take_while(|c| c.to_lowercase().eq(c.to_uppercase()))
            .collect()
    }

    /// Whether the pattern matches every term of the field.
    pub fn matches_everything(&self) -> bool {
        !self.pattern.is_empty() && self.pattern.chars().all(|c| c == '*')
    }

    fn compile_pattern(pattern: &str, case_sensitive: bool) -> Result<Regex> {
        let mut regex_pattern = String::with_capacity(pattern.len() + 2);
        regex_pattern.push('^');

        let mut buf = [0u8; 4];
        let mut chars = pattern.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some(escaped) => {
                        regex_pattern.push_str(&regex::escape(escaped.encode_utf8(&mut buf)))
                    }
                    None => {
                        return Err(LucernaError::invalid_argument(format!(
                            "wildcard pattern '{pattern}' ends with a dangling escape"
                        )));
                    }
                },
                '*' => regex_pattern.push_str(".*"),
                '?' => regex_pattern.push('.'),
                c if c.is_control() => {
                    return Err(LucernaError::invalid_argument(format!(
                        "wildcard pattern contains control character {c:?}"
                    )));
                }
                c => regex_pattern.push_str(&regex::escape(c.encode_utf8(&mut buf))),
            }
        }
        regex_pattern.push('$');

        RegexBuilder::new(&regex_pattern)
            .case_insensitive(!case_sensitive)
            .dot_matches_new_line(true)
            .build()
            .map_err(|e| {
                LucernaError::invalid_argument(format!("invalid wildcard pattern '{pattern}': {e}"))
            })
    }
}

impl PartialEq for WildcardQuery {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field
            && self.pattern == other.pattern
            && self.case_sensitive == other.case_sensitive
            && self.boost == other.boost
    }
}

impl fmt::Display for WildcardQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.pattern)?;
        fmt_boost(f, self.boost)
    }
}
