//! Field values and field kinds.
//!
//! A [`Field`] is a named [`FieldValue`] plus a `stored` flag. The variant of
//! the value decides how the field is indexed:
//!
//! - **StoredOnly** - kept in the document store, never indexed
//! - **Text** - analyzed into terms for full-text search
//! - **Exact** - indexed as one untouched term (identifiers, URLs)
//! - **Numeric** - kept as a doc value for range queries
//!
//! # Examples
//!
//! ```
//! use lucerna::document::field::{Field, FieldKind, FieldValue, Numeric};
//!
//! let field = Field::numeric("status", 1);
//! assert_eq!(field.kind(), FieldKind::Numeric);
//! assert_eq!(field.value().as_numeric(), Some(Numeric::Integer(1)));
//!
//! let field = Field::text("title", "苹果 iPhone").stored(false);
//! assert!(!field.is_stored());
//! assert_eq!(field.value(), &FieldValue::Text("苹果 iPhone".to_string()));
//! ```

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LucernaError, Result};

/// How a field participates in indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// Retrievable only.
    StoredOnly,
    /// Analyzed into terms.
    IndexedTokenized,
    /// Indexed as a single term equal to the raw value.
    IndexedExact,
    /// Numeric value usable in range queries.
    Numeric,
}

impl FieldKind {
    /// Whether values of this kind produce postings.
    pub fn is_indexed(&self) -> bool {
        matches!(self, FieldKind::IndexedTokenized | FieldKind::IndexedExact)
    }
}

/// A numeric field value.
///
/// Integers compare exactly with each other; any comparison involving a float
/// is done in `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Numeric {
    Integer(i64),
    Float(f64),
}

impl Numeric {
    /// The value as `f64` (lossy for very large integers).
    pub fn as_f64(&self) -> f64 {
        match self {
            Numeric::Integer(v) => *v as f64,
            Numeric::Float(v) => *v,
        }
    }

    /// The value as `i64`, if it is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Numeric::Integer(v) => Some(*v),
            Numeric::Float(_) => None,
        }
    }

    /// Whether the value is a usable number (integers always are).
    pub fn is_finite(&self) -> bool {
        match self {
            Numeric::Integer(_) => true,
            Numeric::Float(v) => v.is_finite(),
        }
    }

    /// Total comparison of two finite numerics.
    ///
    /// Integers and floats compare exactly, without rounding the integer to
    /// `f64`. NaN never reaches this method because documents and range
    /// queries reject it; should one appear it compares as equal.
    pub fn compare(&self, other: &Numeric) -> Ordering {
        match (self, other) {
            (Numeric::Integer(a), Numeric::Integer(b)) => a.cmp(b),
            (Numeric::Integer(a), Numeric::Float(b)) => compare_int_float(*a, *b),
            (Numeric::Float(a), Numeric::Integer(b)) => compare_int_float(*b, *a).reverse(),
            (Numeric::Float(a), Numeric::Float(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
        }
    }
}

/// 2^63, the smallest float above every `i64`.
const I64_UPPER_BOUND: f64 = 9_223_372_036_854_775_808.0;

fn compare_int_float(int: i64, float: f64) -> Ordering {
    if float.is_nan() {
        return Ordering::Equal;
    }
    if float >= I64_UPPER_BOUND {
        return Ordering::Less;
    }
    if float < -I64_UPPER_BOUND {
        return Ordering::Greater;
    }

    // The integral part now fits in i64 exactly.
    let integral = float.trunc();
    match int.cmp(&(integral as i64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(float - integral)).unwrap_or(Ordering::Equal),
        ordering => ordering,
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Integer(v) => write!(f, "{v}"),
            Numeric::Float(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for Numeric {
    fn from(value: i64) -> Self {
        Numeric::Integer(value)
    }
}

impl From<i32> for Numeric {
    fn from(value: i32) -> Self {
        Numeric::Integer(value as i64)
    }
}

impl From<u32> for Numeric {
    fn from(value: u32) -> Self {
        Numeric::Integer(value as i64)
    }
}

impl From<f64> for Numeric {
    fn from(value: f64) -> Self {
        Numeric::Float(value)
    }
}

impl From<f32> for Numeric {
    fn from(value: f32) -> Self {
        Numeric::Float(value as f64)
    }
}

/// The value of a field, tagged with its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    StoredOnly(String),
    Text(String),
    Exact(String),
    Numeric(Numeric),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::StoredOnly(_) => FieldKind::StoredOnly,
            FieldValue::Text(_) => FieldKind::IndexedTokenized,
            FieldValue::Exact(_) => FieldKind::IndexedExact,
            FieldValue::Numeric(_) => FieldKind::Numeric,
        }
    }

    /// String content of the non-numeric variants.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::StoredOnly(s) | FieldValue::Text(s) | FieldValue::Exact(s) => Some(s),
            FieldValue::Numeric(_) => None,
        }
    }

    pub fn as_numeric(&self) -> Option<Numeric> {
        match self {
            FieldValue::Numeric(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::StoredOnly(s) | FieldValue::Text(s) | FieldValue::Exact(s) => {
                write!(f, "{s}")
            }
            FieldValue::Numeric(n) => write!(f, "{n}"),
        }
    }
}

/// A named field of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    name: String,
    value: FieldValue,
    stored: bool,
}

impl Field {
    /// Create a field; every field is stored unless [`Field::stored`] says otherwise.
    pub fn new<S: Into<String>>(name: S, value: FieldValue) -> Self {
        Field {
            name: name.into(),
            value,
            stored: true,
        }
    }

    pub fn stored_only<S: Into<String>, T: Into<String>>(name: S, value: T) -> Self {
        Field::new(name, FieldValue::StoredOnly(value.into()))
    }

    pub fn text<S: Into<String>, T: Into<String>>(name: S, value: T) -> Self {
        Field::new(name, FieldValue::Text(value.into()))
    }

    pub fn exact<S: Into<String>, T: Into<String>>(name: S, value: T) -> Self {
        Field::new(name, FieldValue::Exact(value.into()))
    }

    pub fn numeric<S: Into<String>, N: Into<Numeric>>(name: S, value: N) -> Self {
        Field::new(name, FieldValue::Numeric(value.into()))
    }

    /// Set whether the value is kept for retrieval. Stored-only fields stay stored.
    pub fn stored(mut self, stored: bool) -> Self {
        self.stored = stored || matches!(self.value, FieldValue::StoredOnly(_));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    pub fn kind(&self) -> FieldKind {
        self.value.kind()
    }

    pub fn is_stored(&self) -> bool {
        self.stored
    }

    /// Check the field can be admitted to an index.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(LucernaError::invalid_argument("field name must not be empty"));
        }
        match &self.value {
            FieldValue::Numeric(n) if !n.is_finite() => Err(LucernaError::invalid_argument(
                format!("numeric field '{}' must be finite, got {n}", self.name),
            )),
            _ => Ok(()),
        }
    }
}
