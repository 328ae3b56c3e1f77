//! Numeric range query.

use std::cmp::Ordering;
use std::fmt;

use crate::document::field::Numeric;
use crate::error::{LucernaError, Result};
use crate::query::{fmt_boost, validate_boost, validate_field};

/// Matches documents whose numeric field lies within bounds.
///
/// Each bound is inclusive or exclusive independently. A missing bound
/// leaves that side open. Matching documents score a constant equal to the
/// boost.
///
/// # Examples
///
/// ```
/// use lucerna::query::range::NumericRangeQuery;
///
/// let query = NumericRangeQuery::new("id", 20, 40, false, true).unwrap();
/// assert_eq!(query.to_string(), "id:{20 TO 40]");
///
/// assert!(NumericRangeQuery::new_inclusive("id", 40, 20).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NumericRangeQuery {
    field: String,
    min: Option<Numeric>,
    max: Option<Numeric>,
    min_inclusive: bool,
    max_inclusive: bool,
    boost: f32,
}

impl NumericRangeQuery {
    pub fn new<F, L, U>(
        field: F,
        min: L,
        max: U,
        min_inclusive: bool,
        max_inclusive: bool,
    ) -> Result<Self>
    where
        F: Into<String>,
        L: Into<Numeric>,
        U: Into<Numeric>,
    {
        Self::with_bounds(
            field,
            Some(min.into()),
            Some(max.into()),
            min_inclusive,
            max_inclusive,
        )
    }

    /// Both bounds inclusive.
    pub fn new_inclusive<F, L, U>(field: F, min: L, max: U) -> Result<Self>
    where
        F: Into<String>,
        L: Into<Numeric>,
        U: Into<Numeric>,
    {
        Self::new(field, min, max, true, true)
    }

    /// Range with optional bounds; `None` leaves that side open.
    pub fn with_bounds<F: Into<String>>(
        field: F,
        min: Option<Numeric>,
        max: Option<Numeric>,
        min_inclusive: bool,
        max_inclusive: bool,
    ) -> Result<Self> {
        let field = field.into();
        validate_field(&field)?;

        for bound in min.iter().chain(max.iter()) {
            if !bound.is_finite() {
                return Err(LucernaError::invalid_argument(format!(
                    "range bound must be finite, got {bound}"
                )));
            }
        }
        if let (Some(lower), Some(upper)) = (&min, &max) {
            if lower.compare(upper) == Ordering::Greater {
                return Err(LucernaError::invalid_argument(format!(
                    "range lower bound {lower} is greater than upper bound {upper}"
                )));
            }
        }

        Ok(NumericRangeQuery {
            field,
            min,
            max,
            min_inclusive,
            max_inclusive,
            boost: 1.0,
        })
    }

    pub fn with_boost(mut self, boost: f32) -> Result<Self> {
        self.boost = validate_boost(boost)?;
        Ok(self)
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn min(&self) -> Option<&Numeric> {
        self.min.as_ref()
    }

    pub fn max(&self) -> Option<&Numeric> {
        self.max.as_ref()
    }

    pub fn min_inclusive(&self) -> bool {
        self.min_inclusive
    }

    pub fn max_inclusive(&self) -> bool {
        self.max_inclusive
    }

    pub fn boost(&self) -> f32 {
        self.boost
    }
}

impl fmt::Display for NumericRangeQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = if self.min_inclusive { '[' } else { '{' };
        let close = if self.max_inclusive { ']' } else { '}' };
        let min = self.min.map_or_else(|| "*".to_string(), |n| n.to_string());
        let max = self.max.map_or_else(|| "*".to_string(), |n| n.to_string());
        write!(f, "{}:{open}{min} TO {max}{close}", self.field)?;
        fmt_boost(f, self.boost)
    }
}
