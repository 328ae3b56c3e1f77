//! Match-all query.

use std::fmt;

use crate::error::Result;
use crate::query::{fmt_boost, validate_boost};

/// Matches every live document with a constant score equal to the boost.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchAllQuery {
    boost: f32,
}

impl MatchAllQuery {
    pub fn new() -> Self {
        MatchAllQuery { boost: 1.0 }
    }

    pub fn with_boost(mut self, boost: f32) -> Result<Self> {
        self.boost = validate_boost(boost)?;
        Ok(self)
    }

    pub fn boost(&self) -> f32 {
        self.boost
    }
}

impl Default for MatchAllQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MatchAllQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "*:*")?;
        fmt_boost(f, self.boost)
    }
}
