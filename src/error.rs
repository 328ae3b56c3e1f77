//! Error types for the Lucerna library.
//!
//! All fallible operations return [`Result`], whose error type is the
//! [`LucernaError`] enum.
//!
//! # Examples
//!
//! ```
//! use lucerna::error::{LucernaError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(LucernaError::invalid_argument("min must not exceed max"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Lucerna operations.
///
/// The variants follow the failure taxonomy of the engine: malformed input is
/// rejected with [`LucernaError::InvalidArgument`] at the call that receives
/// it, lifecycle violations surface as [`LucernaError::IllegalState`], and
/// everything that comes from the storage layer is an I/O kind
/// ([`LucernaError::Io`], [`LucernaError::Storage`], [`LucernaError::Corrupt`]).
/// Absence of a document is not an error; see
/// [`IndexReader::fetch`](crate::index::reader::IndexReader::fetch).
#[derive(Error, Debug)]
pub enum LucernaError {
    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed argument (bad range bounds, negative edit distance, empty names).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation not allowed in the current state (closed writer, missing index, held lock).
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Index data failed an integrity check.
    #[error("Corrupt index: {0}")]
    Corrupt(String),

    /// Analysis-related errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for operations that may fail with LucernaError.
pub type Result<T> = std::result::Result<T, LucernaError>;

impl LucernaError {
    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        LucernaError::InvalidArgument(msg.into())
    }

    /// Create a new illegal state error.
    pub fn illegal_state<S: Into<String>>(msg: S) -> Self {
        LucernaError::IllegalState(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        LucernaError::Storage(msg.into())
    }

    /// Create a new corruption error.
    pub fn corrupt<S: Into<String>>(msg: S) -> Self {
        LucernaError::Corrupt(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        LucernaError::Analysis(msg.into())
    }

    /// Whether this error originates from the storage layer.
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            LucernaError::Io(_) | LucernaError::Storage(_) | LucernaError::Corrupt(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = LucernaError::invalid_argument("min > max");
        assert_eq!(error.to_string(), "Invalid argument: min > max");

        let error = LucernaError::illegal_state("writer is closed");
        assert_eq!(error.to_string(), "Illegal state: writer is closed");

        let error = LucernaError::corrupt("checksum mismatch");
        assert_eq!(error.to_string(), "Corrupt index: checksum mismatch");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let lucerna_error = LucernaError::from(io_error);

        match lucerna_error {
            LucernaError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
        assert!(LucernaError::storage("disk full").is_io());
        assert!(!LucernaError::invalid_argument("x").is_io());
    }
}
