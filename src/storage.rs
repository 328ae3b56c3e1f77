//! Storage abstraction for index files.
//!
//! The index writer and readers only ever talk to a [`Storage`]: a flat
//! namespace of immutable files plus named exclusive locks. Backends can be
//! swapped without touching the index code.
//!
//! # Storage Types
//!
//! - [`file::FileStorage`] - one directory on disk, locks are lock files
//! - [`memory::MemoryStorage`] - in-process maps, for tests and scratch indexes
//!
//! # Example
//!
//! ```
//! use std::io::{Read, Write};
//!
//! use lucerna::storage::memory::{MemoryStorage, MemoryStorageConfig};
//! use lucerna::storage::Storage;
//!
//! # fn main() -> lucerna::error::Result<()> {
//! let storage = MemoryStorage::new(MemoryStorageConfig::default());
//!
//! let mut output = storage.create_output("gen_000001.idx")?;
//! output.write_all(b"postings")?;
//! output.close()?;
//!
//! let mut input = storage.open_input("gen_000001.idx")?;
//! let mut buffer = Vec::new();
//! input.read_to_end(&mut buffer)?;
//! assert_eq!(buffer, b"postings");
//!
//! let lock = storage.try_lock("write.lock")?;
//! assert!(lock.is_some());
//! assert!(storage.try_lock("write.lock")?.is_none());
//! # Ok(())
//! # }
//! ```

use std::io::{Read, Write};

use crate::error::{LucernaError, Result};

pub mod file;
pub mod memory;
pub mod structured;

/// A flat namespace of index files.
pub trait Storage: Send + Sync + std::fmt::Debug {
    /// Open a file for reading.
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>>;

    /// Create (or truncate) a file for writing.
    ///
    /// The content becomes visible under `name` once the output is closed.
    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>>;

    fn file_exists(&self, name: &str) -> bool;

    /// Delete a file. Deleting a missing file is not an error.
    fn delete_file(&self, name: &str) -> Result<()>;

    /// Names of all files, sorted.
    fn list_files(&self) -> Result<Vec<String>>;

    fn file_size(&self, name: &str) -> Result<u64>;

    /// Atomically replace `new_name` with `old_name`.
    fn rename_file(&self, old_name: &str, new_name: &str) -> Result<()>;

    /// Try to take the named exclusive lock.
    ///
    /// Returns `Ok(None)` when someone else holds it. The lock is released
    /// when the returned handle is dropped or explicitly released.
    fn try_lock(&self, name: &str) -> Result<Option<Box<dyn StorageLock>>>;
}

/// Readable handle to a stored file.
pub trait StorageInput: Read + Send + std::fmt::Debug {
    /// Total size of the file in bytes.
    fn size(&self) -> Result<u64>;
}

/// Writable handle to a file being created.
pub trait StorageOutput: Write + Send + std::fmt::Debug {
    /// Flush buffers and make the bytes durable.
    fn flush_and_sync(&mut self) -> Result<()>;

    /// Bytes written so far.
    fn position(&self) -> u64;

    /// Finish the file and publish it under its name.
    fn close(&mut self) -> Result<()>;
}

impl StorageInput for Box<dyn StorageInput> {
    fn size(&self) -> Result<u64> {
        self.as_ref().size()
    }
}

impl StorageOutput for Box<dyn StorageOutput> {
    fn flush_and_sync(&mut self) -> Result<()> {
        self.as_mut().flush_and_sync()
    }

    fn position(&self) -> u64 {
        self.as_ref().position()
    }

    fn close(&mut self) -> Result<()> {
        self.as_mut().close()
    }
}

/// An exclusive named lock.
pub trait StorageLock: Send + std::fmt::Debug {
    fn name(&self) -> &str;

    /// Release the lock. Releasing twice is a no-op.
    fn release(&mut self) -> Result<()>;

    fn is_valid(&self) -> bool;
}

/// Storage-level failures, converted into [`LucernaError::Storage`].
#[derive(Debug, Clone)]
pub enum StorageError {
    FileNotFound(String),
    IoError(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::FileNotFound(name) => write!(f, "File not found: {name}"),
            StorageError::IoError(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for LucernaError {
    fn from(err: StorageError) -> Self {
        LucernaError::storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::FileNotFound("commit.json".to_string());
        assert_eq!(err.to_string(), "File not found: commit.json");

        let err: LucernaError = StorageError::IoError("disk full".to_string()).into();
        assert_eq!(err.to_string(), "Storage error: I/O error: disk full");
    }
}
