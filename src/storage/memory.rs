//! In-memory storage for tests and throwaway indexes.

use std::io::{Cursor, Read, Write};
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use parking_lot::Mutex;

use crate::error::{LucernaError, Result};
use crate::storage::{Storage, StorageError, StorageInput, StorageLock, StorageOutput};

type FileMap = Arc<Mutex<AHashMap<String, Arc<[u8]>>>>;

/// Configuration for [`MemoryStorage`].
#[derive(Debug, Clone)]
pub struct MemoryStorageConfig {
    /// Initial capacity of the file table.
    pub initial_capacity: usize,
}

impl Default for MemoryStorageConfig {
    fn default() -> Self {
        MemoryStorageConfig {
            initial_capacity: 16,
        }
    }
}

/// Storage that keeps every file in memory.
///
/// Cloning shares the underlying files and locks, so a writer and readers
/// created from clones see the same index.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    files: FileMap,
    locks: Arc<Mutex<AHashSet<String>>>,
}

impl MemoryStorage {
    pub fn new(config: MemoryStorageConfig) -> Self {
        MemoryStorage {
            files: Arc::new(Mutex::new(AHashMap::with_capacity(config.initial_capacity))),
            locks: Arc::new(Mutex::new(AHashSet::new())),
        }
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().len()
    }

    pub fn total_size(&self) -> u64 {
        self.files.lock().values().map(|data| data.len() as u64).sum()
    }

    /// Replace a file's bytes directly (test hook for corruption scenarios).
    pub fn overwrite(&self, name: &str, data: Vec<u8>) {
        self.files.lock().insert(name.to_string(), data.into());
    }

    /// Copy of a file's bytes.
    pub fn read_all(&self, name: &str) -> Option<Vec<u8>> {
        self.files.lock().get(name).map(|data| data.to_vec())
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new(MemoryStorageConfig::default())
    }
}

impl Storage for MemoryStorage {
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>> {
        let files = self.files.lock();
        let data = files
            .get(name)
            .ok_or_else(|| StorageError::FileNotFound(name.to_string()))?;
        Ok(Box::new(MemoryInput::new(Arc::clone(data))))
    }

    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>> {
        Ok(Box::new(MemoryOutput::new(
            name.to_string(),
            Arc::clone(&self.files),
        )))
    }

    fn file_exists(&self, name: &str) -> bool {
        self.files.lock().contains_key(name)
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        self.files.lock().remove(name);
        Ok(())
    }

    fn list_files(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.files.lock().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn file_size(&self, name: &str) -> Result<u64> {
        let files = self.files.lock();
        let data = files
            .get(name)
            .ok_or_else(|| StorageError::FileNotFound(name.to_string()))?;
        Ok(data.len() as u64)
    }

    fn rename_file(&self, old_name: &str, new_name: &str) -> Result<()> {
        let mut files = self.files.lock();
        let data = files
            .remove(old_name)
            .ok_or_else(|| StorageError::FileNotFound(old_name.to_string()))?;
        files.insert(new_name.to_string(), data);
        Ok(())
    }

    fn try_lock(&self, name: &str) -> Result<Option<Box<dyn StorageLock>>> {
        let mut locks = self.locks.lock();
        if !locks.insert(name.to_string()) {
            return Ok(None);
        }

        Ok(Some(Box::new(MemoryLock {
            name: name.to_string(),
            locks: Arc::clone(&self.locks),
            released: false,
        })))
    }
}

/// Reader over a snapshot of a file's bytes.
#[derive(Debug)]
pub struct MemoryInput {
    cursor: Cursor<Arc<[u8]>>,
}

impl MemoryInput {
    fn new(data: Arc<[u8]>) -> Self {
        MemoryInput {
            cursor: Cursor::new(data),
        }
    }
}

impl Read for MemoryInput {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl StorageInput for MemoryInput {
    fn size(&self) -> Result<u64> {
        Ok(self.cursor.get_ref().len() as u64)
    }
}

/// Buffers writes and publishes the file on close.
#[derive(Debug)]
pub struct MemoryOutput {
    name: String,
    buffer: Vec<u8>,
    files: FileMap,
    closed: bool,
}

impl MemoryOutput {
    fn new(name: String, files: FileMap) -> Self {
        MemoryOutput {
            name,
            buffer: Vec::new(),
            files,
            closed: false,
        }
    }
}

impl Write for MemoryOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.closed {
            return Err(std::io::Error::other("Output is closed"));
        }
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl StorageOutput for MemoryOutput {
    fn flush_and_sync(&mut self) -> Result<()> {
        Ok(())
    }

    fn position(&self) -> u64 {
        self.buffer.len() as u64
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(LucernaError::storage(format!(
                "Output {} already closed",
                self.name
            )));
        }
        let data: Arc<[u8]> = std::mem::take(&mut self.buffer).into();
        self.files.lock().insert(self.name.clone(), data);
        self.closed = true;
        Ok(())
    }
}

#[derive(Debug)]
struct MemoryLock {
    name: String,
    locks: Arc<Mutex<AHashSet<String>>>,
    released: bool,
}

impl StorageLock for MemoryLock {
    fn name(&self) -> &str {
        &self.name
    }

    fn release(&mut self) -> Result<()> {
        if !self.released {
            self.locks.lock().remove(&self.name);
            self.released = true;
        }
        Ok(())
    }

    fn is_valid(&self) -> bool {
        !self.released
    }
}

impl Drop for MemoryLock {
    fn drop(&mut self) {
        // Release on a memory lock cannot fail.
        let _ = self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_visible_only_after_close() {
        let storage = MemoryStorage::default();

        let mut output = storage.create_output("gen_000001.idx").unwrap();
        output.write_all(b"data").unwrap();
        assert!(!storage.file_exists("gen_000001.idx"));

        output.close().unwrap();
        assert!(storage.file_exists("gen_000001.idx"));
        assert_eq!(storage.file_size("gen_000001.idx").unwrap(), 4);
        assert_eq!(storage.total_size(), 4);
    }

    #[test]
    fn test_clones_share_files() {
        let storage = MemoryStorage::default();
        let other = storage.clone();

        let mut output = storage.create_output("a").unwrap();
        output.close().unwrap();

        assert!(other.file_exists("a"));
        assert_eq!(other.file_count(), 1);
    }

    #[test]
    fn test_rename_replaces_target() {
        let storage = MemoryStorage::default();
        storage.overwrite("commit.json", b"old".to_vec());
        storage.overwrite("commit.json.tmp", b"new".to_vec());

        storage.rename_file("commit.json.tmp", "commit.json").unwrap();

        assert_eq!(storage.read_all("commit.json").unwrap(), b"new");
        assert_eq!(storage.list_files().unwrap(), vec!["commit.json"]);
        assert!(storage.rename_file("missing", "x").is_err());
    }

    #[test]
    fn test_lock_released_on_drop() {
        let storage = MemoryStorage::default();

        let lock = storage.try_lock("write.lock").unwrap();
        assert!(lock.is_some());
        assert!(storage.try_lock("write.lock").unwrap().is_none());

        drop(lock);
        assert!(storage.try_lock("write.lock").unwrap().is_some());
    }
}
