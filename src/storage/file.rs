//! Directory-backed storage.
//!
//! Outputs are buffered and optionally synced on every write. Locks are
//! lock files created with `create_new`, so a second process (or a second
//! writer in this process) sees the file and backs off.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{LucernaError, Result};
use crate::storage::{Storage, StorageError, StorageInput, StorageLock, StorageOutput};

/// Configuration for [`FileStorage`].
#[derive(Debug, Clone)]
pub struct FileStorageConfig {
    /// Index directory; created if missing.
    pub path: PathBuf,

    /// Read and write buffer size in bytes.
    pub buffer_size: usize,

    /// Flush to the OS after every write call.
    pub sync_writes: bool,
}

impl FileStorageConfig {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileStorageConfig {
            path: path.as_ref().to_path_buf(),
            buffer_size: 65536,
            sync_writes: false,
        }
    }
}

/// Storage rooted at a directory.
#[derive(Debug)]
pub struct FileStorage {
    directory: PathBuf,
    config: FileStorageConfig,
}

impl FileStorage {
    pub fn new(config: FileStorageConfig) -> Result<Self> {
        let directory = config.path.clone();

        if !directory.exists() {
            std::fs::create_dir_all(&directory)
                .map_err(|e| LucernaError::storage(format!("Failed to create directory: {e}")))?;
        }

        if !directory.is_dir() {
            return Err(LucernaError::storage(format!(
                "Path is not a directory: {}",
                directory.display()
            )));
        }

        Ok(FileStorage { directory, config })
    }

    /// Open the directory with default settings.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(FileStorageConfig::new(path))
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.directory.join(name)
    }
}

fn map_not_found(name: &str, e: std::io::Error) -> StorageError {
    if e.kind() == std::io::ErrorKind::NotFound {
        StorageError::FileNotFound(name.to_string())
    } else {
        StorageError::IoError(e.to_string())
    }
}

impl Storage for FileStorage {
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>> {
        let file = File::open(self.file_path(name)).map_err(|e| map_not_found(name, e))?;
        Ok(Box::new(FileInput::new(file, self.config.buffer_size)?))
    }

    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.file_path(name))
            .map_err(|e| StorageError::IoError(e.to_string()))?;

        Ok(Box::new(FileOutput::new(
            file,
            self.config.buffer_size,
            self.config.sync_writes,
        )))
    }

    fn file_exists(&self, name: &str) -> bool {
        self.file_path(name).exists()
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        let path = self.file_path(name);
        if path.exists() {
            std::fs::remove_file(&path)
                .map_err(|e| StorageError::IoError(format!("Failed to delete file: {e}")))?;
        }
        Ok(())
    }

    fn list_files(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();

        for entry in
            std::fs::read_dir(&self.directory).map_err(|e| StorageError::IoError(e.to_string()))?
        {
            let entry = entry.map_err(|e| StorageError::IoError(e.to_string()))?;
            let path = entry.path();
            if path.is_file() {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    files.push(name.to_string());
                }
            }
        }

        files.sort();
        Ok(files)
    }

    fn file_size(&self, name: &str) -> Result<u64> {
        let metadata = self
            .file_path(name)
            .metadata()
            .map_err(|e| map_not_found(name, e))?;
        Ok(metadata.len())
    }

    fn rename_file(&self, old_name: &str, new_name: &str) -> Result<()> {
        std::fs::rename(self.file_path(old_name), self.file_path(new_name))
            .map_err(|e| StorageError::IoError(format!("Failed to rename file: {e}")))?;
        Ok(())
    }

    fn try_lock(&self, name: &str) -> Result<Option<Box<dyn StorageLock>>> {
        let path = self.file_path(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => Ok(Some(Box::new(FileLock::acquire(name, path, file)?))),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(None),
            Err(e) => Err(StorageError::IoError(e.to_string()).into()),
        }
    }
}

/// Buffered reader over a stored file.
#[derive(Debug)]
pub struct FileInput {
    reader: BufReader<File>,
    size: u64,
}

impl FileInput {
    fn new(file: File, buffer_size: usize) -> Result<Self> {
        let size = file
            .metadata()
            .map_err(|e| LucernaError::storage(format!("Failed to get file metadata: {e}")))?
            .len();

        Ok(FileInput {
            reader: BufReader::with_capacity(buffer_size, file),
            size,
        })
    }
}

impl Read for FileInput {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

impl StorageInput for FileInput {
    fn size(&self) -> Result<u64> {
        Ok(self.size)
    }
}

/// Buffered writer for a new file.
#[derive(Debug)]
pub struct FileOutput {
    writer: BufWriter<File>,
    sync_writes: bool,
    position: u64,
}

impl FileOutput {
    fn new(file: File, buffer_size: usize, sync_writes: bool) -> Self {
        FileOutput {
            writer: BufWriter::with_capacity(buffer_size, file),
            sync_writes,
            position: 0,
        }
    }
}

impl Write for FileOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let bytes_written = self.writer.write(buf)?;
        self.position += bytes_written as u64;

        if self.sync_writes {
            self.writer.flush()?;
        }

        Ok(bytes_written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl StorageOutput for FileOutput {
    fn flush_and_sync(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| LucernaError::storage(format!("Failed to flush: {e}")))?;
        self.writer
            .get_ref()
            .sync_all()
            .map_err(|e| LucernaError::storage(format!("Failed to sync: {e}")))?;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn close(&mut self) -> Result<()> {
        self.flush_and_sync()
    }
}

/// A held lock file; removed on release or drop.
#[derive(Debug)]
struct FileLock {
    name: String,
    path: PathBuf,
    released: bool,
}

impl FileLock {
    /// Own a freshly created lock file, then record the holder's pid in it.
    ///
    /// The guard exists before the write, so a failed write removes the file.
    fn acquire<W: Write>(name: &str, path: PathBuf, mut file: W) -> Result<Self> {
        let lock = FileLock {
            name: name.to_string(),
            path,
            released: false,
        };
        writeln!(file, "pid={}", std::process::id())?;
        Ok(lock)
    }
}

impl StorageLock for FileLock {
    fn name(&self) -> &str {
        &self.name
    }

    fn release(&mut self) -> Result<()> {
        if !self.released {
            std::fs::remove_file(&self.path)
                .map_err(|e| LucernaError::storage(format!("Failed to release lock: {e}")))?;
            self.released = true;
        }
        Ok(())
    }

    fn is_valid(&self) -> bool {
        !self.released
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            log::warn!("could not remove lock file {}: {e}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, FileStorage) {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::open(temp_dir.path()).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_write_read_file() {
        let (_dir, storage) = create_test_storage();

        let mut output = storage.create_output("test.bin").unwrap();
        output.write_all(b"Hello, World!").unwrap();
        assert_eq!(output.position(), 13);
        output.close().unwrap();

        let mut input = storage.open_input("test.bin").unwrap();
        assert_eq!(input.size().unwrap(), 13);
        let mut buffer = Vec::new();
        input.read_to_end(&mut buffer).unwrap();
        assert_eq!(buffer, b"Hello, World!");
    }

    #[test]
    fn test_missing_file() {
        let (_dir, storage) = create_test_storage();
        let err = storage.open_input("nope.bin").unwrap_err();
        assert!(err.to_string().contains("File not found: nope.bin"));
        assert!(storage.delete_file("nope.bin").is_ok());
    }

    #[test]
    fn test_rename_and_list() {
        let (_dir, storage) = create_test_storage();

        let mut output = storage.create_output("b.tmp").unwrap();
        output.write_all(b"x").unwrap();
        output.close().unwrap();
        storage.rename_file("b.tmp", "b.json").unwrap();

        let mut output = storage.create_output("a.idx").unwrap();
        output.close().unwrap();

        assert_eq!(storage.list_files().unwrap(), vec!["a.idx", "b.json"]);
    }

    #[test]
    fn test_lock_is_exclusive_until_dropped() {
        let (_dir, storage) = create_test_storage();

        let lock = storage.try_lock("write.lock").unwrap().unwrap();
        assert_eq!(lock.name(), "write.lock");
        assert!(lock.is_valid());
        assert!(storage.try_lock("write.lock").unwrap().is_none());

        drop(lock);
        assert!(!storage.file_exists("write.lock"));
        assert!(storage.try_lock("write.lock").unwrap().is_some());
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_lock_write_removes_lock_file() {
        let (_dir, storage) = create_test_storage();
        let path = storage.directory().join("write.lock");
        File::create(&path).unwrap();

        let result = FileLock::acquire("write.lock", path.clone(), FailingWriter);
        assert!(result.is_err());
        assert!(!path.exists());
        assert!(storage.try_lock("write.lock").unwrap().is_some());
    }

    #[test]
    fn test_lock_release_is_idempotent() {
        let (_dir, storage) = create_test_storage();

        let mut lock = storage.try_lock("write.lock").unwrap().unwrap();
        lock.release().unwrap();
        lock.release().unwrap();
        assert!(!lock.is_valid());
    }
}
