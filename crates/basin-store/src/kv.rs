//! # Key-Value Port
//!
//! Abstract interface the ledger store drives. Two adapters ship with the
//! crate: [`InMemoryKvStore`] for tests and [`FileBackedKvStore`] for
//! durable single-file persistence.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Key-value adapter failures.
#[derive(Debug, Clone, Error)]
pub enum KvError {
    #[error("kv I/O error: {0}")]
    Io(String),

    #[error("kv corruption: {0}")]
    Corruption(String),
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone)]
pub enum BatchOperation {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

impl BatchOperation {
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

/// Abstract interface for key-value database operations.
pub trait KeyValueStore: Send {
    /// Get a value by key. A miss is `Ok(None)`, not an error.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KvError>;

    /// Check if a key exists.
    fn exists(&self, key: &[u8]) -> Result<bool, KvError>;

    /// Apply a batch atomically: either all operations land or none do.
    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KvError>;

    /// All committed pairs whose key starts with `prefix`.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KvError>;
}

/// In-memory key-value store for unit tests.
#[derive(Default)]
pub struct InMemoryKvStore {
    data: HashMap<Vec<u8>, Vec<u8>>,
    /// When set, the next batch write fails without applying anything.
    fail_next_write: bool,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `atomic_batch_write` fail, for commit-failure tests.
    pub fn fail_next_write(&mut self) {
        self.fail_next_write = true;
    }
}

impl KeyValueStore for InMemoryKvStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KvError> {
        Ok(self.data.get(key).cloned())
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KvError> {
        Ok(self.data.contains_key(key))
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KvError> {
        if self.fail_next_write {
            self.fail_next_write = false;
            return Err(KvError::Io("injected write failure".to_string()));
        }
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    self.data.insert(key, value);
                }
                BatchOperation::Delete { key } => {
                    self.data.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KvError> {
        Ok(self
            .data
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

/// File-backed key-value store.
///
/// Keeps the working set in memory and rewrites the backing file on every
/// batch commit, atomically via a temp file + rename. Suitable for nodes
/// whose bottleneck is block-append throughput, not key count.
pub struct FileBackedKvStore {
    data: HashMap<Vec<u8>, Vec<u8>>,
    path: PathBuf,
}

impl FileBackedKvStore {
    /// Open the store at `path`, loading any existing content.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, KvError> {
        let path = path.as_ref().to_path_buf();
        let data = match std::fs::read(&path) {
            Ok(bytes) => Self::decode_file(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(KvError::Io(err.to_string())),
        };
        if !data.is_empty() {
            tracing::debug!(keys = data.len(), path = %path.display(), "loaded kv store");
        }
        Ok(Self { data, path })
    }

    // File format: repeated [key_len:u32 LE][key][value_len:u32 LE][value].
    fn decode_file(bytes: &[u8]) -> Result<HashMap<Vec<u8>, Vec<u8>>, KvError> {
        let mut data = HashMap::new();
        let mut cursor = 0usize;
        while cursor < bytes.len() {
            let key = Self::read_chunk(bytes, &mut cursor)?;
            let value = Self::read_chunk(bytes, &mut cursor)?;
            data.insert(key, value);
        }
        Ok(data)
    }

    fn read_chunk(bytes: &[u8], cursor: &mut usize) -> Result<Vec<u8>, KvError> {
        let truncated = || KvError::Corruption("truncated kv file".to_string());
        let len_bytes: [u8; 4] = bytes
            .get(*cursor..*cursor + 4)
            .ok_or_else(truncated)?
            .try_into()
            .map_err(|_| truncated())?;
        *cursor += 4;
        let len = u32::from_le_bytes(len_bytes) as usize;
        let chunk = bytes.get(*cursor..*cursor + len).ok_or_else(truncated)?;
        *cursor += len;
        Ok(chunk.to_vec())
    }

    fn save_to_file(&self) -> Result<(), KvError> {
        use std::io::Write;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| KvError::Io(e.to_string()))?;
        }

        let mut bytes = Vec::new();
        for (key, value) in &self.data {
            bytes.extend_from_slice(&(key.len() as u32).to_le_bytes());
            bytes.extend_from_slice(key);
            bytes.extend_from_slice(&(value.len() as u32).to_le_bytes());
            bytes.extend_from_slice(value);
        }

        let temp_path = self.path.with_extension("tmp");
        let mut file = std::fs::File::create(&temp_path).map_err(|e| KvError::Io(e.to_string()))?;
        file.write_all(&bytes).map_err(|e| KvError::Io(e.to_string()))?;
        file.sync_all().map_err(|e| KvError::Io(e.to_string()))?;
        std::fs::rename(&temp_path, &self.path).map_err(|e| KvError::Io(e.to_string()))?;
        Ok(())
    }
}

impl KeyValueStore for FileBackedKvStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KvError> {
        Ok(self.data.get(key).cloned())
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KvError> {
        Ok(self.data.contains_key(key))
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KvError> {
        // Apply to a scratch copy first so a failed file write leaves the
        // in-memory view consistent with the file.
        let mut next = self.data.clone();
        for op in &operations {
            match op {
                BatchOperation::Put { key, value } => {
                    next.insert(key.clone(), value.clone());
                }
                BatchOperation::Delete { key } => {
                    next.remove(key);
                }
            }
        }
        let previous = std::mem::replace(&mut self.data, next);
        if let Err(err) = self.save_to_file() {
            self.data = previous;
            return Err(err);
        }
        Ok(())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KvError> {
        Ok(self
            .data
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
