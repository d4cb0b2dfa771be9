//! Store configuration.

use std::path::PathBuf;

/// Configuration for the ledger store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory the backing file lives in.
    pub path: PathBuf,
    /// Maximum number of recent block stamps kept resolvable.
    pub stamp_cache_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data"),
            stamp_cache_capacity: 720,
        }
    }
}

impl StoreConfig {
    /// Path of the backing store file.
    pub fn store_path(&self) -> PathBuf {
        self.path.join("store.db")
    }
}
