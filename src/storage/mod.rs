//! String-keyed persistence used by the settings store and the fetch cache
//!
//! Both components only need durable, synchronous string storage. The
//! `KeyValueStore` trait is that seam; `FileStore` backs it with one JSON file
//! per key and `MemoryStore` keeps everything in a map.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Errors raised by a storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No platform directory could be resolved (e.g. no home directory)
    #[error("no storage directory available")]
    NoDirectory,
}

/// Durable string storage keyed by name
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if nothing is stored.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
