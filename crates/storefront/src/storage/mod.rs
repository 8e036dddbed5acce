//! Local key-value storage for persisted client state.
//!
//! The cart is mirrored to storage as a single JSON blob under a fixed key.
//! Two backends are provided:
//!
//! - [`MemoryStorage`] - process-local map, used by tests and throwaway sessions
//! - [`FileStorage`] - one file per key under a data directory
//!
//! Both implement [`KeyValueStorage`], the seam the cart store is written against.

mod file;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Errors that can occur when reading or writing storage.
///
/// Cloneable so a single failure can be both reported to the waiting caller
/// and retained as the store's last write error.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error on {key}: {source}")]
    Io {
        /// Storage key being accessed.
        key: String,
        #[source]
        source: Arc<std::io::Error>,
    },

    /// Backend refused the operation.
    ///
    /// The bundled backends never return this; it is for [`KeyValueStorage`]
    /// implementations outside this crate, such as network or platform stores.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// The background writer stopped before the write was acknowledged.
    #[error("Storage writer closed before the write completed")]
    WriterClosed,
}

impl StorageError {
    pub(crate) fn io(key: &str, source: std::io::Error) -> Self {
        Self::Io {
            key: key.to_owned(),
            source: Arc::new(source),
        }
    }
}

/// Asynchronous string key-value storage.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`, or `None` if nothing is stored.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;
}
