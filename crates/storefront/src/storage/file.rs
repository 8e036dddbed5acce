//! File-backed storage backend.
//!
//! Each key maps to `<data_dir>/<encoded key>.json`. Keys such as
//! `@GoMarketPlace:products` contain characters that are not portable in
//! file names, so anything outside `[A-Za-z0-9._~-]` is percent-encoded.
//!
//! Writes go to a temporary sibling file which is then renamed over the
//! target, so a reader never observes a half-written blob.

use std::borrow::Cow;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{KeyValueStorage, StorageError};

/// Storage that keeps one file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create a storage rooted at `dir`. The directory is created lazily on
    /// the first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the stored files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file that stores `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", encode_key(key)))
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No stored value");
                Ok(None)
            }
            Err(e) => Err(StorageError::io(key, e)),
        }
    }

    #[instrument(skip(self, value), fields(dir = %self.dir.display(), bytes = value.len()))]
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StorageError::io(key, e))?;

        let target = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.tmp", encode_key(key)));

        tokio::fs::write(&tmp, value.as_bytes())
            .await
            .map_err(|e| StorageError::io(key, e))?;
        tokio::fs::rename(&tmp, &target)
            .await
            .map_err(|e| StorageError::io(key, e))?;

        debug!(path = %target.display(), "Stored value");
        Ok(())
    }
}

fn encode_key(key: &str) -> Cow<'_, str> {
    urlencoding::encode(key)
}
