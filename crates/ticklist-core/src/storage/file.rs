use super::{KvStorage, StorageError, validate_key};
use crate::lock::{DEFAULT_LOCK_TIMEOUT, SlotLock};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::trace;

/// One `<key>.json` file per slot inside a base directory.
///
/// Writes go to `<key>.json.tmp` and are renamed over the slot file while
/// holding an exclusive lock on `<key>.lock`, so readers only ever see a
/// complete previous or complete new value.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `base_path`. The directory is created on first write.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of the file backing `key`.
    pub fn slot_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.base_path.join(format!("{key}.json")))
    }

    fn lock_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{key}.lock"))
    }
}

impl KvStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read { path, source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;
        let lock = SlotLock::acquire(&self.lock_path(key), DEFAULT_LOCK_TIMEOUT)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|source| StorageError::Write {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StorageError::Write {
            path: path.clone(),
            source,
        })?;

        lock.release();
        trace!(path = %path.display(), bytes = value.len(), "slot written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;
        let lock = SlotLock::acquire(&self.lock_path(key), DEFAULT_LOCK_TIMEOUT)?;
        let result = match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Write { path, source }),
        };
        lock.release();
        result
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}
