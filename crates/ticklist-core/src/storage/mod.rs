//! Durable string-keyed storage slots.
//!
//! The persistence adapter only needs "read the value under a key" and
//! "replace the value under a key". [`KvStorage`] is that seam; each backend
//! implements it for one kind of medium.

#[cfg(not(target_arch = "wasm32"))]
mod file;
mod memory;
#[cfg(not(target_arch = "wasm32"))]
mod sqlite;

#[cfg(all(feature = "browser", target_arch = "wasm32"))]
mod browser;

#[cfg(all(feature = "browser", target_arch = "wasm32"))]
pub use browser::LocalStorage;
#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;
pub use memory::MemoryStorage;
#[cfg(not(target_arch = "wasm32"))]
pub use sqlite::SqliteStorage;

use crate::error::ErrorCode;
#[cfg(not(target_arch = "wasm32"))]
use crate::lock::LockError;
use std::{io, path::PathBuf};

/// Errors raised by storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[cfg(not(target_arch = "wasm32"))]
    #[error("sqlite storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[cfg(not(target_arch = "wasm32"))]
    #[error(transparent)]
    Lock(#[from] LockError),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// Machine-readable code associated with this storage error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidKey(_) => ErrorCode::InvalidStorageKey,
            Self::Read { .. } => ErrorCode::StorageReadFailed,
            Self::Write { .. } => ErrorCode::StorageWriteFailed,
            #[cfg(not(target_arch = "wasm32"))]
            Self::Sqlite(_) => ErrorCode::StorageWriteFailed,
            #[cfg(not(target_arch = "wasm32"))]
            Self::Lock(err) => err.code(),
            Self::Unavailable(_) => ErrorCode::StorageUnavailable,
        }
    }
}

/// A set of string-keyed slots holding string values.
///
/// Writes replace the whole value; there is no merge or append.
pub trait KvStorage {
    /// Value under `key`, or `None` if the slot was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Clear the slot. Clearing an empty slot is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

impl<T: KvStorage + ?Sized> KvStorage for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }

    fn backend(&self) -> &'static str {
        (**self).backend()
    }
}

/// Reject keys that cannot be used as a file stem on every platform.
///
/// Keys are non-empty ASCII alphanumerics plus `-`, `_`, and a non-leading
/// `.`.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
