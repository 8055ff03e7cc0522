//! Persistence adapter between the item store and a [`KvStorage`] slot.
//!
//! The whole collection lives in one slot under [`STORAGE_KEY`] as a JSON
//! array of `{"id", "text", "status"}` objects. Loading happens once per
//! session and never fails outward: anything other than a well-formed,
//! invariant-respecting array hydrates an empty list. Saving rewrites the
//! whole slot.

use crate::error::ErrorCode;
use crate::model::Item;
use crate::storage::{KvStorage, StorageError};
use crate::store::{InvariantViolation, validate};
use tracing::{debug, warn};

/// Slot holding the serialized collection.
pub const STORAGE_KEY: &str = "todos";

/// Stored data that cannot become a collection.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("stored list is not a JSON array of items: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("stored list breaks item invariants: {0}")]
    Invariant(#[from] InvariantViolation),
}

impl DecodeError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::CorruptState
    }
}

/// Failure to write the collection back.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("failed to encode list: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SaveError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Encode(_) => ErrorCode::InternalUnexpected,
            Self::Storage(err) => err.code(),
        }
    }
}

/// Where the hydrated collection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// The slot held a valid list (possibly empty).
    Stored,
    /// The slot was never written.
    Absent,
    /// The slot held data that could not be decoded; it was ignored.
    Corrupt,
    /// The backend failed to read the slot; it was treated as absent.
    Unreadable(ErrorCode),
}

/// Result of [`load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hydrated {
    pub items: Vec<Item>,
    pub source: LoadSource,
}

impl Hydrated {
    const fn empty(source: LoadSource) -> Self {
        Self {
            items: Vec::new(),
            source,
        }
    }
}

/// Serialize the collection to the stored JSON shape.
pub fn encode(items: &[Item]) -> Result<String, serde_json::Error> {
    serde_json::to_string(items)
}

/// Parse and validate a stored value.
pub fn decode(raw: &str) -> Result<Vec<Item>, DecodeError> {
    let items: Vec<Item> = serde_json::from_str(raw)?;
    validate(&items)?;
    Ok(items)
}

/// Read the initial collection from `storage`.
///
/// Never fails: absent, unreadable, or corrupt data hydrates an empty list,
/// and the reason is reported in [`Hydrated::source`].
pub fn load<S: KvStorage + ?Sized>(storage: &S) -> Hydrated {
    let raw = match storage.get(STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(backend = storage.backend(), "no stored list, starting empty");
            return Hydrated::empty(LoadSource::Absent);
        }
        Err(err) => {
            warn!(
                backend = storage.backend(),
                code = %err.code(),
                error = %err,
                "failed to read stored list, starting empty"
            );
            return Hydrated::empty(LoadSource::Unreadable(err.code()));
        }
    };

    match decode(&raw) {
        Ok(items) => {
            debug!(backend = storage.backend(), count = items.len(), "stored list restored");
            Hydrated {
                items,
                source: LoadSource::Stored,
            }
        }
        Err(err) => {
            warn!(
                backend = storage.backend(),
                code = %err.code(),
                error = %err,
                "ignoring corrupt stored list, starting empty"
            );
            Hydrated::empty(LoadSource::Corrupt)
        }
    }
}

/// Write the full collection to `storage`, replacing the previous value.
pub fn save<S: KvStorage + ?Sized>(storage: &S, items: &[Item]) -> Result<(), SaveError> {
    let raw = encode(items)?;
    storage.set(STORAGE_KEY, &raw)?;
    debug!(backend = storage.backend(), count = items.len(), "list saved");
    Ok(())
}

/// [`save`], logging instead of returning failures. Writes are best effort.
pub fn save_best_effort<S: KvStorage + ?Sized>(storage: &S, items: &[Item]) {
    if let Err(err) = save(storage, items) {
        warn!(
            backend = storage.backend(),
            code = %err.code(),
            error = %err,
            "failed to save list"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{DecodeError, LoadSource, STORAGE_KEY, decode, encode, load, save};
    use crate::error::ErrorCode;
    use crate::model::{Item, ItemId, Status};
    use crate::storage::{KvStorage, MemoryStorage, StorageError};

    fn item(id: u64, text: &str, status: Status) -> Item {
        Item {
            id: ItemId::new(id),
            text: text.into(),
            status,
        }
    }

    /// Backend whose every call fails.
    struct Broken;

    impl KvStorage for Broken {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("broken".into()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("broken".into()))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("broken".into()))
        }

        fn backend(&self) -> &'static str {
            "broken"
        }
    }

    #[test]
    fn decodes_web_client_format() {
        let raw = r#"[
            {"id":1718000000000,"text":"Buy milk","status":"completed"},
            {"id":1718000000500,"text":"Walk dog","status":"pending"}
        ]"#;
        let items = decode(raw).expect("valid list");
        assert_eq!(
            items,
            [
                item(1_718_000_000_000, "Buy milk", Status::Completed),
                item(1_718_000_000_500, "Walk dog", Status::Pending),
            ]
        );
    }

    #[test]
    fn ignores_unknown_fields() {
        let raw = r#"[{"id":3,"text":"x","status":"pending","color":"red"}]"#;
        assert_eq!(decode(raw).expect("valid").len(), 1);
    }

    #[test]
    fn rejects_wrong_shapes() {
        for raw in [
            "",
            "not json",
            "{}",
            "null",
            r#"[{"id":1,"text":"x"}]"#,
            r#"[{"id":1,"text":"x","status":"done"}]"#,
            r#"[{"id":-4,"text":"x","status":"pending"}]"#,
            r#"[{"id":1.5,"text":"x","status":"pending"}]"#,
            r#"[{"id":"1","text":"x","status":"pending"}]"#,
        ] {
            assert!(
                matches!(decode(raw), Err(DecodeError::Malformed(_))),
                "{raw:?} should be malformed"
            );
        }
    }

    #[test]
    fn rejects_invariant_violations() {
        let duplicate = r#"[
            {"id":1,"text":"a","status":"pending"},
            {"id":1,"text":"b","status":"pending"}
        ]"#;
        let blank = r#"[{"id":1,"text":"  ","status":"pending"}]"#;
        for raw in [duplicate, blank] {
            let err = decode(raw).expect_err("invariant violation");
            assert!(matches!(err, DecodeError::Invariant(_)));
            assert_eq!(err.code(), ErrorCode::CorruptState);
        }
    }

    #[test]
    fn encode_uses_storage_shape() {
        let raw = encode(&[item(5, "a", Status::Pending)]).expect("encode");
        assert_eq!(raw, r#"[{"id":5,"text":"a","status":"pending"}]"#);
        assert_eq!(encode(&[]).expect("encode"), "[]");
    }

    #[test]
    fn load_reports_absent_slot() {
        let hydrated = load(&MemoryStorage::new());
        assert!(hydrated.items.is_empty());
        assert_eq!(hydrated.source, LoadSource::Absent);
    }

    #[test]
    fn load_degrades_corrupt_slot_to_empty() {
        let storage = MemoryStorage::with_slot(STORAGE_KEY, "[{\"id\":");
        let hydrated = load(&storage);
        assert!(hydrated.items.is_empty());
        assert_eq!(hydrated.source, LoadSource::Corrupt);
        // The corrupt value stays until the next save overwrites it.
        assert!(storage.get(STORAGE_KEY).expect("read").is_some());
    }

    #[test]
    fn load_degrades_read_failure_to_empty() {
        let hydrated = load(&Broken);
        assert!(hydrated.items.is_empty());
        assert_eq!(
            hydrated.source,
            LoadSource::Unreadable(ErrorCode::StorageUnavailable)
        );
    }

    #[test]
    fn save_then_load_roundtrips() {
        let storage = MemoryStorage::new();
        let items = vec![
            item(9, "z", Status::Completed),
            item(2, "a", Status::Pending),
        ];
        save(&storage, &items).expect("save");

        let hydrated = load(&storage);
        assert_eq!(hydrated.items, items);
        assert_eq!(hydrated.source, LoadSource::Stored);
    }

    #[test]
    fn save_surfaces_storage_errors() {
        let err = save(&Broken, &[]).expect_err("broken backend");
        assert_eq!(err.code(), ErrorCode::StorageUnavailable);
        super::save_best_effort(&Broken, &[]);
    }
}
