//! End-to-end session behaviour across every storage backend.

use std::cell::Cell;
use std::rc::Rc;
use ticklist_core::config::{Backend, IdConfig, StorageConfig, TicklistConfig};
use ticklist_core::persist::{LoadSource, STORAGE_KEY};
use ticklist_core::storage::{FileStorage, KvStorage, MemoryStorage, SqliteStorage, StorageError};
use ticklist_core::store::ids::IdStrategy;
use ticklist_core::{Filter, Item, Session, Status};

fn summary(items: &[Item]) -> Vec<(&str, Status)> {
    items
        .iter()
        .map(|item| (item.text.as_str(), item.status))
        .collect()
}

/// Wraps a backend and counts reads and writes of the list slot.
#[derive(Clone, Default)]
struct Counting {
    inner: MemoryStorage,
    gets: Rc<Cell<usize>>,
    sets: Rc<Cell<usize>>,
}

impl KvStorage for Counting {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.gets.set(self.gets.get() + 1);
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.sets.set(self.sets.get() + 1);
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }

    fn backend(&self) -> &'static str {
        "counting"
    }
}

#[test]
fn buy_milk_walk_dog() {
    let mut session = Session::open_with(MemoryStorage::new(), IdStrategy::WallClock);

    let milk = session.add("Buy milk").expect("added");
    let dog = session.add("Walk dog").expect("added");
    assert_eq!(
        summary(&session.view()),
        [("Buy milk", Status::Pending), ("Walk dog", Status::Pending)]
    );

    session.toggle_status(milk);
    session.set_filter(Filter::Completed);
    assert_eq!(summary(&session.view()), [("Buy milk", Status::Completed)]);

    session.delete(dog);
    session.set_filter(Filter::All);
    assert_eq!(summary(&session.view()), [("Buy milk", Status::Completed)]);
}

#[test]
fn load_happens_once_and_every_change_saves_once() {
    let storage = Counting::default();
    let mut session = Session::open_with(storage.clone(), IdStrategy::Counter);
    assert_eq!(storage.gets.get(), 1);
    assert_eq!(storage.sets.get(), 0);

    let a = session.add("a").expect("added");
    session.add("b");
    session.toggle_status(a);
    session.add("");
    session.delete(a);
    session.delete(a);
    session.set_filter(Filter::Pending);

    assert_eq!(storage.gets.get(), 1);
    assert_eq!(storage.sets.get(), 4);
}

#[test]
fn toggling_completed_back_to_pending() {
    let mut session = Session::open_with(MemoryStorage::new(), IdStrategy::Counter);
    let id = session.add("Read book").expect("added");

    assert_eq!(session.toggle_status(id), Some(Status::Completed));
    assert_eq!(session.toggle_status(id), Some(Status::Pending));
    session.set_filter(Filter::Pending);
    assert_eq!(summary(&session.view()), [("Read book", Status::Pending)]);
}

fn reopen_roundtrip<S, F>(open: F)
where
    S: KvStorage + 'static,
    F: Fn() -> S,
{
    let mut first = Session::open_with(open(), IdStrategy::WallClock);
    let a = first.add("  first ").expect("added");
    first.add("second");
    first.add("third");
    first.toggle_status(a);
    let before = first.items();
    drop(first);

    let mut second = Session::open_with(open(), IdStrategy::WallClock);
    assert_eq!(second.load_source(), LoadSource::Stored);
    assert_eq!(second.items(), before);

    let next = second.add("fourth").expect("added");
    assert!(before.iter().all(|item| item.id < next));
}

#[test]
fn memory_backend_survives_reopen() {
    let storage = MemoryStorage::new();
    reopen_roundtrip(|| storage.clone());
}

#[test]
fn file_backend_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    reopen_roundtrip(|| FileStorage::new(dir.path()));
}

#[test]
fn sqlite_backend_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("ticklist.sqlite3");
    reopen_roundtrip(|| SqliteStorage::open(&path).expect("open sqlite"));
}

#[test]
fn session_from_config_uses_configured_backend() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = TicklistConfig {
        storage: StorageConfig {
            backend: Backend::File,
            path: Some(dir.path().to_path_buf()),
        },
        ids: IdConfig {
            strategy: IdStrategy::Counter,
        },
    };

    let mut session = Session::from_config(&config).expect("open");
    assert_eq!(session.backend(), "file");
    let id = session.add("Buy milk").expect("added");
    assert_eq!(id.get(), 1);

    let raw = FileStorage::new(dir.path())
        .get(STORAGE_KEY)
        .expect("read")
        .expect("written");
    assert_eq!(raw, r#"[{"id":1,"text":"Buy milk","status":"pending"}]"#);
}
