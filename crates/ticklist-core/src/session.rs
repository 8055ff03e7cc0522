//! The surface a presentation layer talks to.
//!
//! A [`Session`] ties one [`ItemStore`] to one storage slot and carries the
//! transient filter. Opening a session hydrates the store exactly once; from
//! then on every applied mutation is saved before the mutating call returns,
//! and every registered view watcher is handed the recomputed filtered view.

#[cfg(not(target_arch = "wasm32"))]
use crate::config::{TicklistConfig, open_storage};
use crate::model::{Filter, Item, ItemId, Status};
use crate::persist::{self, Hydrated, LoadSource};
use crate::storage::KvStorage;
use crate::store::ids::IdStrategy;
use crate::store::{ItemStore, Snapshot};
use crate::view::{self, StatusCounts};
use std::fmt;
use tracing::{debug, info};

type ViewWatcher = Box<dyn FnMut(Filter, &[Item])>;

/// Handle returned by [`Session::watch_view`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(u64);

pub struct Session {
    store: ItemStore,
    filter: Filter,
    source: LoadSource,
    backend: &'static str,
    watchers: Vec<(WatchId, ViewWatcher)>,
    next_watch: u64,
}

impl Session {
    /// Open a session on `storage` with wall-clock ids.
    pub fn open<S: KvStorage + 'static>(storage: S) -> Self {
        Self::open_with(storage, IdStrategy::default())
    }

    /// Open a session on `storage`, hydrating from its `todos` slot.
    ///
    /// The storage handle moves into the store's save subscriber; it is read
    /// once here and written after each change.
    pub fn open_with<S: KvStorage + 'static>(storage: S, strategy: IdStrategy) -> Self {
        // `load` only yields items that passed validation.
        let Hydrated { items, source } = persist::load(&storage);
        let mut store = ItemStore::from_validated(items, strategy);

        let backend = storage.backend();
        store.subscribe(move |snapshot| persist::save_best_effort(&storage, snapshot));

        info!(backend, count = store.len(), source = ?source, %strategy, "session opened");
        Self {
            store,
            filter: Filter::default(),
            source,
            backend,
            watchers: Vec::new(),
            next_watch: 0,
        }
    }

    /// Open a session on the backend `config` selects.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_config(config: &TicklistConfig) -> anyhow::Result<Self> {
        let storage = open_storage(&config.storage)?;
        Ok(Self::open_with(storage, config.ids.strategy))
    }

    /// The filtered view, in collection order.
    #[must_use]
    pub fn view(&self) -> Vec<Item> {
        view::project(self.store.items(), self.filter)
    }

    /// The filtered view, borrowed.
    pub fn view_iter(&self) -> impl Iterator<Item = &Item> {
        view::iter(self.store.items(), self.filter)
    }

    /// The whole collection regardless of filter.
    #[must_use]
    pub fn items(&self) -> Snapshot {
        self.store.snapshot()
    }

    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.store.get(id)
    }

    #[must_use]
    pub fn counts(&self) -> StatusCounts {
        StatusCounts::tally(self.store.items())
    }

    #[must_use]
    pub const fn filter(&self) -> Filter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: Filter) {
        if self.filter == filter {
            return;
        }
        debug!(from = %self.filter, to = %filter, "filter changed");
        self.filter = filter;
        self.publish_view();
    }

    /// Set the filter from its name; unrecognized names select [`Filter::All`].
    pub fn set_filter_str(&mut self, raw: &str) -> Filter {
        let filter = Filter::parse_lossy(raw);
        self.set_filter(filter);
        filter
    }

    /// See [`ItemStore::add`].
    pub fn add(&mut self, text: &str) -> Option<ItemId> {
        let id = self.store.add(text)?;
        self.publish_view();
        Some(id)
    }

    /// See [`ItemStore::toggle_status`].
    pub fn toggle_status(&mut self, id: ItemId) -> Option<Status> {
        let status = self.store.toggle_status(id)?;
        self.publish_view();
        Some(status)
    }

    /// See [`ItemStore::delete`].
    pub fn delete(&mut self, id: ItemId) -> Option<Item> {
        let removed = self.store.delete(id)?;
        self.publish_view();
        Some(removed)
    }

    /// Call `watcher` with the filter and recomputed view after every applied
    /// mutation and every filter change.
    pub fn watch_view<F>(&mut self, watcher: F) -> WatchId
    where
        F: FnMut(Filter, &[Item]) + 'static,
    {
        let id = WatchId(self.next_watch);
        self.next_watch += 1;
        self.watchers.push((id, Box::new(watcher)));
        id
    }

    /// Remove a view watcher. Returns `false` if it was already gone.
    pub fn unwatch(&mut self, id: WatchId) -> bool {
        let before = self.watchers.len();
        self.watchers.retain(|(existing, _)| *existing != id);
        self.watchers.len() != before
    }

    /// How the initial collection was obtained.
    #[must_use]
    pub const fn load_source(&self) -> LoadSource {
        self.source
    }

    #[must_use]
    pub const fn backend(&self) -> &'static str {
        self.backend
    }

    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.store.revision()
    }

    fn publish_view(&mut self) {
        if self.watchers.is_empty() {
            return;
        }
        let filter = self.filter;
        let view = view::project(self.store.items(), filter);
        for (_, watcher) in &mut self.watchers {
            watcher(filter, &view);
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("store", &self.store)
            .field("filter", &self.filter)
            .field("source", &self.source)
            .field("backend", &self.backend)
            .field("watchers", &self.watchers.len())
            .finish()
    }
}
