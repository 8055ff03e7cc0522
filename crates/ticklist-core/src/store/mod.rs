//! The item store: authoritative ordered collection plus its three mutations.
//!
//! The collection is held as an immutable [`Snapshot`]. Every mutation that
//! changes something builds a complete new snapshot, installs it, bumps the
//! revision, and then publishes it synchronously to every subscriber in
//! registration order. Mutations that change nothing (blank text, unknown id)
//! publish nothing.
//!
//! None of the operations can fail. Unknown ids are treated as stale
//! references from the presentation layer and ignored.

pub mod ids;

use crate::model::{Item, ItemId, Status};
use ids::{IdSource, IdStrategy};
use std::{collections::HashSet, fmt, sync::Arc};
use tracing::{debug, trace};

/// Immutable view of the whole collection at one revision.
pub type Snapshot = Arc<[Item]>;

type Subscriber = Box<dyn FnMut(&Snapshot)>;

/// Handle returned by [`ItemStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A collection that breaks the item invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("duplicate item id {0}")]
    DuplicateId(ItemId),

    #[error("item {0} has blank text")]
    BlankText(ItemId),
}

/// Check that ids are unique and no text is blank.
///
/// # Errors
///
/// Returns the first violation found, scanning in collection order.
pub fn validate(items: &[Item]) -> Result<(), InvariantViolation> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.id) {
            return Err(InvariantViolation::DuplicateId(item.id));
        }
        if item.text.trim().is_empty() {
            return Err(InvariantViolation::BlankText(item.id));
        }
    }
    Ok(())
}

/// Smallest id `>= 1` that no item carries.
fn lowest_unused_id(items: &[Item]) -> Option<ItemId> {
    let mut used: Vec<u64> = items.iter().map(|item| item.id.get()).collect();
    used.sort_unstable();
    let mut candidate = 1_u64;
    for id in used {
        if id > candidate {
            break;
        }
        if id == candidate {
            candidate = candidate.checked_add(1)?;
        }
    }
    Some(ItemId::new(candidate))
}

pub struct ItemStore {
    items: Snapshot,
    ids: IdSource,
    revision: u64,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl ItemStore {
    /// Empty store.
    #[must_use]
    pub fn new(strategy: IdStrategy) -> Self {
        Self {
            items: Arc::from(Vec::new()),
            ids: IdSource::new(strategy),
            revision: 0,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Store initialized from previously persisted items.
    ///
    /// Hydration is not a mutation: the revision stays at zero and nothing is
    /// published.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation`] if `items` has duplicate ids or blank text.
    pub fn hydrate(items: Vec<Item>, strategy: IdStrategy) -> Result<Self, InvariantViolation> {
        validate(&items)?;
        Ok(Self::from_validated(items, strategy))
    }

    /// [`hydrate`](Self::hydrate) for items that already passed [`validate`].
    pub(crate) fn from_validated(items: Vec<Item>, strategy: IdStrategy) -> Self {
        debug_assert_eq!(validate(&items), Ok(()));
        let ids = IdSource::seeded(strategy, items.iter().map(|item| item.id));
        Self {
            items: Arc::from(items),
            ids,
            ..Self::new(strategy)
        }
    }

    /// Current snapshot. Cheap; shares the underlying allocation.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.items)
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of applied mutations since the store was created or hydrated.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Append a pending item with the trimmed `text`.
    ///
    /// Blank text is ignored and returns `None`. Once the id source is
    /// exhausted, new items take the lowest id not in use.
    pub fn add(&mut self, text: &str) -> Option<ItemId> {
        if text.trim().is_empty() {
            trace!("ignoring add with blank text");
            return None;
        }

        let id = match self.ids.next_id() {
            Some(id) => id,
            None => {
                let id = lowest_unused_id(&self.items)?;
                debug!(%id, "id source exhausted, reusing a free id");
                id
            }
        };
        let item = Item::pending(id, text)?;

        let mut next = Vec::with_capacity(self.items.len() + 1);
        next.extend_from_slice(&self.items);
        next.push(item);
        self.install(next);

        debug!(%id, revision = self.revision, "item added");
        Some(id)
    }

    /// Flip the status of the item with `id`, returning its new status.
    ///
    /// Unknown ids are ignored and return `None`.
    pub fn toggle_status(&mut self, id: ItemId) -> Option<Status> {
        let Some(current) = self.get(id) else {
            trace!(%id, "ignoring toggle of unknown item");
            return None;
        };
        let status = current.status.toggled();

        let next = self
            .items
            .iter()
            .map(|item| {
                if item.id == id {
                    item.with_status_toggled()
                } else {
                    item.clone()
                }
            })
            .collect();
        self.install(next);

        debug!(%id, %status, revision = self.revision, "item status toggled");
        Some(status)
    }

    /// Remove the item with `id`, returning it.
    ///
    /// Unknown ids are ignored and return `None`.
    pub fn delete(&mut self, id: ItemId) -> Option<Item> {
        let Some(removed) = self.get(id).cloned() else {
            trace!(%id, "ignoring delete of unknown item");
            return None;
        };

        let next = self
            .items
            .iter()
            .filter(|item| item.id != id)
            .cloned()
            .collect();
        self.install(next);

        debug!(%id, revision = self.revision, "item deleted");
        Some(removed)
    }

    /// Register `subscriber` to receive every new snapshot.
    ///
    /// The current snapshot is not replayed; call [`ItemStore::snapshot`] for
    /// the initial state.
    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&Snapshot) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Remove a subscriber. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != before
    }

    fn install(&mut self, next: Vec<Item>) {
        self.items = Arc::from(next);
        self.revision += 1;

        let snapshot = Arc::clone(&self.items);
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&snapshot);
        }
    }
}

impl fmt::Debug for ItemStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemStore")
            .field("items", &self.items)
            .field("ids", &self.ids)
            .field("revision", &self.revision)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Default for ItemStore {
    fn default() -> Self {
        Self::new(IdStrategy::default())
    }
}
