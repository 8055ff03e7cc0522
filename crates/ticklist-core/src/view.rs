//! Filtered projection of the collection.
//!
//! Pure functions over `(items, filter)`; nothing here holds state. Output
//! always keeps collection order.

use crate::model::{Filter, Item, Status};

/// Items selected by `filter`, in collection order, borrowed.
pub fn iter(items: &[Item], filter: Filter) -> impl Iterator<Item = &Item> {
    items.iter().filter(move |item| filter.matches(item))
}

/// Items selected by `filter`, in collection order.
#[must_use]
pub fn project(items: &[Item], filter: Filter) -> Vec<Item> {
    iter(items, filter).cloned().collect()
}

/// Per-status item counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCounts {
    pub pending: usize,
    pub completed: usize,
}

impl StatusCounts {
    #[must_use]
    pub fn tally(items: &[Item]) -> Self {
        items.iter().fold(Self::default(), |mut counts, item| {
            match item.status {
                Status::Pending => counts.pending += 1,
                Status::Completed => counts.completed += 1,
            }
            counts
        })
    }

    #[must_use]
    pub const fn total(self) -> usize {
        self.pending + self.completed
    }

    /// Size of the view `filter` would produce.
    #[must_use]
    pub const fn for_filter(self, filter: Filter) -> usize {
        match filter {
            Filter::All => self.total(),
            Filter::Pending => self.pending,
            Filter::Completed => self.completed,
        }
    }
}
