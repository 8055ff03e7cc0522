//! Item identifier allocation.
//!
//! Ids are strictly increasing within a session: each allocation returns
//! `max(clock, last + 1)`. Seeding with the largest hydrated id keeps new ids
//! clear of everything already in the collection, even if the wall clock has
//! gone backwards since the list was saved. Once `u64::MAX` has been handed
//! out the source is exhausted and allocation returns `None`.

use crate::model::ItemId;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where candidate id values come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdStrategy {
    /// Milliseconds since the Unix epoch, bumped past the last id on ties.
    /// Compatible with lists written by the web client.
    #[default]
    WallClock,
    /// 1, 2, 3, ... continuing after the largest hydrated id.
    Counter,
}

impl fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WallClock => f.write_str("wall-clock"),
            Self::Counter => f.write_str("counter"),
        }
    }
}

/// Monotonic id allocator.
#[derive(Debug, Clone)]
pub struct IdSource {
    strategy: IdStrategy,
    last: u64,
}

impl IdSource {
    #[must_use]
    pub const fn new(strategy: IdStrategy) -> Self {
        Self { strategy, last: 0 }
    }

    /// Allocator whose ids are all greater than every id in `existing`.
    pub fn seeded<I>(strategy: IdStrategy, existing: I) -> Self
    where
        I: IntoIterator<Item = ItemId>,
    {
        let last = existing.into_iter().map(ItemId::get).max().unwrap_or(0);
        Self { strategy, last }
    }

    /// Allocate the next id, or `None` when no larger id exists.
    pub fn next_id(&mut self) -> Option<ItemId> {
        let floor = self.last.checked_add(1)?;
        let candidate = match self.strategy {
            IdStrategy::WallClock => wall_clock_millis(),
            IdStrategy::Counter => 0,
        };
        self.last = candidate.max(floor);
        Some(ItemId::new(self.last))
    }
}

fn wall_clock_millis() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}
