//! ticklist-core: item store, view projection, and persistence adapter.
//!
//! A [`Session`] is the entry point for a presentation layer: it exposes the
//! filtered view, the three mutations (add, toggle, delete), and the filter.
//! Everything underneath is usable on its own as well.
//!
//! # Conventions
//!
//! - **Errors**: list operations never fail. Storage and codec plumbing use
//!   `thiserror` enums mapped to [`error::ErrorCode`]; configuration loading
//!   returns `anyhow::Result`.
//! - **Logging**: `tracing` macros only. Installing a subscriber is left to
//!   the embedding application.
//! - **Targets**: on `wasm32` only the memory backend and, with the `browser`
//!   feature, `window.localStorage` are available; `config`, `lock`, and
//!   the file and SQLite backends are native only.

#[cfg(not(target_arch = "wasm32"))]
pub mod config;
pub mod error;
#[cfg(not(target_arch = "wasm32"))]
pub mod lock;
pub mod model;
pub mod persist;
pub mod session;
pub mod storage;
pub mod store;
pub mod view;

pub use model::{Filter, Item, ItemId, Status};
pub use session::Session;
pub use store::ItemStore;
