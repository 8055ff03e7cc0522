//! Data model: items, their status, and the view filter.

pub mod filter;
pub mod item;

pub use filter::Filter;
pub use item::{Item, ItemId, ParseEnumError, Status};
