//! Domain Layer
//!
//! Catalog items, list entry records, entry states and the error taxonomy.
//! Nothing in here talks to the remote store.

mod entity;
mod error;
mod item;
mod entry;

pub use entity::Entity;
pub use error::{ShopListError, ShopListResult};
pub use item::{Item, ItemId};
pub use entry::{EntryData, EntryState, validate_amount};
