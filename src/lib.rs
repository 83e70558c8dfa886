//! ShopList Client
//!
//! Layered architecture:
//! - domain: Items, entry records, states and errors
//! - remote: Request/response seam to the ShopList API
//! - catalog: Known items and their in-use reservation
//! - entry: One list row and its state machine
//! - collection: The ordered list, its move gate and the entry creator
//! - view: What the list tells whoever renders it
//! - config: JSON client configuration

pub mod catalog;
pub mod collection;
pub mod config;
pub mod domain;
pub mod entry;
pub mod remote;
pub mod view;

pub use catalog::ItemCatalog;
pub use collection::EntryCollection;
pub use config::Config;
pub use domain::{EntryData, EntryState, Item, ItemId, ShopListError, ShopListResult};
pub use entry::{Entry, EntryEvent, EntryHandle};
pub use remote::{HttpRemote, Method, RemoteClient};
pub use view::{ListView, NullView, FAILURE_NOTICE};
