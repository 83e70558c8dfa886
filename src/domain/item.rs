//! Item Entity
//!
//! A reusable named product, referenced by list entries through its id.

use serde::{Deserialize, Serialize};
use super::entity::Entity;

/// Item identifier; 0 means the item has not been persisted yet
pub type ItemId = u32;

/// A catalog item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Server-assigned identifier
    pub id: ItemId,
    /// Unique, non-empty name
    pub name: String,
    /// Set while some list entry references the item (never sent over the wire)
    #[serde(skip_serializing, default)]
    pub in_use: bool,
}

impl Item {
    pub fn new(id: ItemId, name: String) -> Self {
        Self {
            id,
            name,
            in_use: false,
        }
    }

    /// Check if the server has assigned an id yet
    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> Self::Id {
        self.id
    }
}
