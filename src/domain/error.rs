//! Error taxonomy
//!
//! - `Validation`: rejected locally, never reaches the remote store
//! - `Persistence` / `Transport`: a remote call did not succeed
//! - `InvariantViolation` / `UnresolvedReference`: programmer or data-integrity faults

use serde_json::Value;
use thiserror::Error;

use super::item::ItemId;

/// Common result type for shop list operations
pub type ShopListResult<T> = Result<T, ShopListError>;

#[derive(Debug, Clone, Error)]
pub enum ShopListError {
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The server answered with a status the operation does not accept.
    #[error("{operation} answered with status {status}")]
    Persistence {
        operation: String,
        status: u16,
        content: Option<Value>,
    },

    /// The request never produced a usable response.
    #[error("{operation} failed: {message}")]
    Transport { operation: String, message: String },

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("List entry references unknown item {item_id}")]
    UnresolvedReference { item_id: ItemId },

    #[error("Item already in list: {name}")]
    ItemInUse { name: String },

    #[error("Another entry is being created")]
    CreatorBusy,

    /// A swap was applied locally but not every side was saved.
    #[error("Move persisted partially: {count} of 2 saves failed", count = .failed.len())]
    PartialMove { failed: Vec<(ItemId, ShopListError)> },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ShopListError {
    /// True for failures of a remote call, whatever their cause
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            ShopListError::Persistence { .. }
                | ShopListError::Transport { .. }
                | ShopListError::PartialMove { .. }
        )
    }

    /// Status code of a rejected remote call, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ShopListError::Persistence { status, .. } => Some(*status),
            _ => None,
        }
    }
}
