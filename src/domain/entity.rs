//! Domain Layer - Core Entity Trait
//!
//! Anything the remote store persists under a stable identifier.

/// Core trait for persisted records
pub trait Entity: Sized + Clone {
    /// The type of the record's unique identifier
    type Id: Copy + Eq;

    /// Returns the record's unique identifier
    fn id(&self) -> Self::Id;
}
