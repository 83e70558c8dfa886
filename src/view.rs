//! View Layer Contract
//!
//! What the ordering engine tells whoever renders the list. Every method has
//! a no-op default so a view only implements what it draws.

use crate::entry::EntryHandle;

/// Generic notice shown when a remote call fails
pub const FAILURE_NOTICE: &str = "A server request failed, try to reload the page";

pub trait ListView {
    /// `entry` now sits at `index`; rows at `index..` moved one down
    fn row_inserted(&self, _index: usize, _entry: &EntryHandle) {}

    /// The row at `index` is gone
    fn row_removed(&self, _index: usize, _entry: &EntryHandle) {}

    /// Rows `upper` and `upper + 1` exchanged places
    fn rows_swapped(&self, _upper: usize) {}

    /// Every row is gone (a full reload follows)
    fn rows_cleared(&self) {}

    /// Enable/disable the row's own controls after a state change
    fn row_state_changed(&self, _entry: &EntryHandle) {}

    /// Enable/disable the row's "move down" control
    fn shared_action_changed(&self, _entry: &EntryHandle, _enabled: bool) {}

    /// The entry creator accepts input again (or stops accepting it)
    fn creator_enabled(&self, _enabled: bool) {}

    /// Input rejected locally, e.g. an invalid amount
    fn invalid_input(&self, _message: &str) {}

    /// User-visible failure notice
    fn show_failure(&self, _message: &str) {}
}

/// View that draws nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullView;

impl ListView for NullView {}
