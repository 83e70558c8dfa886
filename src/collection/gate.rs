//! Shared-Action Gate
//!
//! "Move down" of entry `i` exchanges it with entry `i + 1`, so its legality
//! depends on both rows.

use std::iter;

use crate::domain::EntryState;

/// Whether the move control of the entry at `index` is enabled.
///
/// Enabled iff the entry is not `Disabled` and it is either the last entry or
/// its successor is not `Disabled`.
pub fn move_enabled(states: &[EntryState], index: usize) -> bool {
    match states.get(index) {
        None => false,
        Some(state) if state.is_disabled() => false,
        Some(_) => states.get(index + 1).map_or(true, |next| !next.is_disabled()),
    }
}

/// Rows whose control depends on the row at `index`: its predecessor and itself
pub fn affected_by(index: usize) -> impl Iterator<Item = usize> {
    index.checked_sub(1).into_iter().chain(iter::once(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use EntryState::{Disabled, Editing, Idle};

    #[test]
    fn test_disabled_middle_blocks_its_pair() {
        let states = [Idle, Disabled, Idle];
        assert!(!move_enabled(&states, 0));
        assert!(!move_enabled(&states, 1));
        assert!(move_enabled(&states, 2));
    }

    #[test]
    fn test_last_entry_only_depends_on_itself() {
        assert!(move_enabled(&[Idle], 0));
        assert!(move_enabled(&[Editing, Editing], 1));
        assert!(!move_enabled(&[Idle, Disabled], 1));
        assert!(!move_enabled(&[], 0));
    }

    #[test]
    fn test_editing_does_not_block() {
        assert!(move_enabled(&[Editing, Idle], 0));
        assert!(move_enabled(&[Idle, Editing], 0));
    }

    #[test]
    fn test_affected_rows() {
        assert_eq!(affected_by(0).collect::<Vec<_>>(), vec![0]);
        assert_eq!(affected_by(3).collect::<Vec<_>>(), vec![2, 3]);
    }
}
