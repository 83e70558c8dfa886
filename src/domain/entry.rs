//! List entry record and lifecycle states

use serde::{Deserialize, Serialize};
use super::error::{ShopListError, ShopListResult};
use super::item::ItemId;

/// Lifecycle state of a list entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryState {
    /// At rest, every action available
    #[default]
    Idle,
    /// The user is revising the amount
    Editing,
    /// A remote operation is in flight, or the entry is broken
    Disabled,
}

impl EntryState {
    pub fn is_disabled(&self) -> bool {
        matches!(self, EntryState::Disabled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryState::Idle => "idle",
            EntryState::Editing => "editing",
            EntryState::Disabled => "disabled",
        }
    }
}

/// Wire form of a list entry: `{itemId, amount, position}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryData {
    pub item_id: ItemId,
    pub amount: u32,
    pub position: i32,
}

impl EntryData {
    pub fn new(item_id: ItemId, amount: u32, position: i32) -> Self {
        Self { item_id, amount, position }
    }
}

/// Parse an amount typed in an editor; must be an integer >= 1
pub fn validate_amount(input: &str) -> ShopListResult<u32> {
    match input.trim().parse::<i64>() {
        Ok(amount) if amount >= 1 => u32::try_from(amount)
            .map_err(|_| ShopListError::Validation(format!("Amount too large: {}", amount))),
        Ok(amount) => Err(ShopListError::Validation(format!("Invalid amount: {}", amount))),
        Err(_) => Err(ShopListError::Validation(format!("Invalid amount: {:?}", input))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_wire_format() {
        let data = EntryData::new(42, 2, 1);
        let json = serde_json::to_value(data).unwrap();
        assert_eq!(json, serde_json::json!({ "itemId": 42, "amount": 2, "position": 1 }));
    }

    #[test]
    fn test_validate_amount() {
        assert_eq!(validate_amount("3").unwrap(), 3);
        assert_eq!(validate_amount(" 12 ").unwrap(), 12);
        assert!(validate_amount("0").is_err());
        assert!(validate_amount("-4").is_err());
        assert!(validate_amount("abc").is_err());
        assert!(validate_amount("").is_err());
        assert!(validate_amount("1.5").is_err());
    }

    #[test]
    fn test_disabled_state() {
        assert!(EntryState::Disabled.is_disabled());
        assert!(!EntryState::Editing.is_disabled());
        assert_eq!(EntryState::default(), EntryState::Idle);
    }
}
