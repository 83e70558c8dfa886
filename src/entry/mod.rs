//! List Entry
//!
//! One row of the shopping list: an item, an amount, a position and a
//! lifecycle state. Every state change and the confirmed deletion are
//! published through the entry's own listener channel; that channel is the
//! only way the owning collection learns about them.

mod listeners;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::domain::{validate_amount, EntryData, EntryState, Item, ItemId, ShopListError, ShopListResult};
use crate::remote::{self, operation_label, Method, RemoteClient};

pub use listeners::{ListenerId, Listeners};

/// Shared handle to an entry; identity is the allocation (`Rc::ptr_eq`)
pub type EntryHandle = Rc<Entry>;

/// Notification published by an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryEvent {
    /// A transition was applied (possibly to the same state)
    StateChanged(EntryState),
    /// The server confirmed the deletion
    Removed,
}

pub struct Entry {
    remote: Rc<dyn RemoteClient>,
    item_id: ItemId,
    item_name: String,
    amount: Cell<u32>,
    position: Cell<i32>,
    state: Cell<EntryState>,
    /// Content of the quantity editor
    draft: RefCell<String>,
    listeners: Listeners<EntryEvent>,
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("item_id", &self.item_id)
            .field("item_name", &self.item_name)
            .field("amount", &self.amount.get())
            .field("position", &self.position.get())
            .field("state", &self.state.get())
            .finish()
    }
}

impl Entry {
    /// New entry in `Idle` state. Nothing is sent to the server.
    pub fn new(remote: Rc<dyn RemoteClient>, item: &Item, amount: u32, position: i32) -> EntryHandle {
        Rc::new(Self {
            remote,
            item_id: item.id,
            item_name: item.name.clone(),
            amount: Cell::new(amount),
            position: Cell::new(position),
            state: Cell::new(EntryState::Idle),
            draft: RefCell::new(amount.to_string()),
            listeners: Listeners::default(),
        })
    }

    // ========================
    // Accessors
    // ========================

    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn item_name(&self) -> &str {
        &self.item_name
    }

    pub fn amount(&self) -> u32 {
        self.amount.get()
    }

    pub fn position(&self) -> i32 {
        self.position.get()
    }

    pub fn state(&self) -> EntryState {
        self.state.get()
    }

    pub fn editor_value(&self) -> String {
        self.draft.borrow().clone()
    }

    /// Mirror what the user typed in the quantity editor
    pub fn set_editor_value(&self, value: &str) {
        *self.draft.borrow_mut() = value.to_string();
    }

    pub fn data(&self) -> EntryData {
        EntryData::new(self.item_id, self.amount(), self.position())
    }

    fn set_amount(&self, amount: u32) {
        self.amount.set(amount);
        *self.draft.borrow_mut() = amount.to_string();
    }

    pub(crate) fn set_position(&self, position: i32) {
        self.position.set(position);
    }

    // ========================
    // Notifications
    // ========================

    pub fn subscribe(&self, listener: impl Fn(&EntryEvent) + 'static) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Apply a transition and notify listeners
    pub(crate) fn set_state(&self, state: EntryState) {
        self.state.set(state);
        self.listeners.emit(&EntryEvent::StateChanged(state));
    }

    // ========================
    // User Transitions
    // ========================

    /// Idle -> Editing
    pub fn start_edit(&self) -> bool {
        if self.state() != EntryState::Idle {
            return false;
        }
        self.set_state(EntryState::Editing);
        true
    }

    /// Editing -> Idle, the editor goes back to the committed amount
    pub fn cancel_edit(&self) -> bool {
        if self.state() != EntryState::Editing {
            return false;
        }
        self.set_state(EntryState::Idle);
        *self.draft.borrow_mut() = self.amount().to_string();
        true
    }

    /// Editing -> Disabled -> Idle with the amount typed in `input`.
    ///
    /// An invalid amount is rejected before any request and the entry stays
    /// `Editing`. Returns `Ok(false)` when the entry was not being edited.
    pub async fn commit_edit(&self, input: &str) -> ShopListResult<bool> {
        if self.state() != EntryState::Editing {
            return Ok(false);
        }
        self.set_editor_value(input);
        let amount = validate_amount(input)?;

        self.set_amount(amount);
        self.save(false).await?;
        self.set_state(EntryState::Idle);
        Ok(true)
    }

    // ========================
    // Remote Operations
    // ========================

    /// Create (`POST /list`, 201) or update (`PUT /list/{itemId}`, 200) the entry.
    ///
    /// Forces `Disabled` first. On success the entry stays `Disabled`; the
    /// caller decides which state to restore. On failure it stays `Disabled`.
    pub async fn save(&self, create: bool) -> ShopListResult<()> {
        if !self.state().is_disabled() {
            self.set_state(EntryState::Disabled);
        }
        let (method, path) = if create {
            (Method::Post, "/list".to_string())
        } else {
            (Method::Put, format!("/list/{}", self.item_id))
        };
        let body = serde_json::to_value(self.data()).map_err(|e| ShopListError::Transport {
            operation: operation_label(method, &path),
            message: format!("could not encode entry: {}", e),
        })?;
        let expected: &[u16] = if create { &[201] } else { &[200] };
        remote::call(self.remote.as_ref(), method, &path, Some(body), expected).await?;
        log::debug!("Saved entry {} at position {}", self.item_id, self.position());
        Ok(())
    }

    /// `DELETE /list/{itemId}`, success only on 204.
    ///
    /// On success publishes `EntryEvent::Removed`; on failure the entry stays
    /// `Disabled` and is not removed. The item is not released here.
    pub async fn delete(&self) -> ShopListResult<()> {
        self.set_state(EntryState::Disabled);
        let path = format!("/list/{}", self.item_id);
        remote::call(self.remote.as_ref(), Method::Delete, &path, None, &[204]).await?;
        log::debug!("Deleted entry {}", self.item_id);
        self.listeners.emit(&EntryEvent::Removed);
        Ok(())
    }

    /// Re-read amount and position from `GET /list/{itemId}`, then back to `Idle`
    pub async fn refresh(&self) -> ShopListResult<()> {
        self.set_state(EntryState::Disabled);
        let path = format!("/list/{}", self.item_id);
        let content = remote::call(self.remote.as_ref(), Method::Get, &path, None, &[200]).await?;
        let data: EntryData = remote::decode(&operation_label(Method::Get, &path), content)?;
        self.set_amount(data.amount);
        self.set_position(data.position);
        self.set_state(EntryState::Idle);
        Ok(())
    }
}
