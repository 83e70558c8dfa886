//! Entry Collection / Ordering Engine
//!
//! Owns the ordered sequence of entries and keeps, after every public
//! operation:
//! 1. the sequence sorted ascending by position
//! 2. every entry present exactly once
//! 3. the item of every present entry reserved in the catalog
//!
//! Per-entry state changes and deletions arrive only through each entry's
//! listener channel. Nothing here blocks: remote calls suspend just the
//! entries involved by driving them to `Disabled`.

mod gate;


use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::catalog::ItemCatalog;
use crate::domain::{EntryData, EntryState, ItemId, ShopListError, ShopListResult};
use crate::entry::{Entry, EntryEvent, EntryHandle, ListenerId};
use crate::remote::{self, operation_label, Method, RemoteClient};
use crate::view::{ListView, FAILURE_NOTICE};

pub use gate::{affected_by, move_enabled};

struct Slot {
    entry: EntryHandle,
    /// The collection's subscription on `entry`
    listener: ListenerId,
}

struct Shared {
    remote: Rc<dyn RemoteClient>,
    catalog: Rc<ItemCatalog>,
    view: Rc<dyn ListView>,
    slots: RefCell<Vec<Slot>>,
    /// An entry creation is in flight
    creating: Cell<bool>,
}

/// Handle to the ordered entry list; clones share the same list
#[derive(Clone)]
pub struct EntryCollection {
    shared: Rc<Shared>,
}

/// Reopens the entry creator when a creation settles
struct CreatorGuard<'a> {
    shared: &'a Shared,
}

impl Drop for CreatorGuard<'_> {
    fn drop(&mut self) {
        self.shared.creating.set(false);
        self.shared.view.creator_enabled(true);
    }
}

// ========================
// Notification Side
// ========================

impl Shared {
    fn index_of(&self, entry: &EntryHandle) -> Option<usize> {
        self.slots
            .borrow()
            .iter()
            .position(|slot| Rc::ptr_eq(&slot.entry, entry))
    }

    /// Push the move-control state of the rows at `indices` to the view
    fn refresh_gate(&self, indices: impl IntoIterator<Item = usize>) {
        let entries: Vec<EntryHandle> = self.slots.borrow().iter().map(|s| s.entry.clone()).collect();
        let states: Vec<EntryState> = entries.iter().map(|e| e.state()).collect();
        for index in indices {
            if let Some(entry) = entries.get(index) {
                self.view.shared_action_changed(entry, move_enabled(&states, index));
            }
        }
    }

    fn refresh_gate_all(&self) {
        let len = self.slots.borrow().len();
        self.refresh_gate(0..len);
    }

    fn attach(self: &Rc<Self>, entry: &EntryHandle) -> ListenerId {
        let shared = Rc::downgrade(self);
        let target = Rc::downgrade(entry);
        let own_id: Rc<Cell<Option<ListenerId>>> = Rc::new(Cell::new(None));

        let own = own_id.clone();
        let id = entry.subscribe(move |event| {
            let (Some(shared), Some(entry)) = (shared.upgrade(), target.upgrade()) else {
                return;
            };
            match event {
                EntryEvent::StateChanged(_) => shared.on_state_change(&entry, own.get()),
                EntryEvent::Removed => shared.on_removed(&entry, own.get()),
            }
        });
        own_id.set(Some(id));
        id
    }

    fn on_state_change(&self, entry: &EntryHandle, own: Option<ListenerId>) {
        match self.index_of(entry) {
            Some(index) => {
                self.view.row_state_changed(entry);
                self.refresh_gate(affected_by(index));
            }
            None => {
                // Entry left the sequence without its listener being detached.
                if let Some(id) = own {
                    entry.unsubscribe(id);
                }
            }
        }
    }

    fn on_removed(&self, entry: &EntryHandle, own: Option<ListenerId>) {
        if let Some(id) = own {
            entry.unsubscribe(id);
        }
        self.remove(entry);
    }

    fn insert(self: &Rc<Self>, entry: EntryHandle) -> ShopListResult<usize> {
        if self.index_of(&entry).is_some() {
            return Err(ShopListError::InvariantViolation(format!(
                "entry for item {} inserted twice",
                entry.item_id()
            )));
        }

        let listener = self.attach(&entry);
        let index = {
            let mut slots = self.slots.borrow_mut();
            let index = slots.partition_point(|s| s.entry.position() <= entry.position());
            slots.insert(index, Slot { entry: entry.clone(), listener });
            index
        };

        self.catalog.reserve(entry.item_id());
        self.view.row_inserted(index, &entry);
        self.refresh_gate(affected_by(index));
        Ok(index)
    }

    fn remove(&self, entry: &EntryHandle) -> bool {
        let removed = {
            let mut slots = self.slots.borrow_mut();
            slots
                .iter()
                .position(|slot| Rc::ptr_eq(&slot.entry, entry))
                .map(|index| (index, slots.remove(index)))
        };
        let Some((index, slot)) = removed else {
            log::debug!("Entry for item {} already removed", entry.item_id());
            return false;
        };

        slot.entry.unsubscribe(slot.listener);
        self.catalog.release(slot.entry.item_id());
        self.view.row_removed(index, &slot.entry);
        // `index` now holds the former successor; its predecessor's control changes.
        self.refresh_gate(affected_by(index));
        true
    }

    /// Move `entry` to the slot its (new) position calls for
    fn reposition(&self, entry: &EntryHandle) {
        let moved = {
            let mut slots = self.slots.borrow_mut();
            let Some(from) = slots.iter().position(|slot| Rc::ptr_eq(&slot.entry, entry)) else {
                return;
            };
            let slot = slots.remove(from);
            let to = slots.partition_point(|s| s.entry.position() <= slot.entry.position());
            slots.insert(to, slot);
            (from, to)
        };

        let (from, to) = moved;
        if from != to {
            self.view.row_removed(from, entry);
            self.view.row_inserted(to, entry);
        }
        self.refresh_gate_all();
    }

    /// Log and surface a caught failure
    fn report(&self, context: &str, error: &ShopListError) {
        match error {
            ShopListError::Validation(_) | ShopListError::ItemInUse { .. } => {
                self.view.invalid_input(&error.to_string());
            }
            ShopListError::CreatorBusy => {}
            _ => {
                log::error!("{} failed: {}", context, error);
                self.view.show_failure(FAILURE_NOTICE);
            }
        }
    }
}

// ========================
// Public Operations
// ========================

impl EntryCollection {
    pub fn new(remote: Rc<dyn RemoteClient>, catalog: Rc<ItemCatalog>, view: Rc<dyn ListView>) -> Self {
        Self {
            shared: Rc::new(Shared {
                remote,
                catalog,
                view,
                slots: RefCell::new(Vec::new()),
                creating: Cell::new(false),
            }),
        }
    }

    pub fn catalog(&self) -> &Rc<ItemCatalog> {
        &self.shared.catalog
    }

    pub fn len(&self) -> usize {
        self.shared.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.slots.borrow().is_empty()
    }

    /// Entries in sequence order
    pub fn entries(&self) -> Vec<EntryHandle> {
        self.shared.slots.borrow().iter().map(|s| s.entry.clone()).collect()
    }

    /// `(itemId, amount, position)` of every entry in sequence order
    pub fn snapshot(&self) -> Vec<EntryData> {
        self.shared.slots.borrow().iter().map(|s| s.entry.data()).collect()
    }

    pub fn get(&self, index: usize) -> Option<EntryHandle> {
        self.shared.slots.borrow().get(index).map(|s| s.entry.clone())
    }

    pub fn contains(&self, entry: &EntryHandle) -> bool {
        self.shared.index_of(entry).is_some()
    }

    pub fn find_by_item(&self, item_id: ItemId) -> Option<EntryHandle> {
        self.shared
            .slots
            .borrow()
            .iter()
            .find(|s| s.entry.item_id() == item_id)
            .map(|s| s.entry.clone())
    }

    pub fn find_by_name(&self, name: &str) -> Option<EntryHandle> {
        self.shared
            .slots
            .borrow()
            .iter()
            .find(|s| s.entry.item_name() == name)
            .map(|s| s.entry.clone())
    }

    pub fn max_position(&self) -> Option<i32> {
        self.shared.slots.borrow().iter().map(|s| s.entry.position()).max()
    }

    /// Live state of the entry's "move down" control
    pub fn can_move(&self, entry: &EntryHandle) -> bool {
        let Some(index) = self.shared.index_of(entry) else {
            return false;
        };
        let states: Vec<EntryState> = self.shared.slots.borrow().iter().map(|s| s.entry.state()).collect();
        move_enabled(&states, index)
    }

    pub fn is_creating(&self) -> bool {
        self.shared.creating.get()
    }

    /// Rebuild the whole sequence from `GET /list`.
    ///
    /// Every row must resolve against the catalog, otherwise nothing changes
    /// and `UnresolvedReference` is returned.
    pub async fn load(&self) -> ShopListResult<()> {
        let shared = &self.shared;
        let content = remote::call(shared.remote.as_ref(), Method::Get, "/list", None, &[200]).await?;
        let rows: Vec<EntryData> = remote::decode(&operation_label(Method::Get, "/list"), content)?;

        let mut resolved = Vec::with_capacity(rows.len());
        for row in rows {
            let item = shared
                .catalog
                .lookup(row.item_id)
                .ok_or(ShopListError::UnresolvedReference { item_id: row.item_id })?;
            resolved.push((item, row));
        }

        let previous = std::mem::take(&mut *shared.slots.borrow_mut());
        for slot in previous {
            slot.entry.unsubscribe(slot.listener);
            shared.catalog.release(slot.entry.item_id());
        }
        shared.view.rows_cleared();

        for (item, row) in resolved {
            let entry = Entry::new(shared.remote.clone(), &item, row.amount, row.position);
            shared.insert(entry)?;
        }
        log::info!("Loaded {} list entries", self.len());
        Ok(())
    }

    /// Insert an entry by position. Inserting an entry already present is an
    /// `InvariantViolation`.
    pub fn insert(&self, entry: EntryHandle) -> ShopListResult<usize> {
        self.shared.insert(entry)
    }

    /// Drop an entry from the sequence and release its item.
    ///
    /// Returns false when the entry is not (or no longer) present.
    pub fn remove(&self, entry: &EntryHandle) -> bool {
        self.shared.remove(entry)
    }

    /// Add `item_name` to the list at the end.
    ///
    /// The item is created in the catalog first when the name is unknown.
    /// Rejected locally (no request) for an empty name, an amount below 1, an
    /// item already in the list, or while another creation is in flight.
    pub async fn create(&self, item_name: &str, amount: u32) -> ShopListResult<EntryHandle> {
        let shared = &self.shared;
        if shared.creating.get() {
            return Err(ShopListError::CreatorBusy);
        }

        let name = item_name.trim();
        if let Err(e) = self.check_new_entry(name, amount) {
            shared.report("create entry", &e);
            return Err(e);
        }

        shared.creating.set(true);
        shared.view.creator_enabled(false);
        let _guard = CreatorGuard { shared: shared.as_ref() };

        let result = self.create_entry(name, amount).await;
        if let Err(e) = &result {
            shared.report("create entry", e);
        }
        result
    }

    fn check_new_entry(&self, name: &str, amount: u32) -> ShopListResult<()> {
        if name.is_empty() {
            return Err(ShopListError::Validation("Item name is empty".to_string()));
        }
        if amount < 1 {
            return Err(ShopListError::Validation(format!("Invalid amount: {}", amount)));
        }
        match self.shared.catalog.lookup_by_name(name) {
            Some(item) if item.in_use => Err(ShopListError::ItemInUse { name: item.name }),
            _ => Ok(()),
        }
    }

    /// Position after the last entry, 1 for an empty list
    fn next_position(&self) -> ShopListResult<i32> {
        match self.max_position() {
            None => Ok(1),
            Some(max) => max.checked_add(1).ok_or_else(|| {
                ShopListError::InvariantViolation(format!("no position left after {}", max))
            }),
        }
    }

    async fn create_entry(&self, name: &str, amount: u32) -> ShopListResult<EntryHandle> {
        let shared = &self.shared;
        let position = self.next_position()?;
        let item = match shared.catalog.lookup_by_name(name) {
            Some(item) => item,
            None => {
                let item = shared.catalog.create_item(name).await?;
                shared.catalog.insert(item.clone());
                item
            }
        };

        shared.catalog.reserve(item.id);
        let entry = Entry::new(shared.remote.clone(), &item, amount, position);

        if let Err(e) = entry.save(true).await {
            shared.catalog.release(item.id);
            return Err(e);
        }
        entry.set_state(EntryState::Idle);
        shared.insert(entry.clone())?;
        Ok(entry)
    }

    /// Swap `entry` with its successor.
    ///
    /// A silent no-op (`Ok(false)`) when the entry is last, absent, or either
    /// participant is `Disabled`; moves are not queued. Otherwise both entries
    /// are disabled, positions and sequence order are swapped locally, and two
    /// independent saves run concurrently. Each successful save restores its
    /// entry's previous state; a failed side stays `Disabled` and nothing is
    /// rolled back (`PartialMove`).
    pub async fn move_down(&self, entry: &EntryHandle) -> ShopListResult<bool> {
        let shared = &self.shared;
        let (index, other) = {
            let slots = shared.slots.borrow();
            let Some(index) = slots.iter().position(|slot| Rc::ptr_eq(&slot.entry, entry)) else {
                return Ok(false);
            };
            let Some(next) = slots.get(index + 1) else {
                return Ok(false);
            };
            (index, next.entry.clone())
        };
        if entry.state().is_disabled() || other.state().is_disabled() {
            log::debug!("Move of item {} skipped, pair busy", entry.item_id());
            return Ok(false);
        }

        let entry_prior = entry.state();
        entry.set_state(EntryState::Disabled);
        let other_prior = other.state();
        other.set_state(EntryState::Disabled);

        let position = other.position();
        other.set_position(entry.position());
        entry.set_position(position);
        shared.slots.borrow_mut().swap(index, index + 1);
        shared.view.rows_swapped(index);
        shared.refresh_gate(index.saturating_sub(1)..=index + 1);

        let (first, second) = futures::future::join(
            self.settle_move(entry, entry_prior),
            self.settle_move(&other, other_prior),
        )
        .await;

        let failed: Vec<(ItemId, ShopListError)> = [(entry.item_id(), first), (other.item_id(), second)]
            .into_iter()
            .filter_map(|(item_id, result)| result.err().map(|e| (item_id, e)))
            .collect();
        if failed.is_empty() {
            Ok(true)
        } else {
            Err(ShopListError::PartialMove { failed })
        }
    }

    async fn settle_move(&self, entry: &EntryHandle, prior: EntryState) -> ShopListResult<()> {
        match entry.save(false).await {
            Ok(()) => {
                entry.set_state(prior);
                Ok(())
            }
            Err(e) => {
                self.shared.report("move entry", &e);
                Err(e)
            }
        }
    }

    pub fn start_edit(&self, entry: &EntryHandle) -> bool {
        entry.start_edit()
    }

    pub fn cancel_edit(&self, entry: &EntryHandle) -> bool {
        entry.cancel_edit()
    }

    /// Commit the amount typed in the entry's editor
    pub async fn commit_edit(&self, entry: &EntryHandle, input: &str) -> ShopListResult<bool> {
        match entry.commit_edit(input).await {
            Ok(committed) => Ok(committed),
            Err(e) => {
                self.shared.report("save entry", &e);
                Err(e)
            }
        }
    }

    /// Delete an `Idle` entry; removal follows from the entry's `Removed`
    /// notification. Returns `Ok(false)` when the entry is absent or busy.
    pub async fn delete(&self, entry: &EntryHandle) -> ShopListResult<bool> {
        if !self.contains(entry) || entry.state() != EntryState::Idle {
            return Ok(false);
        }
        match entry.delete().await {
            Ok(()) => Ok(true),
            Err(e) => {
                self.shared.report("delete entry", &e);
                Err(e)
            }
        }
    }

    /// Re-read one entry from the server and re-sort it
    pub async fn refresh_entry(&self, entry: &EntryHandle) -> ShopListResult<()> {
        if let Err(e) = entry.refresh().await {
            self.shared.report("refresh entry", &e);
            return Err(e);
        }
        self.shared.reposition(entry);
        Ok(())
    }
}
