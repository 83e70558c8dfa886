//! Item Catalog
//!
//! Known items keyed by id and by unique name, each with its `in_use` flag.
//! The ordering engine reserves an item while an entry references it.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde_json::json;

use crate::domain::{Entity, Item, ItemId, ShopListError, ShopListResult};
use crate::remote::{self, operation_label, Method, RemoteClient};

pub struct ItemCatalog {
    remote: Rc<dyn RemoteClient>,
    items: RefCell<BTreeMap<ItemId, Item>>,
}

impl ItemCatalog {
    pub fn new(remote: Rc<dyn RemoteClient>) -> Self {
        Self {
            remote,
            items: RefCell::new(BTreeMap::new()),
        }
    }

    /// Replace the catalog with the server's item list; every item starts free
    pub async fn refresh(&self) -> ShopListResult<()> {
        let content = remote::call(self.remote.as_ref(), Method::Get, "/items", None, &[200]).await?;
        let items: Vec<Item> = remote::decode(&operation_label(Method::Get, "/items"), content)?;

        let mut map = self.items.borrow_mut();
        map.clear();
        for mut item in items {
            item.in_use = false;
            map.insert(item.id(), item);
        }
        log::info!("Loaded {} catalog items", map.len());
        Ok(())
    }

    pub fn lookup(&self, id: ItemId) -> Option<Item> {
        self.items.borrow().get(&id).cloned()
    }

    pub fn lookup_by_name(&self, name: &str) -> Option<Item> {
        self.items.borrow().values().find(|item| item.name == name).cloned()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Persist a new item and return it with its server-assigned id.
    ///
    /// The item is not inserted; call `insert` once the caller accepts it.
    pub async fn create_item(&self, name: &str) -> ShopListResult<Item> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ShopListError::Validation("Item name is empty".to_string()));
        }
        let body = json!({ "id": 0, "name": name });
        let content =
            remote::call(self.remote.as_ref(), Method::Post, "/items", Some(body), &[200, 201]).await?;
        let created: Item = remote::decode(&operation_label(Method::Post, "/items"), content)?;
        log::info!("Created item {} ({})", created.name, created.id);
        Ok(Item::new(created.id, created.name))
    }

    pub fn insert(&self, item: Item) {
        self.items.borrow_mut().insert(item.id(), item);
    }

    /// Mark the item as referenced by a list entry
    pub fn reserve(&self, id: ItemId) -> bool {
        self.set_in_use(id, true)
    }

    /// Make the item available for a new list entry again
    pub fn release(&self, id: ItemId) -> bool {
        self.set_in_use(id, false)
    }

    pub fn is_in_use(&self, id: ItemId) -> bool {
        self.items.borrow().get(&id).is_some_and(|item| item.in_use)
    }

    fn set_in_use(&self, id: ItemId, in_use: bool) -> bool {
        match self.items.borrow_mut().get_mut(&id) {
            Some(item) => {
                item.in_use = in_use;
                true
            }
            None => false,
        }
    }
}
