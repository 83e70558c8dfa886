//! In-Memory Remote
//!
//! An in-process ShopList server: same endpoints and status codes as the real
//! API, plus call recording and scripted failures for tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{operation_label, Method, RemoteClient, RemoteResponse};
use crate::domain::{EntryData, ItemId, ShopListError, ShopListResult};

/// One request as the server saw it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Debug)]
enum Fault {
    Status(u16),
    Transport,
}

#[derive(Debug)]
struct ScriptedFault {
    method: Method,
    path: String,
    fault: Fault,
}

#[derive(Debug, Default)]
struct ServerState {
    items: BTreeMap<ItemId, String>,
    next_item_id: ItemId,
    entries: Vec<EntryData>,
    calls: Vec<RecordedCall>,
    faults: VecDeque<ScriptedFault>,
}

#[derive(Deserialize)]
struct ItemBody {
    name: String,
}

/// In-process implementation of the ShopList API
#[derive(Debug)]
pub struct InMemoryRemote {
    state: RefCell<ServerState>,
}

impl Default for InMemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(ServerState {
                next_item_id: 1,
                ..Default::default()
            }),
        }
    }

    // ========================
    // Seeding
    // ========================

    pub fn with_item(self, id: ItemId, name: &str) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.items.insert(id, name.to_string());
            state.next_item_id = state.next_item_id.max(id + 1);
        }
        self
    }

    pub fn with_entry(self, item_id: ItemId, amount: u32, position: i32) -> Self {
        self.state
            .borrow_mut()
            .entries
            .push(EntryData::new(item_id, amount, position));
        self
    }

    /// Id the next created item will receive
    pub fn set_next_item_id(&self, id: ItemId) {
        self.state.borrow_mut().next_item_id = id;
    }

    // ========================
    // Fault Scripting
    // ========================

    /// The next `method path` request answers `status` without touching the data
    pub fn fail_next(&self, method: Method, path: &str, status: u16) {
        self.push_fault(method, path, Fault::Status(status));
    }

    /// The next `method path` request fails before any status is produced
    pub fn drop_next(&self, method: Method, path: &str) {
        self.push_fault(method, path, Fault::Transport);
    }

    fn push_fault(&self, method: Method, path: &str, fault: Fault) {
        self.state.borrow_mut().faults.push_back(ScriptedFault {
            method,
            path: path.to_string(),
            fault,
        });
    }

    // ========================
    // Inspection
    // ========================

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.borrow().calls.clone()
    }

    pub fn calls_with(&self, method: Method) -> Vec<RecordedCall> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Stored entries in position order
    pub fn entries(&self) -> Vec<EntryData> {
        let mut entries = self.state.borrow().entries.clone();
        entries.sort_by_key(|e| (e.position, e.item_id));
        entries
    }

    // ========================
    // Routing
    // ========================

    fn take_fault(state: &mut ServerState, method: Method, path: &str) -> Option<Fault> {
        let index = state
            .faults
            .iter()
            .position(|f| f.method == method && f.path == path)?;
        state.faults.remove(index).map(|f| f.fault)
    }

    fn route(state: &mut ServerState, method: Method, path: &str, body: Option<Value>) -> RemoteResponse {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        match (method, segments.as_slice()) {
            (Method::Get, ["items"]) => {
                let items: Vec<Value> = state
                    .items
                    .iter()
                    .map(|(id, name)| json!({ "id": id, "name": name }))
                    .collect();
                RemoteResponse::new(200, Some(Value::Array(items)))
            }
            (Method::Post, ["items"]) => Self::create_item(state, body),
            (Method::Get, ["list"]) => {
                let mut entries = state.entries.clone();
                entries.sort_by_key(|e| (e.position, e.item_id));
                RemoteResponse::new(200, serde_json::to_value(entries).ok())
            }
            (Method::Post, ["list"]) => Self::create_entry(state, body),
            (method, ["list", id]) => match id.parse::<ItemId>() {
                Ok(id) => Self::entry_route(state, method, id, body),
                Err(_) => not_found(),
            },
            _ => not_found(),
        }
    }

    fn create_item(state: &mut ServerState, body: Option<Value>) -> RemoteResponse {
        let Some(ItemBody { name }) = body.and_then(|b| serde_json::from_value(b).ok()) else {
            return bad_request();
        };
        if name.is_empty() {
            return bad_request();
        }
        if state.items.values().any(|n| *n == name) {
            return RemoteResponse::new(409, Some(json!({ "error": "Item already exists" })));
        }
        let id = state.next_item_id;
        state.next_item_id = id + 1;
        state.items.insert(id, name.clone());
        RemoteResponse::new(201, Some(json!({ "id": id, "name": name })))
    }

    fn create_entry(state: &mut ServerState, body: Option<Value>) -> RemoteResponse {
        let Some(data) = body.and_then(|b| serde_json::from_value::<EntryData>(b).ok()) else {
            return bad_request();
        };
        if !state.items.contains_key(&data.item_id) {
            return not_found();
        }
        if state.entries.iter().any(|e| e.item_id == data.item_id) {
            return RemoteResponse::new(409, Some(json!({ "error": "Item already in list" })));
        }
        state.entries.push(data);
        RemoteResponse::new(201, serde_json::to_value(data).ok())
    }

    fn entry_route(state: &mut ServerState, method: Method, id: ItemId, body: Option<Value>) -> RemoteResponse {
        let Some(index) = state.entries.iter().position(|e| e.item_id == id) else {
            return not_found();
        };
        match method {
            Method::Get => RemoteResponse::new(200, serde_json::to_value(state.entries[index]).ok()),
            Method::Put => {
                let Some(data) = body.and_then(|b| serde_json::from_value::<EntryData>(b).ok()) else {
                    return bad_request();
                };
                if data.item_id != id {
                    return bad_request();
                }
                state.entries[index] = data;
                RemoteResponse::new(200, serde_json::to_value(data).ok())
            }
            Method::Delete => {
                state.entries.remove(index);
                RemoteResponse::new(204, None)
            }
            Method::Post => RemoteResponse::new(405, Some(json!({ "error": "Method not allowed" }))),
        }
    }
}

fn not_found() -> RemoteResponse {
    RemoteResponse::new(404, Some(json!({ "error": "Not found" })))
}

fn bad_request() -> RemoteResponse {
    RemoteResponse::new(400, Some(json!({ "error": "Bad request" })))
}

#[async_trait(?Send)]
impl RemoteClient for InMemoryRemote {
    async fn fetch(
        &self,
        method: Method,
        path: &str,
        _query: &[(&str, &str)],
        body: Option<Value>,
    ) -> ShopListResult<RemoteResponse> {
        let mut state = self.state.borrow_mut();
        state.calls.push(RecordedCall {
            method,
            path: path.to_string(),
            body: body.clone(),
        });

        match Self::take_fault(&mut state, method, path) {
            Some(Fault::Status(status)) => Ok(RemoteResponse::new(
                status,
                if status == 204 { None } else { Some(json!({ "error": "Scripted failure" })) },
            )),
            Some(Fault::Transport) => Err(ShopListError::Transport {
                operation: operation_label(method, path),
                message: "connection reset".to_string(),
            }),
            None => Ok(Self::route(&mut state, method, path, body)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_item_creation_assigns_ids() {
        let remote = InMemoryRemote::new().with_item(3, "Bread");
        let created = remote
            .fetch(Method::Post, "/items", &[], Some(json!({ "id": 0, "name": "Milk" })))
            .await
            .unwrap();
        assert_eq!(created.status, 201);
        assert_eq!(created.content, Some(json!({ "id": 4, "name": "Milk" })));

        let duplicate = remote
            .fetch(Method::Post, "/items", &[], Some(json!({ "id": 0, "name": "Milk" })))
            .await
            .unwrap();
        assert_eq!(duplicate.status, 409);
    }

    #[tokio::test]
    async fn test_entry_lifecycle() {
        let remote = InMemoryRemote::new().with_item(1, "Milk");
        let body = json!({ "itemId": 1, "amount": 2, "position": 1 });

        let created = remote.fetch(Method::Post, "/list", &[], Some(body)).await.unwrap();
        assert_eq!(created.status, 201);

        let updated = remote
            .fetch(Method::Put, "/list/1", &[], Some(json!({ "itemId": 1, "amount": 5, "position": 1 })))
            .await
            .unwrap();
        assert_eq!(updated.status, 200);
        assert_eq!(remote.entries(), vec![EntryData::new(1, 5, 1)]);

        let deleted = remote.fetch(Method::Delete, "/list/1", &[], None).await.unwrap();
        assert_eq!(deleted, RemoteResponse::new(204, None));

        let missing = remote.fetch(Method::Delete, "/list/1", &[], None).await.unwrap();
        assert_eq!(missing.status, 404);
        assert_eq!(remote.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_scripted_fault_is_consumed_once() {
        let remote = InMemoryRemote::new().with_item(1, "Milk").with_entry(1, 1, 1);
        remote.fail_next(Method::Get, "/list", 500);

        let first = remote.fetch(Method::Get, "/list", &[], None).await.unwrap();
        assert_eq!(first.status, 500);
        let second = remote.fetch(Method::Get, "/list", &[], None).await.unwrap();
        assert_eq!(second.status, 200);

        remote.drop_next(Method::Get, "/items");
        assert!(remote.fetch(Method::Get, "/items", &[], None).await.is_err());
    }
}
