//! Remote Client Layer
//!
//! The request/response seam to the ShopList API.
//! Implementations: `HttpRemote` (reqwest), and in tests `InMemoryRemote`
//! (in-process server).

mod http;
#[cfg(test)]
mod memory;

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::{ShopListError, ShopListResult};

pub use http::HttpRemote;
#[cfg(test)]
pub use memory::{InMemoryRemote, RecordedCall};

/// HTTP method of a remote operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status and parsed body of a response; 204 responses carry no body
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteResponse {
    pub status: u16,
    pub content: Option<Value>,
}

impl RemoteResponse {
    pub fn new(status: u16, content: Option<Value>) -> Self {
        Self { status, content }
    }
}

/// Executes one operation against a path relative to the API root.
///
/// No retries. Fails with `ShopListError::Transport` when no status was obtained;
/// any status, successful or not, is returned as a response.
#[async_trait(?Send)]
pub trait RemoteClient {
    async fn fetch(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> ShopListResult<RemoteResponse>;
}

/// Label used in errors and logs, e.g. `PUT /list/42`
pub fn operation_label(method: Method, path: &str) -> String {
    format!("{} {}", method, path)
}

/// Run `method path` and keep the body only if the status is one of `expected`.
pub async fn call(
    remote: &dyn RemoteClient,
    method: Method,
    path: &str,
    body: Option<Value>,
    expected: &[u16],
) -> ShopListResult<Option<Value>> {
    log::debug!("{} {}", method, path);
    let response = remote.fetch(method, path, &[], body).await?;
    if expected.contains(&response.status) {
        Ok(response.content)
    } else {
        Err(ShopListError::Persistence {
            operation: operation_label(method, path),
            status: response.status,
            content: response.content,
        })
    }
}

/// Decode a successful response body into `T`
pub fn decode<T: DeserializeOwned>(operation: &str, content: Option<Value>) -> ShopListResult<T> {
    let content = content.ok_or_else(|| ShopListError::Transport {
        operation: operation.to_string(),
        message: "response has no body".to_string(),
    })?;
    serde_json::from_value(content).map_err(|e| ShopListError::Transport {
        operation: operation.to_string(),
        message: format!("unexpected response body: {}", e),
    })
}
