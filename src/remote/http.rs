//! HTTP Remote Client
//!
//! reqwest-backed `RemoteClient` talking JSON to the ShopList API.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use super::{operation_label, Method, RemoteClient, RemoteResponse};
use crate::domain::{ShopListError, ShopListResult};

/// Remote client over HTTP
pub struct HttpRemote {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRemote {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base url + path + `?k=v&...` with percent-encoded values
    pub(crate) fn build_url(&self, path: &str, query: &[(&str, &str)]) -> String {
        let mut url = format!("{}{}", self.base_url, path);
        for (i, (key, value)) in query.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(&utf8_percent_encode(key, NON_ALPHANUMERIC).to_string());
            url.push('=');
            url.push_str(&utf8_percent_encode(value, NON_ALPHANUMERIC).to_string());
        }
        url
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

#[async_trait(?Send)]
impl RemoteClient for HttpRemote {
    async fn fetch(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> ShopListResult<RemoteResponse> {
        let operation = operation_label(method, path);
        let transport = |e: reqwest::Error| ShopListError::Transport {
            operation: operation.clone(),
            message: e.to_string(),
        };

        let mut request = self
            .client
            .request(method.into(), self.build_url(path, query))
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(transport)?;
        let status = response.status().as_u16();
        if status == 204 {
            return Ok(RemoteResponse::new(status, None));
        }

        let content = response.json::<Value>().await.map_err(transport)?;
        Ok(RemoteResponse::new(status, Some(content)))
    }
}
