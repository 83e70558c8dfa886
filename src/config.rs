//! Client Configuration
//!
//! JSON file holding the API base URL and where logs go. A missing file is
//! not an error: every field falls back to its default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{ShopListError, ShopListResult};

/// Base URL of the ShopList API when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:20080/UK/Web_Applications/Project/API";

/// Environment variable overriding `api_url`
pub const API_URL_ENV: &str = "SHOPLIST_API_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub log_dir: PathBuf,
    pub app_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            log_dir: PathBuf::from("logs"),
            app_name: "shoplist".to_string(),
        }
    }
}

impl Config {
    /// Read `path`, or the defaults when the file does not exist
    pub fn load(path: &Path) -> ShopListResult<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .map_err(|e| ShopListError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&text)
            .map_err(|e| ShopListError::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    pub fn save(&self, path: &Path) -> ShopListResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ShopListError::Config(e.to_string()))?;
        }
        let text = serde_json::to_string_pretty(self).map_err(|e| ShopListError::Config(e.to_string()))?;
        fs::write(path, text)
            .map_err(|e| ShopListError::Config(format!("Failed to write {}: {}", path.display(), e)))
    }

    /// Replace `api_url` when an override is given
    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_url = url;
        }
        self
    }
}
