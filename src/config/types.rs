use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::library::DEFAULT_PAGE_SIZE;
use crate::notify::DEFAULT_DISMISS_AFTER;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";
pub const API_BASE_ENV: &str = "POCFORGE_API_BASE";

/// On-disk YAML layout. Every section is optional.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct PocForgeConfig {
    pub api: Option<ApiConfig>,
    pub library: Option<LibraryConfig>,
    pub notifications: Option<NotificationsConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ApiConfig {
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct LibraryConfig {
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct NotificationsConfig {
    pub dismiss_after_ms: Option<u64>,
}

/// Effective settings after defaults, environment and CLI overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub page_size: usize,
    pub dismiss_after: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            dismiss_after: DEFAULT_DISMISS_AFTER,
        }
    }
}

impl ClientConfig {
    pub fn from_file_config(file: &PocForgeConfig) -> Self {
        let defaults = Self::default();
        Self {
            base_url: file
                .api
                .as_ref()
                .and_then(|a| a.base_url.clone())
                .unwrap_or(defaults.base_url),
            page_size: file
                .library
                .as_ref()
                .and_then(|l| l.page_size)
                .unwrap_or(defaults.page_size),
            dismiss_after: file
                .notifications
                .as_ref()
                .and_then(|n| n.dismiss_after_ms)
                .map(Duration::from_millis)
                .unwrap_or(defaults.dismiss_after),
        }
    }
}
