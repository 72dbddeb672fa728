// Allow dead code: request modes cover the platform's full set
#![allow(dead_code)]

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use url::Url;

/// How a request was initiated. Navigation requests load a full page and
/// get the offline fallback treatment; everything else is a sub-resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    Navigate,
    SameOrigin,
    #[default]
    Cors,
    NoCors,
}

/// An intercepted outgoing request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchRequest {
    pub url: Url,
    pub method: String,
    pub mode: RequestMode,
    pub headers: HashMap<String, String>,
}

impl FetchRequest {
    /// Plain GET sub-resource request
    pub fn get(url: Url) -> Self {
        Self {
            url,
            method: "GET".to_string(),
            mode: RequestMode::default(),
            headers: HashMap::new(),
        }
    }

    /// Top-level page load
    pub fn navigation(url: Url) -> Self {
        Self {
            mode: RequestMode::Navigate,
            ..Self::get(url)
        }
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    /// Cache identity: method plus full URL.
    /// Two requests with the same key are interchangeable for cache purposes.
    pub fn cache_key(&self) -> String {
        format!("{} {}", self.method, self.url)
    }

    /// Whether the URL matches the reserved bypass prefix (substring match,
    /// same rule the deployed worker applies to `/api/` calls).
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        self.url.as_str().contains(prefix)
    }
}
