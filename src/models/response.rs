use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Response classification, mirroring the platform's response types.
/// Only `Basic` (same-origin) responses are eligible for write-through
/// caching; `Opaque` covers no-cors cross-origin fetches whose contents
/// the worker must not inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Basic,
    Cors,
    Opaque,
}

/// A captured response: status, headers, and body bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    pub kind: ResponseKind,
    /// Whether this response was served from a cache bucket.
    #[serde(default)]
    pub from_cache: bool,
}

impl FetchedResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Write-through eligibility: a 200 same-origin response.
    /// Cross-origin, error, and opaque responses pass through uncached.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.kind == ResponseKind::Basic
    }

    /// Body as text, for display. Lossy on non-UTF-8 bytes.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
