// Allow dead code: bucket API kept complete beyond what the policy exercises
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{FetchRequest, FetchedResponse, ResponseKind};

/// A response captured into a bucket, keyed by request identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedResponse {
    pub url: String,
    pub method: String,
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    pub captured_at: DateTime<Utc>,
}

impl CachedResponse {
    /// Capture a response for storage. Only basic same-origin responses are
    /// ever captured, so the kind is not recorded.
    pub fn capture(request: &FetchRequest, response: &FetchedResponse) -> Self {
        Self {
            url: request.url.to_string(),
            method: request.method.clone(),
            status: response.status,
            headers: response.headers.clone(),
            body: response.body.clone(),
            captured_at: Utc::now(),
        }
    }

    /// Revive the captured response for serving.
    pub fn to_response(&self) -> FetchedResponse {
        FetchedResponse {
            status: self.status,
            headers: self.headers.clone(),
            body: self.body.clone(),
            kind: ResponseKind::Basic,
            from_cache: true,
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.captured_at).num_minutes()
    }

    /// Human-readable capture age for status display
    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }
}

/// A named cache bucket: request identity to captured response.
/// One bucket exists per deployed version; all reads and writes during
/// normal operation target the current version's bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheBucket {
    name: String,
    entries: HashMap<String, CachedResponse>,
}

impl CacheBucket {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a request by its cache identity.
    pub fn match_request(&self, request: &FetchRequest) -> Option<&CachedResponse> {
        self.entries.get(&request.cache_key())
    }

    /// Store a response under the request's identity, replacing any
    /// previous entry for the same key.
    pub fn put(&mut self, request: &FetchRequest, response: &FetchedResponse) {
        self.entries
            .insert(request.cache_key(), CachedResponse::capture(request, response));
    }

    pub fn delete(&mut self, request: &FetchRequest) -> bool {
        self.entries.remove(&request.cache_key()).is_some()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(|k| k.as_str()).collect()
    }

    /// Captured entries, unordered.
    pub fn entries(&self) -> impl Iterator<Item = &CachedResponse> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent capture time across entries, for status display.
    pub fn last_captured(&self) -> Option<DateTime<Utc>> {
        self.entries.values().map(|e| e.captured_at).max()
    }
}

/// The named-bucket store: `open`, `keys`, `delete`, `has`.
///
/// Buckets live in memory; `load` and `persist` move the whole store
/// through one pretty-printed JSON file per bucket under a directory, so
/// a primed cache survives across runs.
#[derive(Debug, Clone, Default)]
pub struct CacheStorage {
    buckets: HashMap<String, CacheBucket>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a bucket, creating it if absent.
    pub fn open(&mut self, name: &str) -> &mut CacheBucket {
        self.buckets
            .entry(name.to_string())
            .or_insert_with(|| CacheBucket::new(name))
    }

    /// Read-only access to an existing bucket.
    pub fn get(&self, name: &str) -> Option<&CacheBucket> {
        self.buckets.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.buckets.contains_key(name)
    }

    pub fn delete(&mut self, name: &str) -> bool {
        self.buckets.remove(name).is_some()
    }

    /// All bucket names, unordered.
    pub fn keys(&self) -> Vec<String> {
        self.buckets.keys().cloned().collect()
    }

    fn bucket_path(dir: &Path, name: &str) -> std::path::PathBuf {
        dir.join(format!("{}.json", name))
    }

    /// Load every bucket file from `dir`. A missing directory is an empty
    /// store; an unreadable bucket file is skipped with a warning rather
    /// than failing the whole load.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut storage = Self::new();
        if !dir.exists() {
            return Ok(storage);
        }

        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read cache directory {}", dir.display()))?
        {
            let path = entry?.path();
            if path.extension().map(|e| e == "json") != Some(true) {
                continue;
            }

            let contents = match std::fs::read_to_string(&path) {
                Ok(c) => c,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable bucket file");
                    continue;
                }
            };
            match serde_json::from_str::<CacheBucket>(&contents) {
                Ok(bucket) => {
                    debug!(bucket = bucket.name(), entries = bucket.len(), "Loaded bucket");
                    storage.buckets.insert(bucket.name().to_string(), bucket);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping malformed bucket file");
                }
            }
        }
        Ok(storage)
    }

    /// Write every bucket to `dir` and remove files for buckets that no
    /// longer exist (stale-version eviction reaches the disk copy here).
    pub fn persist(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create cache directory {}", dir.display()))?;

        for bucket in self.buckets.values() {
            let path = Self::bucket_path(dir, bucket.name());
            let contents = serde_json::to_string_pretty(bucket)?;
            std::fs::write(&path, contents)
                .with_context(|| format!("Failed to write bucket file {}", path.display()))?;
        }

        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "json") != Some(true) {
                continue;
            }
            let known = path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(|name| self.buckets.contains_key(name))
                .unwrap_or(false);
            if !known {
                debug!(path = %path.display(), "Removing stale bucket file");
                std::fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn request(url: &str) -> FetchRequest {
        FetchRequest::get(Url::parse(url).unwrap())
    }

    fn response(status: u16, body: &[u8]) -> FetchedResponse {
        FetchedResponse {
            status,
            headers: HashMap::new(),
            body: body.to_vec(),
            kind: ResponseKind::Basic,
            from_cache: false,
        }
    }

    #[test]
    fn test_bucket_put_and_match() {
        let mut bucket = CacheBucket::new("kaamkaro-v4.0");
        let req = request("https://kaamkaro.app/index.html");

        assert!(bucket.match_request(&req).is_none());

        bucket.put(&req, &response(200, b"<html>"));
        let hit = bucket.match_request(&req).unwrap();
        assert_eq!(hit.status, 200);
        assert_eq!(hit.body, b"<html>");
    }

    #[test]
    fn test_bucket_match_distinguishes_method() {
        let mut bucket = CacheBucket::new("v1");
        let get = request("https://kaamkaro.app/");
        bucket.put(&get, &response(200, b"home"));

        let mut post = request("https://kaamkaro.app/");
        post.method = "POST".to_string();
        assert!(bucket.match_request(&post).is_none());
    }

    #[test]
    fn test_bucket_delete() {
        let mut bucket = CacheBucket::new("v1");
        let req = request("https://kaamkaro.app/app.js");
        bucket.put(&req, &response(200, b"js"));

        assert!(bucket.delete(&req));
        assert!(!bucket.delete(&req));
        assert!(bucket.is_empty());
    }

    #[test]
    fn test_cached_response_revival_marks_from_cache() {
        let req = request("https://kaamkaro.app/manifest.json");
        let captured = CachedResponse::capture(&req, &response(200, b"{}"));

        let revived = captured.to_response();
        assert!(revived.from_cache);
        assert_eq!(revived.kind, ResponseKind::Basic);
        assert_eq!(revived.body, b"{}");
    }

    #[test]
    fn test_storage_open_has_delete() {
        let mut storage = CacheStorage::new();
        assert!(!storage.has("kaamkaro-v4.0"));

        storage.open("kaamkaro-v4.0");
        assert!(storage.has("kaamkaro-v4.0"));
        assert_eq!(storage.keys(), vec!["kaamkaro-v4.0".to_string()]);

        assert!(storage.delete("kaamkaro-v4.0"));
        assert!(!storage.has("kaamkaro-v4.0"));
    }

    #[test]
    fn test_storage_persist_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let req = request("https://kaamkaro.app/index.html");

        let mut storage = CacheStorage::new();
        storage.open("kaamkaro-v4.0").put(&req, &response(200, b"<html>shell</html>"));
        storage.persist(dir.path()).unwrap();

        let loaded = CacheStorage::load(dir.path()).unwrap();
        let bucket = loaded.get("kaamkaro-v4.0").unwrap();
        let hit = bucket.match_request(&req).unwrap();
        assert_eq!(hit.body, b"<html>shell</html>");
    }

    #[test]
    fn test_storage_persist_removes_deleted_buckets() {
        let dir = tempfile::tempdir().unwrap();

        let mut storage = CacheStorage::new();
        storage.open("kaamkaro-v4.0");
        storage.open("kaamkaro-v4.1");
        storage.persist(dir.path()).unwrap();

        storage.delete("kaamkaro-v4.0");
        storage.persist(dir.path()).unwrap();

        let loaded = CacheStorage::load(dir.path()).unwrap();
        assert!(!loaded.has("kaamkaro-v4.0"));
        assert!(loaded.has("kaamkaro-v4.1"));
    }

    #[test]
    fn test_load_missing_directory_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("never-created");

        let storage = CacheStorage::load(&missing).unwrap();
        assert!(storage.keys().is_empty());
    }

    #[test]
    fn test_load_skips_malformed_bucket_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "not json").unwrap();

        let mut storage = CacheStorage::new();
        storage.open("kaamkaro-v4.0");
        storage.persist(dir.path()).unwrap();
        std::fs::write(dir.path().join("broken.json"), "not json").unwrap();

        let loaded = CacheStorage::load(dir.path()).unwrap();
        assert!(loaded.has("kaamkaro-v4.0"));
        assert!(!loaded.has("broken"));
    }
}
