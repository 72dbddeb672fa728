// Allow dead code: lifecycle accessors are exercised mostly by tests
#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use futures::future::try_join_all;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::cache::CacheStorage;
use crate::config::WorkerConfig;
use crate::models::{FetchRequest, FetchedResponse};
use crate::net::{NetError, Network};
use crate::notify::{self, Notifier, NOTIFICATION_TITLE};

use super::Clients;

/// Sync events with this tag trigger task synchronization; other tags are
/// ignored.
pub const SYNC_TASKS_TAG: &str = "sync-tasks";

/// Worker lifecycle state. Install failure parks the worker at `Redundant`
/// and the previously active version keeps serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    Redundant,
}

impl WorkerState {
    /// Fetch interception only answers once activation has completed.
    pub fn can_intercept(&self) -> bool {
        matches!(self, WorkerState::Activated)
    }
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
            WorkerState::Redundant => "redundant",
        };
        write!(f, "{}", name)
    }
}

/// The offline cache manager: owns the versioned bucket store and handles
/// the install / activate / fetch lifecycle plus push, notification-click,
/// and sync events.
///
/// Clone is cheap - all state lives behind Arcs, so a clone per in-flight
/// fetch task shares the same store.
#[derive(Clone)]
pub struct OfflineWorker {
    config: WorkerConfig,
    caches: Arc<RwLock<CacheStorage>>,
    network: Arc<dyn Network>,
    notifier: Arc<dyn Notifier>,
    clients: Arc<RwLock<Clients>>,
    state: Arc<RwLock<WorkerState>>,
}

impl OfflineWorker {
    pub fn new(config: WorkerConfig, network: Arc<dyn Network>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_storage(config, network, notifier, CacheStorage::new())
    }

    /// Construct over an existing store (e.g. loaded from disk).
    pub fn with_storage(
        config: WorkerConfig,
        network: Arc<dyn Network>,
        notifier: Arc<dyn Notifier>,
        storage: CacheStorage,
    ) -> Self {
        Self {
            config,
            caches: Arc::new(RwLock::new(storage)),
            network,
            notifier,
            clients: Arc::new(RwLock::new(Clients::new())),
            state: Arc::new(RwLock::new(WorkerState::Parsed)),
        }
    }

    /// Construct over a store primed by an earlier run. When the current
    /// version's bucket is already present the worker starts activated,
    /// the way a fresh worker process resumes an active registration.
    pub fn resume(
        config: WorkerConfig,
        network: Arc<dyn Network>,
        notifier: Arc<dyn Notifier>,
        storage: CacheStorage,
    ) -> Self {
        let primed = storage.has(&config.cache_version);
        let mut worker = Self::with_storage(config, network, notifier, storage);
        if primed {
            worker.state = Arc::new(RwLock::new(WorkerState::Activated));
        }
        worker
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    async fn set_state(&self, state: WorkerState) {
        debug!(state = %state, "Worker state change");
        *self.state.write().await = state;
    }

    /// Register an open page with the worker's client registry.
    pub async fn register_client(&self, url: url::Url) -> String {
        self.clients.write().await.add(url)
    }

    pub async fn controlled_clients(&self) -> usize {
        self.clients.read().await.controlled_count()
    }

    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Write the bucket store to disk.
    pub async fn persist(&self, dir: &Path) -> Result<()> {
        self.caches.read().await.persist(dir)
    }

    /// Entry count of the current version's bucket.
    pub async fn cached_asset_count(&self) -> usize {
        self.caches
            .read()
            .await
            .get(&self.config.cache_version)
            .map(|bucket| bucket.len())
            .unwrap_or(0)
    }

    /// All bucket names currently in the store.
    pub async fn bucket_names(&self) -> Vec<String> {
        self.caches.read().await.keys()
    }

    // ========================================================================
    // Install
    // ========================================================================

    /// Prime the current version's bucket with the full asset manifest.
    /// All-or-nothing: any failed fetch aborts installation, the worker
    /// goes redundant, and buckets of the previously active version are
    /// untouched.
    pub async fn handle_install(&self) -> Result<()> {
        self.set_state(WorkerState::Installing).await;
        info!(version = %self.config.cache_version, "📦 Caching app shell");

        let fetches = self
            .config
            .precache_manifest
            .iter()
            .map(|path| self.prime_entry(path));
        let entries = match try_join_all(fetches).await {
            Ok(entries) => entries,
            Err(e) => {
                self.set_state(WorkerState::Redundant).await;
                return Err(e.context("App shell priming failed, install aborted"));
            }
        };

        let mut caches = self.caches.write().await;
        let bucket = caches.open(&self.config.cache_version);
        for (request, response) in &entries {
            bucket.put(request, response);
        }
        drop(caches);
        info!(
            version = %self.config.cache_version,
            assets = entries.len(),
            "App shell cached"
        );

        // Skip the waiting phase so the new version can take over without
        // waiting on open tabs.
        self.set_state(WorkerState::Installed).await;
        Ok(())
    }

    async fn prime_entry(&self, path: &str) -> Result<(FetchRequest, FetchedResponse)> {
        let url = self
            .config
            .base_url
            .join(path)
            .with_context(|| format!("Invalid manifest path {:?}", path))?;
        let request = FetchRequest::get(url);

        let response = self
            .network
            .fetch(&request)
            .await
            .with_context(|| format!("Failed to fetch app shell asset {}", path))?;
        if !response.is_success() {
            let err = NetError::from_status(response.status, &response.body_text());
            return Err(anyhow::Error::new(err)
                .context(format!("App shell asset {} returned an error", path)));
        }
        Ok((request, response))
    }

    // ========================================================================
    // Activate
    // ========================================================================

    /// Evict every bucket not named for the current version and claim all
    /// open clients. Requires a completed install.
    pub async fn handle_activate(&self) -> Result<()> {
        let state = self.state().await;
        if state != WorkerState::Installed {
            bail!("Cannot activate from state {}", state);
        }
        self.set_state(WorkerState::Activating).await;

        let mut caches = self.caches.write().await;
        for name in caches.keys() {
            if name != self.config.cache_version {
                info!(bucket = %name, "🗑️ Deleting old cache");
                caches.delete(&name);
            }
        }
        drop(caches);

        self.clients.write().await.claim();
        self.set_state(WorkerState::Activated).await;
        info!(version = %self.config.cache_version, "Worker activated");
        Ok(())
    }

    // ========================================================================
    // Fetch interception
    // ========================================================================

    /// Apply the cache-first policy to one request.
    ///
    /// `None` means the request was not intercepted (API bypass, worker not
    /// active, or a failed non-navigation fetch with nothing cached) and
    /// the caller deals with the network - or the failure - itself.
    pub async fn handle_fetch(&self, request: &FetchRequest) -> Option<FetchedResponse> {
        if !self.state().await.can_intercept() {
            debug!(url = %request.url, "Worker not active, passing through");
            return None;
        }
        if request.matches_prefix(&self.config.bypass_prefix) {
            debug!(url = %request.url, "API call, bypassing cache");
            return None;
        }

        {
            let caches = self.caches.read().await;
            let hit = caches
                .get(&self.config.cache_version)
                .and_then(|bucket| bucket.match_request(request));
            if let Some(entry) = hit {
                debug!(url = %request.url, "Cache hit");
                return Some(entry.to_response());
            }
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_cacheable() {
                    // Write-through population. The response in flight is
                    // unaffected by anything that happens here.
                    let mut caches = self.caches.write().await;
                    caches
                        .open(&self.config.cache_version)
                        .put(request, &response);
                    debug!(url = %request.url, "Cached network response");
                }
                Some(response)
            }
            Err(e) => {
                debug!(url = %request.url, error = %e, "Network fetch failed");
                if request.is_navigation() {
                    self.offline_fallback().await
                } else {
                    None
                }
            }
        }
    }

    /// Offline navigations fall back to the cached root document.
    async fn offline_fallback(&self) -> Option<FetchedResponse> {
        let root = self.config.base_url.join("/").ok()?;
        let request = FetchRequest::get(root);

        let caches = self.caches.read().await;
        let entry = caches
            .get(&self.config.cache_version)?
            .match_request(&request)?;
        info!("Serving cached root document for offline navigation");
        Some(entry.to_response())
    }

    // ========================================================================
    // Push, notification click, sync
    // ========================================================================

    /// Show a task notification for a push event. Fire-and-forget; no
    /// state is shared with the cache.
    pub async fn handle_push(&self, data: Option<&[u8]>) {
        let body = notify::decode_push_payload(data);
        info!(body = %body, "Push received");
        self.notifier.show(&notify::task_alert(body));
    }

    /// Close the notification and open (or focus) the app root, whichever
    /// action button was pressed.
    pub async fn handle_notification_click(&self, action: Option<&str>) {
        debug!(action = action.unwrap_or("default"), "Notification clicked");
        self.notifier.close(NOTIFICATION_TITLE);

        if let Ok(root) = self.config.base_url.join("/") {
            self.clients.write().await.open_window(&root);
        }
    }

    pub async fn handle_sync(&self, tag: &str) {
        if tag == SYNC_TASKS_TAG {
            self.sync_tasks().await;
        } else {
            debug!(tag = tag, "Ignoring sync event with unknown tag");
        }
    }

    /// Placeholder: a real deployment would flush queued task mutations
    /// here, but no such queue exists in this system.
    async fn sync_tasks(&self) {
        info!("🔄 Syncing tasks");
    }
}

// ============================================================================
// Tests
// ============================================================================
