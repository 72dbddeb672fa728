//! KaamKaro offline worker - deployment-side harness.
//!
//! Drives the worker lifecycle explicitly: priming the versioned app-shell
//! cache (install + activate), routing individual requests through the
//! fetch-interception policy, and inspecting the persisted bucket store.

mod cache;
mod config;
mod models;
mod net;
mod notify;
mod worker;

use std::io;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use url::Url;

use cache::CacheStorage;
use config::WorkerConfig;
use models::FetchRequest;
use net::{HttpNetwork, Network};
use notify::LogNotifier;
use worker::{OfflineWorker, WorkerEvent};

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = WorkerConfig::load()?;
    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        None | Some("--prime") => prime(&config).await,
        Some("--fetch") => {
            let url = args
                .get(2)
                .context("Usage: kaamkaro-sw --fetch <url>")?;
            fetch_one(&config, url).await
        }
        Some("--status") => status(&config),
        Some(other) => bail!("Unknown command: {}", other),
    }
}

fn load_storage(config: &WorkerConfig) -> Result<CacheStorage> {
    let dir = config.cache_dir()?;
    match CacheStorage::load(&dir) {
        Ok(storage) => Ok(storage),
        Err(e) => {
            warn!(error = %e, "Could not load persisted cache, starting empty");
            Ok(CacheStorage::new())
        }
    }
}

/// Run install + activate for the configured version and persist the
/// primed store.
async fn prime(config: &WorkerConfig) -> Result<()> {
    info!(version = %config.cache_version, base_url = %config.base_url, "Priming offline cache");

    let network = Arc::new(HttpNetwork::new(config.base_url.clone())?);
    let storage = load_storage(config)?;
    let worker = OfflineWorker::with_storage(
        config.clone(),
        network,
        Arc::new(LogNotifier),
        storage,
    );

    worker.handle_install().await?;
    worker.handle_activate().await?;
    worker.persist(&config.cache_dir()?).await?;

    println!(
        "Primed {} with {} assets",
        config.cache_version,
        worker.cached_asset_count().await
    );
    Ok(())
}

/// Route one request through the interception policy via the event loop
/// and report the outcome.
async fn fetch_one(config: &WorkerConfig, raw_url: &str) -> Result<()> {
    let url = Url::parse(raw_url).with_context(|| format!("Invalid URL: {}", raw_url))?;

    let storage = load_storage(config)?;
    if !storage.has(&config.cache_version) {
        bail!(
            "Cache {} is not primed - run kaamkaro-sw --prime first",
            config.cache_version
        );
    }

    let network = Arc::new(HttpNetwork::new(config.base_url.clone())?);
    let worker = OfflineWorker::resume(
        config.clone(),
        network.clone(),
        Arc::new(LogNotifier),
        storage,
    );

    let (events, receiver) = worker::channel();
    let event_loop = tokio::spawn(worker::run_event_loop(worker.clone(), receiver));

    let (responder, response) = oneshot::channel();
    let request = FetchRequest::navigation(url.clone());
    events
        .send(WorkerEvent::Fetch { request, responder })
        .context("Worker event loop is gone")?;

    match response.await.context("Fetch was dropped by the worker")? {
        Some(response) => {
            println!(
                "{} {} ({} bytes, {})",
                response.status,
                url,
                response.body.len(),
                if response.from_cache { "from cache" } else { "from network" }
            );
            // write-through may have grown the bucket
            worker.persist(&config.cache_dir()?).await?;
        }
        None => {
            println!("Not intercepted, passing straight to the network");
            let direct = network
                .fetch(&FetchRequest::get(url.clone()))
                .await
                .with_context(|| format!("Direct fetch of {} failed", url))?;
            println!("{} {} ({} bytes)", direct.status, url, direct.body.len());
        }
    }

    drop(events);
    event_loop.await.context("Worker event loop panicked")?;
    Ok(())
}

/// List persisted buckets with entry counts and ages.
fn status(config: &WorkerConfig) -> Result<()> {
    let storage = load_storage(config)?;
    let mut names = storage.keys();
    names.sort();

    if names.is_empty() {
        println!("No cache buckets (run kaamkaro-sw --prime)");
        return Ok(());
    }

    for name in names {
        let bucket = match storage.get(&name) {
            Some(bucket) => bucket,
            None => continue,
        };
        let current = if name == config.cache_version { " (current)" } else { "" };
        println!("{}{}: {} entries", name, current, bucket.len());

        let mut entries: Vec<_> = bucket.entries().collect();
        entries.sort_by(|a, b| a.url.cmp(&b.url));
        for entry in entries {
            println!(
                "  {} {} ({}, {} bytes, {})",
                entry.method,
                entry.url,
                entry.status,
                entry.body.len(),
                entry.age_display()
            );
        }
    }
    Ok(())
}
