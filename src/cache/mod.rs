//! Versioned cache buckets for offline asset storage.
//!
//! This module provides the named-bucket store the worker caches app-shell
//! assets in. Each deployed version owns one `CacheBucket`; the
//! `CacheStorage` holds all buckets and persists them as JSON files so a
//! primed cache survives across runs. Eviction is whole-bucket deletion by
//! version name; there is no finer-grained policy.

pub mod store;

pub use store::{CacheBucket, CacheStorage, CachedResponse};
