//! Worker configuration.
//!
//! The deployed worker carries its cache version, asset manifest, and
//! bypass prefix as embedded constants; here they are the defaults of an
//! explicit `WorkerConfig`, optionally overridden by a JSON file at
//! `~/.config/kaamkaro-sw/config.json`. The version string is the only
//! knob a deployer bumps per release to force stale-cache eviction.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use url::Url;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "kaamkaro-sw";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Cache bucket name for the currently deployed version
const DEFAULT_CACHE_VERSION: &str = "kaamkaro-v4.0";

/// Origin the app shell is served from
const DEFAULT_BASE_URL: &str = "https://kaamkaro.app";

/// Requests whose URL contains this prefix pass straight to the network
const DEFAULT_BYPASS_PREFIX: &str = "/api/";

fn default_cache_version() -> String {
    DEFAULT_CACHE_VERSION.to_string()
}

fn default_base_url() -> Url {
    // Constant is a valid URL; parse cannot fail.
    Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid")
}

fn default_bypass_prefix() -> String {
    DEFAULT_BYPASS_PREFIX.to_string()
}

/// The app shell: pre-populated into the current bucket at install time.
fn default_manifest() -> Vec<String> {
    ["/", "/index.html", "/admin.html", "/manifest.json"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    #[serde(default = "default_cache_version")]
    pub cache_version: String,
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    #[serde(default = "default_manifest")]
    pub precache_manifest: Vec<String>,
    #[serde(default = "default_bypass_prefix")]
    pub bypass_prefix: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            cache_version: default_cache_version(),
            base_url: default_base_url(),
            precache_manifest: default_manifest(),
            bypass_prefix: default_bypass_prefix(),
        }
    }
}

impl WorkerConfig {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory the bucket store persists under.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
