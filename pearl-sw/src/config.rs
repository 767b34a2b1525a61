//! Worker Configuration
//!
//! Everything the worker needs to know about the deployment is injected
//! through [`WorkerConfig`]: the origin it serves, the cache generation name,
//! the static manifest and the fallback/notification defaults.
//!
//! Hosts may load overrides from JSON:
//!
//! ```json
//! { "origin": "https://pearl.example",
//!   "cache_name": "pearl-verse-v2",
//!   "install_mode": "staged" }
//! ```
//!
//! Missing fields keep their Pearl Verse defaults.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::fetch::Origin;

// ── Constants ───────────────────────────────────────────────

/// Current cache generation. Bumping it invalidates every cached asset on
/// the next deployment.
pub const CACHE_NAME: &str = "pearl-verse-v1";

/// Assets cached at install time.
pub const STATIC_ASSETS: [&str; 4] = [
    "/",
    "/static/css/style.css",
    "/static/js/script.js",
    "/static/images/avatar-placeholder.png",
];

/// Body of the synthetic document served to offline navigations.
pub const OFFLINE_HTML: &str =
    "<h1>Offline</h1><p>You are currently offline. Please check your connection.</p>";

/// Default notification title.
pub const DEFAULT_TITLE: &str = "Pearl Verse";

/// Default notification body.
pub const DEFAULT_BODY: &str = "New notification from Pearl Verse";

/// Icon and badge shown with notifications.
pub const NOTIFICATION_ICON: &str = "/static/images/avatar-placeholder.png";

/// Vibration pattern (ms on/off/on).
pub const VIBRATE_PATTERN: [u32; 3] = [200, 100, 200];

/// Sync tag that triggers the background sync hook.
pub const BACKGROUND_SYNC_TAG: &str = "background-sync";

/// Development server origin (Flask default).
pub const DEFAULT_ORIGIN: &str = "http://localhost:5000";

// ── Types ───────────────────────────────────────────────────

/// How install populates the cache generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstallMode {
    /// Fetch and store one asset at a time. A mid-manifest failure leaves
    /// the entries already written in place.
    #[default]
    BestEffort,
    /// Fetch every asset first and only open/write the cache once all of
    /// them succeeded.
    Staged,
}

/// Defaults used when a push payload omits a field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NotificationDefaults {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    /// Target URL when the payload has none.
    pub url: String,
}

impl Default for NotificationDefaults {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            body: DEFAULT_BODY.to_string(),
            icon: NOTIFICATION_ICON.to_string(),
            badge: NOTIFICATION_ICON.to_string(),
            vibrate: VIBRATE_PATTERN.to_vec(),
            url: "/".to_string(),
        }
    }
}

/// Worker configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Origin whose requests are intercepted
    #[serde(deserialize_with = "deserialize_origin")]
    pub origin: Origin,
    /// Name of the current cache generation
    pub cache_name: String,
    /// Paths (or absolute URLs) cached during install
    pub manifest: Vec<String>,
    /// Body of the offline navigation fallback
    pub offline_page: String,
    /// Push notification defaults
    pub notification: NotificationDefaults,
    /// Sync tag that runs the sync hook
    pub sync_tag: String,
    /// Request activation without waiting for old clients
    pub skip_waiting: bool,
    /// Install population mode
    pub install_mode: InstallMode,
}

impl WorkerConfig {
    /// The shipped Pearl Verse configuration for `origin`.
    pub fn pearl_verse(origin: Origin) -> Self {
        Self {
            origin,
            cache_name: CACHE_NAME.to_string(),
            manifest: STATIC_ASSETS.iter().map(|s| s.to_string()).collect(),
            offline_page: OFFLINE_HTML.to_string(),
            notification: NotificationDefaults::default(),
            sync_tag: BACKGROUND_SYNC_TAG.to_string(),
            skip_waiting: true,
            install_mode: InstallMode::BestEffort,
        }
    }

    /// Load a configuration from JSON, filling gaps with defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::InvalidJson(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the cache generation name.
    pub fn with_cache_name(mut self, name: impl Into<String>) -> Self {
        self.cache_name = name.into();
        self
    }

    /// Replace the manifest.
    pub fn with_manifest<I, S>(mut self, manifest: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.manifest = manifest.into_iter().map(Into::into).collect();
        self
    }

    /// Set the install mode.
    pub fn with_install_mode(mut self, mode: InstallMode) -> Self {
        self.install_mode = mode;
        self
    }

    /// Set the skip-waiting flag.
    pub fn with_skip_waiting(mut self, skip: bool) -> Self {
        self.skip_waiting = skip;
        self
    }

    /// Check invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_name.trim().is_empty() {
            return Err(ConfigError::EmptyCacheName);
        }
        if let Some(index) = self.manifest.iter().position(|e| e.trim().is_empty()) {
            return Err(ConfigError::EmptyManifestEntry(index));
        }
        Ok(())
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self::pearl_verse(Origin::from_static(DEFAULT_ORIGIN))
    }
}

fn deserialize_origin<'de, D>(deserializer: D) -> Result<Origin, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Origin::parse(&raw).map_err(serde::de::Error::custom)
}
