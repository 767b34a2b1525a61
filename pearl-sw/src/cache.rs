//! Cache Storage
//!
//! The worker keeps its static assets in named cache generations. Hosts
//! provide storage through the [`CacheStorage`] trait; [`MemoryCacheStorage`]
//! is the in-memory implementation used by native hosts and tests.
//!
//! Entries are keyed by absolute request URL (fragment stripped). A
//! generation is never edited in place by the worker once installed; it is
//! dropped as a whole when a newer generation activates.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use async_trait::async_trait;
use hashbrown::HashMap;
use spin::RwLock;

use crate::error::CacheError;
use crate::fetch::{cache_key, Response};

/// Default storage quota (50 MB).
pub const DEFAULT_QUOTA: usize = 50 * 1024 * 1024;

/// Named cache storage provided by the host.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open a cache, creating it if absent.
    async fn open(&self, name: &str) -> Result<(), CacheError>;

    /// Check if a cache exists.
    async fn has(&self, name: &str) -> Result<bool, CacheError>;

    /// Delete a cache. Returns `false` if it did not exist.
    async fn delete(&self, name: &str) -> Result<bool, CacheError>;

    /// Names of all caches.
    async fn keys(&self) -> Result<Vec<String>, CacheError>;

    /// Store `response` under `url` in an opened cache.
    async fn put(&self, name: &str, url: &str, response: Response) -> Result<(), CacheError>;

    /// Look up `url` in a single cache.
    async fn match_url(&self, name: &str, url: &str) -> Result<Option<Response>, CacheError>;

    /// URLs stored in a cache.
    async fn entries(&self, name: &str) -> Result<Vec<String>, CacheError>;
}

/// A stored response plus its accounted size.
#[derive(Debug, Clone)]
struct CacheEntry {
    response: Response,
    size: usize,
}

/// One cache generation.
#[derive(Debug, Default)]
struct Generation {
    entries: HashMap<String, CacheEntry>,
    total_size: usize,
}

impl Generation {
    fn insert(&mut self, url: &str, response: Response) {
        let size = response.size();
        if let Some(old) = self.entries.insert(
            url.to_string(),
            CacheEntry { response, size },
        ) {
            self.total_size -= old.size;
        }
        self.total_size += size;
    }
}

/// In-memory cache storage for one origin.
pub struct MemoryCacheStorage {
    /// cache name → generation
    caches: RwLock<BTreeMap<String, Generation>>,
    /// Quota across all caches (bytes)
    quota: usize,
}

impl MemoryCacheStorage {
    /// Create empty storage with the default quota.
    pub fn new() -> Self {
        Self::with_quota(DEFAULT_QUOTA)
    }

    /// Create empty storage with a custom quota.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            caches: RwLock::new(BTreeMap::new()),
            quota,
        }
    }

    /// Names of all caches, sorted.
    pub fn cache_names(&self) -> Vec<String> {
        self.caches.read().keys().cloned().collect()
    }

    /// Number of entries in a cache (0 if missing).
    pub fn len(&self, name: &str) -> usize {
        self.caches
            .read()
            .get(name)
            .map(|g| g.entries.len())
            .unwrap_or(0)
    }

    /// Bytes used across all caches.
    pub fn usage(&self) -> usize {
        self.caches.read().values().map(|g| g.total_size).sum()
    }

    /// Get quota
    pub fn quota(&self) -> usize {
        self.quota
    }
}

impl Default for MemoryCacheStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, name: &str) -> Result<(), CacheError> {
        let mut caches = self.caches.write();
        if !caches.contains_key(name) {
            log::debug!("[Pearl Cache] Creating cache {}", name);
            caches.insert(name.to_string(), Generation::default());
        }
        Ok(())
    }

    async fn has(&self, name: &str) -> Result<bool, CacheError> {
        Ok(self.caches.read().contains_key(name))
    }

    async fn delete(&self, name: &str) -> Result<bool, CacheError> {
        Ok(self.caches.write().remove(name).is_some())
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        Ok(self.cache_names())
    }

    async fn put(&self, name: &str, url: &str, response: Response) -> Result<(), CacheError> {
        let mut caches = self.caches.write();
        let usage: usize = caches.values().map(|g| g.total_size).sum();
        let key = cache_key(url);

        let generation = caches
            .get_mut(name)
            .ok_or_else(|| CacheError::NotFound(name.to_string()))?;

        let replaced = generation.entries.get(key).map(|e| e.size).unwrap_or(0);
        if usage - replaced + response.size() > self.quota {
            return Err(CacheError::QuotaExceeded { limit: self.quota });
        }

        generation.insert(key, response);
        Ok(())
    }

    async fn match_url(&self, name: &str, url: &str) -> Result<Option<Response>, CacheError> {
        Ok(self
            .caches
            .read()
            .get(name)
            .and_then(|g| g.entries.get(cache_key(url)))
            .map(|e| e.response.clone()))
    }

    async fn entries(&self, name: &str) -> Result<Vec<String>, CacheError> {
        let caches = self.caches.read();
        let generation = caches
            .get(name)
            .ok_or_else(|| CacheError::NotFound(name.to_string()))?;
        let mut urls: Vec<String> = generation.entries.keys().cloned().collect();
        urls.sort();
        Ok(urls)
    }
}
