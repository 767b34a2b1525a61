//! Error types for the offline cache worker.

use alloc::string::String;

use crate::lifecycle::WorkerState;

/// Result type for worker operations
pub type Result<T> = core::result::Result<T, WorkerError>;

/// Network failure seen by the worker while fetching.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    /// No connectivity
    #[error("network unreachable")]
    Offline,
    /// Host name could not be resolved
    #[error("DNS lookup failed for {0}")]
    Dns(String),
    /// Any other transport failure
    #[error("request to {url} failed: {reason}")]
    Failed { url: String, reason: String },
}

/// Cache storage error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// Named cache does not exist
    #[error("cache not found: {0}")]
    NotFound(String),
    /// Storage quota exceeded
    #[error("cache quota exceeded ({limit} bytes)")]
    QuotaExceeded { limit: usize },
    /// Backend storage failure
    #[error("storage error: {0}")]
    Storage(String),
}

/// Configuration error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Configuration document is not valid JSON for `WorkerConfig`
    #[error("invalid worker config: {0}")]
    InvalidJson(String),
    /// Origin is not an absolute http(s) origin
    #[error("invalid origin: {0}")]
    InvalidOrigin(String),
    /// Cache name must not be empty
    #[error("cache name must not be empty")]
    EmptyCacheName,
    /// Manifest entries must not be empty strings
    #[error("manifest entry {0} is empty")]
    EmptyManifestEntry(usize),
}

/// Top-level worker error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkerError {
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// An install-time asset came back with a non-success status
    #[error("asset {url} returned status {status}")]
    BadStatus { url: String, status: u16 },
    /// State machine rejected a transition
    #[error("invalid state transition {from:?} -> {to:?}")]
    InvalidStateTransition { from: WorkerState, to: WorkerState },
    /// No worker is active for the registration
    #[error("no active worker")]
    NoActiveWorker,
    /// No worker is waiting to activate
    #[error("no waiting worker")]
    NoWaitingWorker,
    /// Client (window) operation failed
    #[error("client error: {0}")]
    Client(String),
    /// Notification could not be shown or closed
    #[error("notification error: {0}")]
    Notification(String),
    /// Background sync hook failed
    #[error("sync error: {0}")]
    Sync(String),
}
