//! Pearl Verse Offline Cache Worker
//!
//! This crate implements the storefront's service worker as a host-independent
//! library. The worker keeps one versioned cache generation of static assets,
//! serves same-origin GET requests from it, falls back to the network and then
//! to a synthetic offline document for navigations, and forwards push
//! messages to the notification tray.
//!
//! Every lifecycle hook is split in two: a pure planning function in
//! [`handlers`] that turns configuration plus an event into an effect
//! description, and an async executor in [`worker`] that applies the plan to
//! the injected host capabilities. [`registration`] plays the browser's part
//! of the lifecycle (install → waiting → activating → active).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │        Registration (deploy / route)         │
//! ├──────────────────────────────────────────────┤
//! │   OfflineWorker (async executors)            │
//! │   handlers::on_* (pure plans)                │
//! ├───────┬──────────┬──────────────┬────────────┤
//! │ cache │ network  │ notification │  clients   │
//! └───┬───┴────┬─────┴──────┬───────┴─────┬──────┘
//!     └────────┴────────────┴─────────────┘
//!                  Host adapters
//! ```
//!
//! # Modules
//!
//! - `config`: Worker configuration (cache name, manifest, defaults)
//! - `error`: Error taxonomy
//! - `fetch`: Request/response model, origin matching, network trait
//! - `cache`: Cache storage trait + in-memory generations
//! - `clients`: Window clients (claim, focus, open)
//! - `notification`: Push payloads and the notification tray
//! - `sync`: Background sync registrations
//! - `events`: Lifecycle event types
//! - `lifecycle`: Worker state machine
//! - `handlers`: Pure planning functions
//! - `worker`: Async event executors
//! - `registration`: Deployment driver

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod cache;
pub mod clients;
pub mod config;
pub mod error;
pub mod events;
pub mod fetch;
pub mod handlers;
pub mod lifecycle;
pub mod notification;
pub mod registration;
pub mod sync;
pub mod worker;

// Re-exports for convenience
pub use cache::{CacheStorage, MemoryCacheStorage};
pub use clients::{ClientHost, ClientInfo, MemoryClients};
pub use config::{InstallMode, NotificationDefaults, WorkerConfig};
pub use error::{CacheError, ConfigError, NetworkError, Result, WorkerError};
pub use events::{EventOutcome, NotificationClickEvent, PushEvent, WorkerEvent};
pub use fetch::{Destination, Method, Network, Origin, Request, Response};
pub use lifecycle::{WorkerId, WorkerState};
pub use notification::{Notification, NotificationCenter, NotificationHost};
pub use registration::{DeployOutcome, Registration};
pub use sync::{NoopSync, SyncEvent, SyncHook, SyncRegistry};
pub use worker::{
    ActivateReport, ClickOutcome, FetchOutcome, Host, InstallReport, OfflineWorker, ResponseSource,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
