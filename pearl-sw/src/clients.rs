//! Window Clients
//!
//! Open pages of the origin. An activated worker claims them so they are
//! served without a reload; a notification click focuses one of them or
//! opens a new window.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use async_trait::async_trait;
use spin::Mutex;

use crate::error::{Result, WorkerError};

/// Client identifier
pub type ClientId = u64;

/// Snapshot of an open client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    /// Client ID
    pub id: ClientId,
    /// Current URL
    pub url: String,
    /// Whether focused
    pub focused: bool,
    /// Cache generation of the worker controlling this client
    pub controller: Option<String>,
}

/// Client operations provided by the host.
#[async_trait]
pub trait ClientHost: Send + Sync {
    /// Take control of every open client. Returns how many were claimed.
    async fn claim(&self, controller: &str) -> Result<usize>;

    /// All open window clients.
    async fn match_all(&self) -> Result<Vec<ClientInfo>>;

    /// Focus an existing client.
    async fn focus(&self, id: ClientId) -> Result<ClientInfo>;

    /// Open a new window at `url`.
    async fn open_window(&self, url: &str) -> Result<ClientInfo>;
}

struct ClientsInner {
    next_id: ClientId,
    clients: Vec<ClientInfo>,
}

/// In-memory window registry.
pub struct MemoryClients {
    inner: Mutex<ClientsInner>,
}

impl MemoryClients {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(ClientsInner {
                next_id: 1,
                clients: Vec::new(),
            }),
        }
    }

    /// Register an uncontrolled window (a page load before any worker).
    pub fn add_window(&self, url: &str) -> ClientId {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.clients.push(ClientInfo {
            id,
            url: url.to_string(),
            focused: false,
            controller: None,
        });
        id
    }

    /// Register a window already controlled by `controller`.
    pub fn add_controlled_window(&self, url: &str, controller: &str) -> ClientId {
        let id = self.add_window(url);
        if let Some(client) = self.inner.lock().clients.iter_mut().find(|c| c.id == id) {
            client.controller = Some(controller.to_string());
        }
        id
    }

    /// Close a window
    pub fn remove(&self, id: ClientId) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.clients.len();
        inner.clients.retain(|c| c.id != id);
        inner.clients.len() != before
    }

    /// Get a client by ID
    pub fn get(&self, id: ClientId) -> Option<ClientInfo> {
        self.inner.lock().clients.iter().find(|c| c.id == id).cloned()
    }

    /// All clients
    pub fn all(&self) -> Vec<ClientInfo> {
        self.inner.lock().clients.clone()
    }

    /// Number of clients controlled by `controller`.
    pub fn controlled_by(&self, controller: &str) -> usize {
        self.inner
            .lock()
            .clients
            .iter()
            .filter(|c| c.controller.as_deref() == Some(controller))
            .count()
    }
}

impl Default for MemoryClients {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClientHost for MemoryClients {
    async fn claim(&self, controller: &str) -> Result<usize> {
        let mut inner = self.inner.lock();
        for client in inner.clients.iter_mut() {
            client.controller = Some(controller.to_string());
        }
        Ok(inner.clients.len())
    }

    async fn match_all(&self) -> Result<Vec<ClientInfo>> {
        Ok(self.all())
    }

    async fn focus(&self, id: ClientId) -> Result<ClientInfo> {
        let mut inner = self.inner.lock();
        if !inner.clients.iter().any(|c| c.id == id) {
            return Err(WorkerError::Client(alloc::format!("no client with id {}", id)));
        }
        let mut focused = None;
        for client in inner.clients.iter_mut() {
            client.focused = client.id == id;
            if client.focused {
                focused = Some(client.clone());
            }
        }
        focused.ok_or_else(|| WorkerError::Client(alloc::format!("no client with id {}", id)))
    }

    async fn open_window(&self, url: &str) -> Result<ClientInfo> {
        let id = self.add_window(url);
        self.focus(id).await
    }
}
