//! Push Notifications
//!
//! Push payload parsing and the notification tray. The payload is JSON of
//! the form `{ "title"?: string, "body"?: string, "url"?: string }`; a missing,
//! empty or malformed payload falls back to the configured defaults.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use async_trait::async_trait;
use serde::Deserialize;
use spin::Mutex;

use crate::error::{Result, WorkerError};

/// Decoded push payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PushPayload {
    pub title: Option<String>,
    pub body: Option<String>,
    pub url: Option<String>,
}

impl PushPayload {
    /// Decode push data. Never fails: absent or malformed data yields an
    /// empty payload.
    pub fn parse(data: Option<&[u8]>) -> Self {
        let Some(bytes) = data else {
            log::debug!("[Pearl SW] Push without payload, using defaults");
            return Self::default();
        };

        match serde_json::from_slice::<Self>(bytes) {
            Ok(payload) => payload.without_empty_fields(),
            Err(err) => {
                log::warn!("[Pearl SW] Malformed push payload ({}), using defaults", err);
                Self::default()
            }
        }
    }

    // Empty strings count as absent.
    fn without_empty_fields(self) -> Self {
        fn keep(value: Option<String>) -> Option<String> {
            value.filter(|s| !s.is_empty())
        }
        Self {
            title: keep(self.title),
            body: keep(self.body),
            url: keep(self.url),
        }
    }
}

/// Data attached to a notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationData {
    /// Target URL opened on click
    pub url: String,
}

/// Options passed to `showNotification(title, options)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationOptions {
    /// Body text
    pub body: String,
    /// Icon URL
    pub icon: String,
    /// Badge URL
    pub badge: String,
    /// Vibration pattern
    pub vibrate: Vec<u32>,
    /// Attached data
    pub data: NotificationData,
}

/// Notification identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(pub u64);

/// A notification shown by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub options: NotificationOptions,
    pub closed: bool,
}

/// Permission state for the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationPermission {
    /// User hasn't been asked yet
    #[default]
    Default,
    /// User granted permission
    Granted,
    /// User denied permission
    Denied,
}

/// Notification display provided by the host.
#[async_trait]
pub trait NotificationHost: Send + Sync {
    /// Show a notification.
    async fn show(&self, title: &str, options: NotificationOptions) -> Result<Notification>;

    /// Close a notification.
    async fn close(&self, id: NotificationId) -> Result<()>;
}

struct Tray {
    next_id: u64,
    notifications: Vec<Notification>,
}

/// In-memory notification tray.
pub struct NotificationCenter {
    tray: Mutex<Tray>,
    permission: Mutex<NotificationPermission>,
}

impl NotificationCenter {
    /// Create a tray with permission granted.
    pub fn new() -> Self {
        Self::with_permission(NotificationPermission::Granted)
    }

    /// Create a tray with a given permission.
    pub fn with_permission(permission: NotificationPermission) -> Self {
        Self {
            tray: Mutex::new(Tray {
                next_id: 1,
                notifications: Vec::new(),
            }),
            permission: Mutex::new(permission),
        }
    }

    /// Change permission
    pub fn set_permission(&self, permission: NotificationPermission) {
        *self.permission.lock() = permission;
    }

    /// Get a notification by id
    pub fn get(&self, id: NotificationId) -> Option<Notification> {
        self.tray
            .lock()
            .notifications
            .iter()
            .find(|n| n.id == id)
            .cloned()
    }

    /// Notifications still open
    pub fn visible(&self) -> Vec<Notification> {
        self.tray
            .lock()
            .notifications
            .iter()
            .filter(|n| !n.closed)
            .cloned()
            .collect()
    }

    /// Every notification ever shown
    pub fn history(&self) -> Vec<Notification> {
        self.tray.lock().notifications.clone()
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationHost for NotificationCenter {
    async fn show(&self, title: &str, options: NotificationOptions) -> Result<Notification> {
        if *self.permission.lock() != NotificationPermission::Granted {
            return Err(WorkerError::Notification("permission not granted".to_string()));
        }

        let mut tray = self.tray.lock();
        let notification = Notification {
            id: NotificationId(tray.next_id),
            title: title.to_string(),
            options,
            closed: false,
        };
        tray.next_id += 1;
        tray.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn close(&self, id: NotificationId) -> Result<()> {
        let mut tray = self.tray.lock();
        match tray.notifications.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.closed = true;
                Ok(())
            }
            None => Err(WorkerError::Notification(alloc::format!(
                "unknown notification {}",
                id.0
            ))),
        }
    }
}
