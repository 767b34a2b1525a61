//! Worker Events
//!
//! Events the host dispatches to the worker and the outcomes it gets back.
//! A host binding converts its native events into [`WorkerEvent`] and must
//! drive the returned future to completion before recycling the worker.

use alloc::vec::Vec;

use crate::fetch::Request;
use crate::handlers::SyncAction;
use crate::notification::Notification;
use crate::sync::SyncEvent;
use crate::worker::{ActivateReport, ClickOutcome, FetchOutcome, InstallReport};

/// Push event data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushEvent {
    data: Option<Vec<u8>>,
}

impl PushEvent {
    /// Create new push event
    pub fn new(data: Option<Vec<u8>>) -> Self {
        Self { data }
    }

    /// Push event carrying a text payload
    pub fn with_text(text: &str) -> Self {
        Self::new(Some(text.as_bytes().to_vec()))
    }

    /// Get data
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// Get data as text
    pub fn text(&self) -> Option<&str> {
        self.data
            .as_deref()
            .and_then(|d| core::str::from_utf8(d).ok())
    }
}

/// Notification click event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationClickEvent {
    /// The clicked notification
    pub notification: Notification,
}

impl NotificationClickEvent {
    /// Click on the notification body
    pub fn new(notification: Notification) -> Self {
        Self { notification }
    }
}

/// Event dispatched to the worker
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch(Request),
    Push(PushEvent),
    NotificationClick(NotificationClickEvent),
    Sync(SyncEvent),
}

/// Result of handling a [`WorkerEvent`]
#[derive(Debug, Clone)]
pub enum EventOutcome {
    Installed(InstallReport),
    Activated(ActivateReport),
    Fetched(FetchOutcome),
    NotificationShown(Notification),
    NotificationClicked(ClickOutcome),
    Synced(SyncAction),
}
