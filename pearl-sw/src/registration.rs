//! Worker Registration
//!
//! Drives the lifecycle the way a browser does for one scope: a newly
//! deployed script installs, waits, then activates and replaces the
//! previous worker. At most one worker is active and at most one waits.
//! Functional events are routed to the active worker.

use alloc::string::String;
use alloc::vec::Vec;

use crate::config::WorkerConfig;
use crate::error::{Result, WorkerError};
use crate::events::{NotificationClickEvent, PushEvent};
use crate::fetch::Request;
use crate::lifecycle::{Lifecycle, WorkerId, WorkerState};
use crate::notification::Notification;
use crate::sync::{SyncRegistry, SyncState};
use crate::worker::{ActivateReport, ClickOutcome, FetchOutcome, Host, OfflineWorker};

/// Result of deploying a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    /// Byte-identical to the current script; nothing happened
    Unchanged,
    /// Install failed; the new worker is redundant
    Rejected(WorkerError),
    /// Installed and waiting for activation
    Waiting(WorkerId),
    /// Installed and activated immediately
    Activated(ActivateReport),
}

struct WorkerRecord {
    worker: OfflineWorker,
    lifecycle: Lifecycle,
    script: Vec<u8>,
}

impl WorkerRecord {
    fn retire(mut self, retired: &mut Vec<WorkerId>) {
        if let Err(err) = self.lifecycle.transition(WorkerState::Redundant) {
            log::warn!("[Pearl SW] Could not retire worker: {}", err);
        }
        retired.push(self.worker.id());
    }
}

/// Service worker registration for one origin.
pub struct Registration {
    host: Host,
    waiting: Option<WorkerRecord>,
    active: Option<WorkerRecord>,
    retired: Vec<WorkerId>,
    sync: SyncRegistry,
}

impl Registration {
    /// Create an empty registration
    pub fn new(host: Host) -> Self {
        Self {
            host,
            waiting: None,
            active: None,
            retired: Vec::new(),
            sync: SyncRegistry::new(),
        }
    }

    /// Host capabilities shared by every worker
    pub fn host(&self) -> &Host {
        &self.host
    }

    /// The worker serving events
    pub fn active(&self) -> Option<&OfflineWorker> {
        self.active.as_ref().map(|r| &r.worker)
    }

    /// The installed worker waiting to activate
    pub fn waiting(&self) -> Option<&OfflineWorker> {
        self.waiting.as_ref().map(|r| &r.worker)
    }

    /// State of the active worker
    pub fn active_state(&self) -> Option<WorkerState> {
        self.active.as_ref().map(|r| r.lifecycle.state())
    }

    /// State of the waiting worker
    pub fn waiting_state(&self) -> Option<WorkerState> {
        self.waiting.as_ref().map(|r| r.lifecycle.state())
    }

    /// Workers that failed or were superseded, oldest first
    pub fn retired(&self) -> &[WorkerId] {
        &self.retired
    }

    /// Pending background sync registrations
    pub fn sync_registry(&self) -> &SyncRegistry {
        &self.sync
    }

    /// Deploy a worker script with its configuration.
    ///
    /// A script identical to the newest one is ignored. Otherwise the new
    /// worker installs; on success it waits, or activates at once when it
    /// asks to skip waiting or nothing is active yet.
    pub async fn deploy(&mut self, script: &[u8], config: WorkerConfig) -> Result<DeployOutcome> {
        let newest = self.waiting.as_ref().or(self.active.as_ref());
        if newest.is_some_and(|r| r.script == script) {
            log::debug!("[Pearl SW] Script unchanged");
            return Ok(DeployOutcome::Unchanged);
        }
        config.validate()?;

        let mut record = WorkerRecord {
            worker: OfflineWorker::new(config, self.host.clone()),
            lifecycle: Lifecycle::new(),
            script: script.to_vec(),
        };
        record.lifecycle.transition(WorkerState::Installing)?;

        let report = match record.worker.handle_install().await {
            Ok(report) => report,
            Err(err) => {
                log::error!("[Pearl SW] Install failed: {}", err);
                record.retire(&mut self.retired);
                return Ok(DeployOutcome::Rejected(err));
            }
        };
        record.lifecycle.transition(WorkerState::Waiting)?;

        let id = record.worker.id();
        if let Some(replaced) = self.waiting.replace(record) {
            log::info!("[Pearl SW] Replacing waiting worker");
            replaced.retire(&mut self.retired);
        }

        if report.skip_waiting || self.active.is_none() {
            return self.activate_waiting().await.map(DeployOutcome::Activated);
        }
        Ok(DeployOutcome::Waiting(id))
    }

    /// Promote the waiting worker, retiring the current one.
    ///
    /// The current worker keeps serving until the new one is active.
    pub async fn activate_waiting(&mut self) -> Result<ActivateReport> {
        let mut record = self.waiting.take().ok_or(WorkerError::NoWaitingWorker)?;
        record.lifecycle.transition(WorkerState::Activating)?;

        match record.worker.handle_activate().await {
            Ok(report) => {
                record.lifecycle.transition(WorkerState::Active)?;
                log::info!("[Pearl SW] Worker {} active", record.worker.id().raw());
                if let Some(previous) = self.active.replace(record) {
                    previous.retire(&mut self.retired);
                }
                Ok(report)
            }
            Err(err) => {
                log::error!("[Pearl SW] Activation failed: {}", err);
                record.retire(&mut self.retired);
                Err(err)
            }
        }
    }

    /// Route a fetch. Without an active worker the request is not intercepted.
    pub async fn fetch(&self, request: &Request) -> FetchOutcome {
        match self.active() {
            Some(worker) => worker.handle_fetch(request).await,
            None => FetchOutcome::Passthrough,
        }
    }

    /// Route a push message.
    pub async fn push(&self, event: &PushEvent) -> Result<Notification> {
        self.active()
            .ok_or(WorkerError::NoActiveWorker)?
            .handle_push(event)
            .await
    }

    /// Route a notification click.
    pub async fn notification_click(&self, event: &NotificationClickEvent) -> Result<ClickOutcome> {
        self.active()
            .ok_or(WorkerError::NoActiveWorker)?
            .handle_notification_click(event)
            .await
    }

    /// Register a background sync tag. Returns `false` if already pending.
    pub fn register_sync(&mut self, tag: impl Into<String>) -> bool {
        self.sync.register(tag)
    }

    /// Fire every pending sync registration against the active worker.
    ///
    /// Returns each tag with the state it ended in.
    pub async fn fire_sync(&mut self) -> Result<Vec<(String, SyncState)>> {
        let worker = match self.active.as_ref() {
            Some(record) => &record.worker,
            None => return Err(WorkerError::NoActiveWorker),
        };

        let mut results = Vec::new();
        for event in self.sync.fire_pending() {
            let success = match worker.handle_sync(&event).await {
                Ok(_) => true,
                Err(err) => {
                    log::warn!("[Pearl Sync] {} failed: {}", event.tag, err);
                    false
                }
            };
            if let Some(state) = self.sync.complete(&event.tag, success) {
                results.push((event.tag, state));
            }
        }
        Ok(results)
    }
}
