//! Background Sync
//!
//! Pages register a sync tag while offline; the host fires the pending
//! registrations once connectivity returns. The worker only recognises its
//! configured tag (`background-sync`) and hands it to an injected
//! [`SyncHook`]. The default hook does nothing.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use async_trait::async_trait;

use crate::error::Result;

/// Attempts before a registration is marked failed.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Sync registration state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    /// Waiting for connectivity
    #[default]
    Pending,
    /// Sync event being dispatched
    Firing,
    /// Failed, will retry
    Reregistering,
    /// Completed successfully
    Success,
    /// Max retries exceeded
    Failed,
}

/// Sync registration
#[derive(Debug, Clone)]
pub struct SyncRegistration {
    tag: String,
    state: SyncState,
    retry_count: u32,
    max_retries: u32,
    last_chance: bool,
}

impl SyncRegistration {
    /// Create new registration
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            state: SyncState::Pending,
            retry_count: 0,
            max_retries: DEFAULT_MAX_RETRIES,
            last_chance: false,
        }
    }

    /// Get tag
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Get state
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Failed attempts so far
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Check if the next attempt is the last one
    pub fn last_chance(&self) -> bool {
        self.last_chance
    }

    fn mark_firing(&mut self) {
        self.state = SyncState::Firing;
    }

    /// Record a failure; the attempt after the last retry is the last chance.
    fn mark_failed(&mut self) {
        self.retry_count += 1;
        if self.retry_count + 1 >= self.max_retries {
            self.last_chance = true;
        }
        self.state = SyncState::Reregistering;
    }
}

/// Sync event delivered to the worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncEvent {
    /// Registration tag
    pub tag: String,
    /// Whether this is the last attempt
    pub last_chance: bool,
}

impl SyncEvent {
    /// Create new sync event
    pub fn new(tag: impl Into<String>, last_chance: bool) -> Self {
        Self {
            tag: tag.into(),
            last_chance,
        }
    }
}

/// Sync registrations for one registration scope.
#[derive(Debug, Default)]
pub struct SyncRegistry {
    registrations: BTreeMap<String, SyncRegistration>,
}

impl SyncRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tag. Returns `false` if it was already pending.
    pub fn register(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.registrations.contains_key(&tag) {
            return false;
        }
        self.registrations
            .insert(tag.clone(), SyncRegistration::new(tag));
        true
    }

    /// Get a registration by tag
    pub fn get(&self, tag: &str) -> Option<&SyncRegistration> {
        self.registrations.get(tag)
    }

    /// Registered tags
    pub fn tags(&self) -> Vec<String> {
        self.registrations.keys().cloned().collect()
    }

    /// Mark every pending registration as firing and return its event.
    pub fn fire_pending(&mut self) -> Vec<SyncEvent> {
        let mut events = Vec::new();

        for registration in self.registrations.values_mut() {
            if matches!(
                registration.state,
                SyncState::Pending | SyncState::Reregistering
            ) {
                registration.mark_firing();
                events.push(SyncEvent::new(
                    registration.tag.clone(),
                    registration.last_chance,
                ));
            }
        }

        events
    }

    /// Record the result of a fired registration.
    ///
    /// Successful registrations and failed last-chance attempts are removed;
    /// returns the final state.
    pub fn complete(&mut self, tag: &str, success: bool) -> Option<SyncState> {
        let registration = self.registrations.get_mut(tag)?;

        if success {
            self.registrations.remove(tag);
            return Some(SyncState::Success);
        }

        if registration.last_chance {
            log::warn!("[Pearl Sync] Giving up on {}", tag);
            self.registrations.remove(tag);
            return Some(SyncState::Failed);
        }

        registration.mark_failed();
        Some(registration.state)
    }
}

/// Extension point run for the recognised sync tag.
#[async_trait]
pub trait SyncHook: Send + Sync {
    /// Run the deferred offline work for `event`.
    async fn run(&self, event: &SyncEvent) -> Result<()>;
}

/// Hook that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSync;

#[async_trait]
impl SyncHook for NoopSync {
    async fn run(&self, event: &SyncEvent) -> Result<()> {
        log::debug!("[Pearl Sync] No work registered for {}", event.tag);
        Ok(())
    }
}
