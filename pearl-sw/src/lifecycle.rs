//! Worker Lifecycle
//!
//! State machine of one deployed worker:
//!
//! ```text
//! Parsed → Installing → Waiting → Activating → Active
//!              │                      │          │
//!              └──────────────────────┴──────────┴──→ Redundant
//! ```
//!
//! A failed install or activation, or being superseded by a newer worker,
//! ends in `Redundant`.

use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Result, WorkerError};

/// Worker ID counter
static NEXT_WORKER_ID: AtomicU64 = AtomicU64::new(1);

/// Worker ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(u64);

impl WorkerId {
    /// Create a new unique ID
    pub fn new() -> Self {
        Self(NEXT_WORKER_ID.fetch_add(1, Ordering::SeqCst))
    }

    /// Get raw value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for WorkerId {
    fn default() -> Self {
        Self::new()
    }
}

/// Worker states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkerState {
    /// Script evaluated, nothing run yet
    #[default]
    Parsed,
    /// Install handler running
    Installing,
    /// Installed, waiting to activate
    Waiting,
    /// Activate handler running
    Activating,
    /// Controlling pages and intercepting fetches
    Active,
    /// Failed or superseded
    Redundant,
}

/// A recorded state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub from: WorkerState,
    pub to: WorkerState,
}

/// Check if a state transition is valid
pub fn is_valid_transition(from: WorkerState, to: WorkerState) -> bool {
    use WorkerState::*;

    matches!(
        (from, to),
        (Parsed, Installing)
            | (Installing, Waiting)
            | (Installing, Redundant) // install failed
            | (Waiting, Activating)
            | (Waiting, Redundant) // replaced while waiting
            | (Activating, Active)
            | (Activating, Redundant) // activate failed
            | (Active, Redundant) // superseded
    )
}

/// State tracker for one worker.
#[derive(Debug, Clone, Default)]
pub struct Lifecycle {
    state: WorkerState,
    history: Vec<StateChange>,
}

impl Lifecycle {
    /// Start in `Parsed`
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Transitions taken so far
    pub fn history(&self) -> &[StateChange] {
        &self.history
    }

    /// Move to `to`, rejecting transitions the state machine does not allow.
    pub fn transition(&mut self, to: WorkerState) -> Result<StateChange> {
        let from = self.state;
        if !is_valid_transition(from, to) {
            return Err(WorkerError::InvalidStateTransition { from, to });
        }

        self.state = to;
        let change = StateChange { from, to };
        self.history.push(change);
        log::debug!("[Pearl SW] State {:?} -> {:?}", from, to);
        Ok(change)
    }

    /// Whether the worker serves fetches
    pub fn is_active(&self) -> bool {
        self.state == WorkerState::Active
    }

    /// Whether the worker is waiting to activate
    pub fn is_waiting(&self) -> bool {
        self.state == WorkerState::Waiting
    }

    /// Whether the worker is done for good
    pub fn is_redundant(&self) -> bool {
        self.state == WorkerState::Redundant
    }
}
