//! Lifecycle Hooks
//!
//! Pure planning functions, one per event. Each takes the worker
//! configuration plus the event and returns a description of the effects to
//! perform; [`crate::worker::OfflineWorker`] carries the plans out against
//! the host. Nothing here touches storage, network or clients.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::config::{InstallMode, WorkerConfig};
use crate::fetch::{cache_key, Method, Request, Response};
use crate::notification::{Notification, NotificationData, NotificationOptions, PushPayload};

/// What install must do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan {
    /// Generation to populate
    pub cache_name: String,
    /// Absolute asset URLs, in manifest order, without duplicates
    pub urls: Vec<String>,
    /// Population mode
    pub mode: InstallMode,
    /// Ask the host to activate without waiting
    pub skip_waiting: bool,
}

/// Plan the install event.
pub fn on_install(config: &WorkerConfig) -> InstallPlan {
    let mut urls: Vec<String> = Vec::with_capacity(config.manifest.len());
    for entry in &config.manifest {
        let url = config.origin.resolve(entry);
        if !urls.contains(&url) {
            urls.push(url);
        }
    }

    InstallPlan {
        cache_name: config.cache_name.clone(),
        urls,
        mode: config.install_mode,
        skip_waiting: config.skip_waiting,
    }
}

/// What activate must do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivatePlan {
    /// Generation that stays
    pub keep: String,
    /// Stale generations to delete
    pub delete: Vec<String>,
    /// Claim open clients afterwards
    pub claim: bool,
}

/// Plan the activate event given the cache names that currently exist.
pub fn on_activate(config: &WorkerConfig, existing: &[String]) -> ActivatePlan {
    ActivatePlan {
        keep: config.cache_name.clone(),
        delete: existing
            .iter()
            .filter(|name| **name != config.cache_name)
            .cloned()
            .collect(),
        claim: true,
    }
}

/// Why a request is left to the network untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassReason {
    /// Only GET is intercepted
    NonGet(Method),
    /// URL belongs to another origin
    CrossOrigin,
}

/// What to answer when the network fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Synthetic offline document
    OfflineDocument,
    /// No response; the load fails
    None,
}

/// How an intercepted request is served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptPlan {
    /// Generation to look in
    pub cache_name: String,
    /// Cache key
    pub key: String,
    /// Network-failure behaviour
    pub fallback: Fallback,
}

/// Fetch decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchDecision {
    /// Do not intercept
    Passthrough(PassReason),
    /// Cache first, then network, then fallback
    Intercept(InterceptPlan),
}

/// Plan a fetch event.
pub fn on_fetch(config: &WorkerConfig, request: &Request) -> FetchDecision {
    if request.method != Method::Get {
        return FetchDecision::Passthrough(PassReason::NonGet(request.method));
    }
    if !config.origin.contains(&request.url) {
        return FetchDecision::Passthrough(PassReason::CrossOrigin);
    }

    let fallback = if request.destination.is_navigation() {
        Fallback::OfflineDocument
    } else {
        Fallback::None
    };

    FetchDecision::Intercept(InterceptPlan {
        cache_name: config.cache_name.clone(),
        key: cache_key(&request.url).to_string(),
        fallback,
    })
}

/// The synthetic document served to offline navigations.
pub fn offline_response(config: &WorkerConfig) -> Response {
    Response::html(&config.offline_page)
}

/// Notification to show for a push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPlan {
    pub title: String,
    pub options: NotificationOptions,
}

/// Plan a push event. Absent or malformed data falls back to defaults.
pub fn on_push(config: &WorkerConfig, data: Option<&[u8]>) -> NotificationPlan {
    let payload = PushPayload::parse(data);
    let defaults = &config.notification;

    NotificationPlan {
        title: payload.title.unwrap_or_else(|| defaults.title.clone()),
        options: NotificationOptions {
            body: payload.body.unwrap_or_else(|| defaults.body.clone()),
            icon: defaults.icon.clone(),
            badge: defaults.badge.clone(),
            vibrate: defaults.vibrate.clone(),
            data: NotificationData {
                url: payload.url.unwrap_or_else(|| defaults.url.clone()),
            },
        },
    }
}

/// What a notification click does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickPlan {
    /// Notification to close
    pub close: crate::notification::NotificationId,
    /// Absolute URL to focus or open
    pub target: Option<String>,
}

/// Plan a notification click.
pub fn on_notification_click(config: &WorkerConfig, notification: &Notification) -> ClickPlan {
    let url = &notification.options.data.url;
    ClickPlan {
        close: notification.id,
        target: (!url.is_empty()).then(|| config.origin.resolve(url)),
    }
}

/// What to do for a sync tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// Run the sync hook
    Run,
    /// Unknown tag
    Ignore,
}

/// Plan a sync event.
pub fn on_sync(config: &WorkerConfig, tag: &str) -> SyncAction {
    if tag == config.sync_tag {
        SyncAction::Run
    } else {
        SyncAction::Ignore
    }
}
