//! Offline Worker
//!
//! Async executors for the lifecycle hooks. Each `handle_*` method asks
//! [`crate::handlers`] for a plan and applies it to the injected [`Host`].
//! The returned future covers every asynchronous step of the event; the host
//! must await it before recycling the worker.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use futures_util::future::join_all;

use crate::cache::CacheStorage;
use crate::clients::{ClientHost, ClientInfo};
use crate::config::{InstallMode, WorkerConfig};
use crate::error::{NetworkError, Result, WorkerError};
use crate::events::{EventOutcome, NotificationClickEvent, PushEvent, WorkerEvent};
use crate::fetch::{Network, Request, Response};
use crate::handlers::{self, Fallback, FetchDecision, SyncAction};
use crate::lifecycle::WorkerId;
use crate::notification::{Notification, NotificationHost};
use crate::sync::{NoopSync, SyncEvent, SyncHook};

/// Host capabilities injected into the worker.
#[derive(Clone)]
pub struct Host {
    pub caches: Arc<dyn CacheStorage>,
    pub network: Arc<dyn Network>,
    pub notifications: Arc<dyn NotificationHost>,
    pub clients: Arc<dyn ClientHost>,
    pub sync: Arc<dyn SyncHook>,
}

impl Host {
    /// Bundle host capabilities; background sync defaults to [`NoopSync`].
    pub fn new(
        caches: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
        notifications: Arc<dyn NotificationHost>,
        clients: Arc<dyn ClientHost>,
    ) -> Self {
        Self {
            caches,
            network,
            notifications,
            clients,
            sync: Arc::new(NoopSync),
        }
    }

    /// Replace the background sync hook.
    pub fn with_sync_hook(mut self, hook: Arc<dyn SyncHook>) -> Self {
        self.sync = hook;
        self
    }
}

/// Outcome of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Generation populated
    pub cache_name: String,
    /// URLs stored
    pub cached: Vec<String>,
    /// Worker asked to skip the waiting phase
    pub skip_waiting: bool,
}

/// Outcome of activation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivateReport {
    /// Stale generations removed
    pub deleted: Vec<String>,
    /// Stale generations that could not be removed
    pub failed: Vec<String>,
    /// Clients now controlled
    pub claimed: usize,
}

/// Where a fetch response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Cache,
    Network,
    OfflineFallback,
}

/// Result of a fetch event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Not intercepted; the host performs the request itself
    Passthrough,
    /// The worker answered
    Responded {
        response: Response,
        source: ResponseSource,
    },
    /// Intercepted but no response could be produced
    Failed(NetworkError),
}

impl FetchOutcome {
    /// The response, if one was produced.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::Responded { response, .. } => Some(response),
            _ => None,
        }
    }

    /// The response source, if one was produced.
    pub fn source(&self) -> Option<ResponseSource> {
        match self {
            Self::Responded { source, .. } => Some(*source),
            _ => None,
        }
    }
}

/// Result of a notification click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Notification closed, nothing to open
    Closed,
    /// An open client was focused
    Focused(ClientInfo),
    /// A new window was opened
    Opened(ClientInfo),
}

/// One deployed worker: configuration plus host capabilities.
pub struct OfflineWorker {
    id: WorkerId,
    config: WorkerConfig,
    host: Host,
}

impl OfflineWorker {
    /// Create a worker for `config`.
    pub fn new(config: WorkerConfig, host: Host) -> Self {
        Self {
            id: WorkerId::new(),
            config,
            host,
        }
    }

    /// Get the worker ID
    pub fn id(&self) -> WorkerId {
        self.id
    }

    /// Get the configuration
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Name of the generation this worker serves from
    pub fn cache_name(&self) -> &str {
        &self.config.cache_name
    }

    /// Dispatch an event to its handler.
    pub async fn dispatch(&self, event: WorkerEvent) -> Result<EventOutcome> {
        let outcome = match event {
            WorkerEvent::Install => EventOutcome::Installed(self.handle_install().await?),
            WorkerEvent::Activate => EventOutcome::Activated(self.handle_activate().await?),
            WorkerEvent::Fetch(request) => EventOutcome::Fetched(self.handle_fetch(&request).await),
            WorkerEvent::Push(event) => {
                EventOutcome::NotificationShown(self.handle_push(&event).await?)
            }
            WorkerEvent::NotificationClick(event) => {
                EventOutcome::NotificationClicked(self.handle_notification_click(&event).await?)
            }
            WorkerEvent::Sync(event) => EventOutcome::Synced(self.handle_sync(&event).await?),
        };
        Ok(outcome)
    }

    /// Populate the cache generation from the manifest.
    ///
    /// Any failed asset fails the install. In best-effort mode entries
    /// written before the failure stay in the cache; a retry repopulates the
    /// whole manifest.
    pub async fn handle_install(&self) -> Result<InstallReport> {
        let plan = handlers::on_install(&self.config);
        log::info!(
            "[Pearl SW] Installing {} ({} assets)",
            plan.cache_name,
            plan.urls.len()
        );

        let caches = &self.host.caches;
        match plan.mode {
            InstallMode::BestEffort => {
                caches.open(&plan.cache_name).await?;
                for url in &plan.urls {
                    let response = self.fetch_asset(url).await?;
                    caches.put(&plan.cache_name, url, response).await?;
                }
            }
            InstallMode::Staged => {
                let mut staged = Vec::with_capacity(plan.urls.len());
                for url in &plan.urls {
                    staged.push((url, self.fetch_asset(url).await?));
                }
                caches.open(&plan.cache_name).await?;
                for (url, response) in staged {
                    caches.put(&plan.cache_name, url, response).await?;
                }
            }
        }

        log::info!("[Pearl SW] Cached static assets in {}", plan.cache_name);
        Ok(InstallReport {
            cache_name: plan.cache_name,
            cached: plan.urls,
            skip_waiting: plan.skip_waiting,
        })
    }

    async fn fetch_asset(&self, url: &str) -> Result<Response> {
        let response = self
            .host
            .network
            .fetch(&Request::get(url))
            .await
            .map_err(|err| {
                log::error!("[Pearl SW] Failed to cache {}: {}", url, err);
                WorkerError::from(err)
            })?;

        if !response.ok() {
            log::error!(
                "[Pearl SW] Failed to cache {}: status {}",
                url,
                response.status
            );
            return Err(WorkerError::BadStatus {
                url: url.into(),
                status: response.status,
            });
        }
        Ok(response)
    }

    /// Delete stale generations, then claim open clients.
    ///
    /// Storage and claim errors are logged; activation still completes.
    pub async fn handle_activate(&self) -> Result<ActivateReport> {
        log::info!("[Pearl SW] Activating {}", self.config.cache_name);

        let caches = &self.host.caches;
        let existing = match caches.keys().await {
            Ok(names) => names,
            Err(err) => {
                log::warn!("[Pearl SW] Could not list caches: {}", err);
                Vec::new()
            }
        };

        let plan = handlers::on_activate(&self.config, &existing);
        let results = join_all(plan.delete.iter().map(|name| async move {
            log::info!("[Pearl SW] Deleting old cache {}", name);
            (name, caches.delete(name).await)
        }))
        .await;

        let mut report = ActivateReport::default();
        for (name, result) in results {
            match result {
                Ok(_) => report.deleted.push(name.clone()),
                Err(err) => {
                    log::warn!("[Pearl SW] Could not delete cache {}: {}", name, err);
                    report.failed.push(name.clone());
                }
            }
        }

        if plan.claim {
            match self.host.clients.claim(&plan.keep).await {
                Ok(claimed) => report.claimed = claimed,
                Err(err) => log::warn!("[Pearl SW] Could not claim clients: {}", err),
            }
        }
        Ok(report)
    }

    /// Serve a request: cache, then network, then the offline fallback.
    pub async fn handle_fetch(&self, request: &Request) -> FetchOutcome {
        let plan = match handlers::on_fetch(&self.config, request) {
            FetchDecision::Passthrough(reason) => {
                log::debug!(
                    "[Pearl SW] Not intercepting {} {} ({:?})",
                    request.method.as_str(),
                    request.url,
                    reason
                );
                return FetchOutcome::Passthrough;
            }
            FetchDecision::Intercept(plan) => plan,
        };

        match self.host.caches.match_url(&plan.cache_name, &plan.key).await {
            Ok(Some(response)) => {
                log::debug!("[Pearl SW] Cache hit {}", plan.key);
                return FetchOutcome::Responded {
                    response,
                    source: ResponseSource::Cache,
                };
            }
            Ok(None) => {}
            Err(err) => log::warn!("[Pearl SW] Cache lookup failed for {}: {}", plan.key, err),
        }

        match self.host.network.fetch(request).await {
            Ok(response) => FetchOutcome::Responded {
                response,
                source: ResponseSource::Network,
            },
            Err(err) => {
                log::error!("[Pearl SW] Fetch failed: {}", err);
                match plan.fallback {
                    Fallback::OfflineDocument => FetchOutcome::Responded {
                        response: handlers::offline_response(&self.config),
                        source: ResponseSource::OfflineFallback,
                    },
                    Fallback::None => FetchOutcome::Failed(err),
                }
            }
        }
    }

    /// Show a notification for a push message.
    pub async fn handle_push(&self, event: &PushEvent) -> Result<Notification> {
        let plan = handlers::on_push(&self.config, event.data());
        log::debug!("[Pearl SW] Push notification: {}", plan.title);
        self.host.notifications.show(&plan.title, plan.options).await
    }

    /// Close the notification and focus or open its target URL.
    pub async fn handle_notification_click(
        &self,
        event: &NotificationClickEvent,
    ) -> Result<ClickOutcome> {
        let plan = handlers::on_notification_click(&self.config, &event.notification);

        if let Err(err) = self.host.notifications.close(plan.close).await {
            log::warn!("[Pearl SW] Could not close notification: {}", err);
        }

        let Some(target) = plan.target else {
            return Ok(ClickOutcome::Closed);
        };

        let clients = self.host.clients.match_all().await?;
        match clients.iter().find(|c| c.url == target) {
            Some(client) => Ok(ClickOutcome::Focused(
                self.host.clients.focus(client.id).await?,
            )),
            None => Ok(ClickOutcome::Opened(
                self.host.clients.open_window(&target).await?,
            )),
        }
    }

    /// Run the sync hook for the recognised tag.
    pub async fn handle_sync(&self, event: &SyncEvent) -> Result<SyncAction> {
        let action = handlers::on_sync(&self.config, &event.tag);
        if action == SyncAction::Run {
            log::info!("[Pearl SW] Background sync triggered");
            self.host.sync.run(event).await?;
        }
        Ok(action)
    }
}
