//! Test harness
//!
//! Host doubles the scenarios drive the worker through.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use async_trait::async_trait;
use core::future::Future;
use hashbrown::HashMap;
use spin::Mutex;

use pearl_sw::{
    DeployOutcome, FetchOutcome, Host, MemoryCacheStorage, MemoryClients, Network, NetworkError,
    NotificationCenter, Registration, Request, Response, WorkerConfig,
};

use crate::fixtures::PearlFixtures;

/// Drive a future to completion on the current thread.
pub fn run<F: Future>(future: F) -> F::Output {
    futures::executor::block_on(future)
}

struct NetworkState {
    online: bool,
    routes: HashMap<String, Response>,
    log: Vec<Request>,
}

/// Network serving canned responses by URL.
///
/// Unknown URLs answer 404. While offline every fetch fails with
/// [`NetworkError::Offline`]. Every request is logged, online or not.
pub struct ScriptedNetwork {
    state: Mutex<NetworkState>,
}

impl ScriptedNetwork {
    /// Online network with no routes
    pub fn new() -> Self {
        Self {
            state: Mutex::new(NetworkState {
                online: true,
                routes: HashMap::new(),
                log: Vec::new(),
            }),
        }
    }

    /// Serve `response` for `url`
    pub fn route(&self, url: &str, response: Response) {
        self.state
            .lock()
            .routes
            .insert(url.to_string(), response.with_url(url));
    }

    /// Switch connectivity
    pub fn set_online(&self, online: bool) {
        self.state.lock().online = online;
    }

    /// Requests seen so far
    pub fn requests(&self) -> Vec<Request> {
        self.state.lock().log.clone()
    }

    /// Number of requests seen so far
    pub fn request_count(&self) -> usize {
        self.state.lock().log.len()
    }

    /// Forget logged requests
    pub fn clear_log(&self) {
        self.state.lock().log.clear();
    }
}

impl Default for ScriptedNetwork {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        let mut state = self.state.lock();
        state.log.push(request.clone());
        if !state.online {
            return Err(NetworkError::Offline);
        }
        Ok(state
            .routes
            .get(&request.url)
            .cloned()
            .unwrap_or_else(|| Response::new(404).with_url(request.url.clone())))
    }
}

/// Browser stand-in: host doubles plus the registration they back.
pub struct TestHost {
    pub caches: Arc<MemoryCacheStorage>,
    pub network: Arc<ScriptedNetwork>,
    pub notifications: Arc<NotificationCenter>,
    pub clients: Arc<MemoryClients>,
    pub registration: Registration,
}

impl TestHost {
    /// Fresh host whose network serves the storefront's assets.
    pub fn new() -> Self {
        let network = ScriptedNetwork::new();
        PearlFixtures::serve_site(&network);
        Self::with_network(network)
    }

    /// Fresh host over the given network
    pub fn with_network(network: ScriptedNetwork) -> Self {
        Self::with_parts(network, MemoryCacheStorage::new())
    }

    /// Storefront host over the given cache storage
    pub fn with_storage(caches: MemoryCacheStorage) -> Self {
        let network = ScriptedNetwork::new();
        PearlFixtures::serve_site(&network);
        Self::with_parts(network, caches)
    }

    fn with_parts(network: ScriptedNetwork, caches: MemoryCacheStorage) -> Self {
        let caches = Arc::new(caches);
        let network = Arc::new(network);
        let notifications = Arc::new(NotificationCenter::new());
        let clients = Arc::new(MemoryClients::new());
        let host = Host::new(
            caches.clone(),
            network.clone(),
            notifications.clone(),
            clients.clone(),
        );

        Self {
            caches,
            network,
            notifications,
            clients,
            registration: Registration::new(host),
        }
    }

    /// Deploy `config` under a script named after its cache generation and
    /// panic unless it activates.
    pub fn install(&mut self, config: WorkerConfig) {
        let script = PearlFixtures::script_for(&config);
        let outcome = run(self.registration.deploy(&script, config));
        match outcome {
            Ok(DeployOutcome::Activated(_)) => {}
            other => panic!("worker did not activate: {:?}", other),
        }
    }

    /// GET `path` on the storefront origin
    pub fn get(&self, path: &str) -> FetchOutcome {
        run(self.registration.fetch(&Request::get(PearlFixtures::url(path))))
    }

    /// Navigate to `path` on the storefront origin
    pub fn navigate(&self, path: &str) -> FetchOutcome {
        run(self.registration.fetch(&Request::navigate(PearlFixtures::url(path))))
    }
}

impl Default for TestHost {
    fn default() -> Self {
        Self::new()
    }
}
