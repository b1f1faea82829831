//! The cache proxy object and its lifecycle state machine.
//!
//! The host drives the proxy through explicit method calls — `install`,
//! `activate`, `handle_fetch` — rather than hidden event registration, so
//! the state machine is directly testable. No request is classified or
//! executed before the proxy reaches `Serving`.

use std::sync::{Arc, Mutex};

use overcast_client::{Fetcher, ResourceRequest};
use overcast_core::{AppConfig, Error, Generation, GenerationManager, GenerationStore};

use crate::policy::{self, Policy};
use crate::seeder;
use crate::strategy::{self, ProxyResponse};
use crate::sweeper;
use crate::writeback::WriteQueue;

/// Proxy lifecycle states.
///
/// `Installing -> Installed` requires the seeder to succeed; a seeder
/// failure loops back to `Uninstalled`. `Activating -> Serving` requires the
/// sweeper to finish retiring stale generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyState {
    Uninstalled,
    Installing,
    Installed,
    Activating,
    Serving,
}

/// Intercepts a client's outbound requests and serves them from the network
/// and/or the current cache generation.
pub struct CacheProxy {
    manager: GenerationManager,
    fetcher: Arc<dyn Fetcher>,
    writes: WriteQueue,
    config: AppConfig,
    origin: url::Url,
    state: Mutex<ProxyState>,
    current: Mutex<Option<Generation>>,
}

impl CacheProxy {
    /// Build a proxy over an injected store and fetcher. Spawns the
    /// write-behind worker; the proxy starts `Uninstalled`.
    pub fn new(store: Arc<dyn GenerationStore>, fetcher: Arc<dyn Fetcher>, config: AppConfig) -> Result<Self, Error> {
        let origin = url::Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(format!("origin: {e}")))?;

        Ok(Self {
            manager: GenerationManager::new(store),
            fetcher,
            writes: WriteQueue::spawn(),
            config,
            origin,
            state: Mutex::new(ProxyState::Uninstalled),
            current: Mutex::new(None),
        })
    }

    pub fn state(&self) -> ProxyState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The generation name this proxy installs and serves.
    pub fn generation_name(&self) -> String {
        self.config.generation_name()
    }

    pub fn write_queue(&self) -> &WriteQueue {
        &self.writes
    }

    fn set_state(&self, to: ProxyState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = to;
    }

    fn transition(&self, from: ProxyState, to: ProxyState) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if *state != from {
            return Err(Error::Lifecycle(format!("expected {from:?}, proxy is {:?}", *state)));
        }
        *state = to;
        Ok(())
    }

    /// Create the configured generation and seed it with the core assets.
    ///
    /// The host must wait for this to settle before treating the proxy as
    /// installed. On any seeding failure the proxy returns to `Uninstalled`
    /// and the caller decides whether to retry the whole install or abort.
    pub async fn install(&self) -> Result<(), Error> {
        self.transition(ProxyState::Uninstalled, ProxyState::Installing)?;

        let name = self.config.generation_name();
        tracing::info!("installing generation {}", name);

        match self.install_inner(&name).await {
            Ok(generation) => {
                *self.current.lock().unwrap_or_else(|e| e.into_inner()) = Some(generation);
                self.set_state(ProxyState::Installed);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("install of {} failed: {}", name, e);
                self.set_state(ProxyState::Uninstalled);
                Err(e)
            }
        }
    }

    async fn install_inner(&self, name: &str) -> Result<Generation, Error> {
        let generation = self.manager.create(name).await?;
        seeder::seed(
            Arc::clone(&self.fetcher),
            &generation,
            &self.origin,
            &self.config.core_assets,
            self.config.seed_concurrency as usize,
        )
        .await?;
        Ok(generation)
    }

    /// Retire every other generation and promote this one to serve live
    /// traffic.
    ///
    /// Returns the number of generations retired. The host must wait for
    /// completion before routing traffic through this proxy instance; on a
    /// sweep failure the proxy returns to `Installed` so activation can be
    /// retried.
    pub async fn activate(&self) -> Result<usize, Error> {
        self.transition(ProxyState::Installed, ProxyState::Activating)?;

        let name = self.config.generation_name();
        match sweeper::sweep(&self.manager, &name).await {
            Ok(deleted) => {
                self.set_state(ProxyState::Serving);
                tracing::info!("serving generation {}", name);
                Ok(deleted)
            }
            Err(e) => {
                tracing::warn!("activation sweep for {} failed: {}", name, e);
                self.set_state(ProxyState::Installed);
                Err(e)
            }
        }
    }

    /// Classify and execute one intercepted request.
    ///
    /// Always resolves to a response or a propagated error. Non-idempotent
    /// methods never touch the cache and pass straight through to the
    /// network.
    pub async fn handle_fetch(&self, request: &ResourceRequest) -> Result<ProxyResponse, Error> {
        let state = self.state();
        if state != ProxyState::Serving {
            return Err(Error::Lifecycle(format!("cannot serve requests while {state:?}")));
        }

        let generation = self
            .current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or_else(|| Error::Lifecycle("no current generation".into()))?;

        if !request.is_idempotent() {
            let response = self.fetcher.fetch(request).await?;
            return Ok(ProxyResponse::from_network(response));
        }

        match policy::classify(request) {
            Policy::NetworkFirst => {
                strategy::network_first(self.fetcher.as_ref(), &generation, &self.writes, request).await
            }
            Policy::CacheFirst => strategy::cache_first(self.fetcher.as_ref(), &generation, request).await,
        }
    }
}
