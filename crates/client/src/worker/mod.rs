//! The request-interception worker.
//!
//! ### Lifecycle
//! - **install**: open (or create) the namespace for the current version and
//!   precache the manifest, then signal that activation need not wait.
//! - **activate**: reap every namespace from other versions, then claim
//!   already-open clients. Only after this does the worker serve requests.
//! - **intercept**: classify the request and run the matching strategy, or
//!   decline and let it go to the network untouched.
//!
//! Hosts (the MCP server, tests) drive a worker through [`ServiceWorker`].

pub mod classify;
pub mod precache;
pub mod reaper;
pub mod strategy;
pub mod writes;

use async_trait::async_trait;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tether_core::{AppConfig, CacheDb, Error, Namespace, Request, Response};
use url::{Origin, Url};

use crate::fetch::{Network, resolve};

pub use classify::{RequestClass, classify};
pub use precache::precache;
pub use reaper::reap;
pub use strategy::StrategyEngine;
pub use writes::PendingWrites;

/// Outcome of an intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intercept {
    Respond(Response),
    /// Do nothing; the request goes to the network as if never intercepted.
    Decline,
}

/// The three entry points a host platform calls.
#[async_trait]
pub trait ServiceWorker: Send + Sync {
    /// Runs once per deployed version. The host must not proceed until it
    /// returns.
    async fn on_install(&self) -> Result<(), Error>;

    /// Runs once after install. The host must not deliver requests until it
    /// returns.
    async fn on_activate(&self) -> Result<(), Error>;

    async fn on_intercept(&self, request: Request) -> Intercept;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
}

/// Snapshot of a worker's lifecycle for hosts and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct WorkerStatus {
    pub version: String,
    pub namespace: String,
    pub origin: String,
    pub state: LifecycleState,
    pub skip_waiting: bool,
    pub clients_claimed: bool,
    pub pending_writes: usize,
}

/// Resolved worker settings: the version constant and the URLs the
/// strategies fall back to.
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub version: String,
    pub namespace: String,
    pub origin: Url,
    pub manifest: Vec<Url>,
    pub offline_url: Url,
    pub fallback_image_url: Url,
}

impl WorkerSettings {
    /// Resolve manifest and fallback paths against the configured origin.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let origin = Url::parse(&config.origin)?;
        let at = |path: &str| resolve(&origin, path).map_err(|e| Error::InvalidUrl(format!("{path}: {e}")));

        let manifest = config.precache.iter().map(|p| at(p)).collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            version: config.cache_version.clone(),
            namespace: config.namespace_name(),
            offline_url: at(&config.offline_path)?,
            fallback_image_url: at(&config.fallback_image_path)?,
            manifest,
            origin,
        })
    }
}

struct Lifecycle {
    state: LifecycleState,
    namespace: Option<Namespace>,
    skip_waiting: bool,
    clients_claimed: bool,
}

/// Worker backed by the SQLite cache store and a [`Network`].
pub struct CacheWorker {
    db: CacheDb,
    network: Arc<dyn Network>,
    settings: WorkerSettings,
    origin: Origin,
    lifecycle: Mutex<Lifecycle>,
    writes: PendingWrites,
}

impl CacheWorker {
    pub fn new(db: CacheDb, network: Arc<dyn Network>, settings: WorkerSettings) -> Self {
        let origin = settings.origin.origin();
        Self {
            db,
            network,
            settings,
            origin,
            lifecycle: Mutex::new(Lifecycle {
                state: LifecycleState::Parsed,
                namespace: None,
                skip_waiting: false,
                clients_claimed: false,
            }),
            writes: PendingWrites::new(),
        }
    }

    pub fn settings(&self) -> &WorkerSettings {
        &self.settings
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    /// Whether install signalled that activation may proceed immediately.
    pub fn skip_waiting(&self) -> bool {
        self.lock().skip_waiting
    }

    pub fn status(&self) -> WorkerStatus {
        let lifecycle = self.lock();
        WorkerStatus {
            version: self.settings.version.clone(),
            namespace: self.settings.namespace.clone(),
            origin: self.origin.ascii_serialization(),
            state: lifecycle.state,
            skip_waiting: lifecycle.skip_waiting,
            clients_claimed: lifecycle.clients_claimed,
            pending_writes: self.writes.len(),
        }
    }

    /// Wait for every cache write issued by strategies so far.
    pub async fn settle(&self) -> usize {
        self.writes.settle().await
    }

    /// Run install then, if install signalled skip-waiting, activate.
    pub async fn start(&self) -> Result<(), Error> {
        self.on_install().await?;
        if self.skip_waiting() {
            self.on_activate().await?;
        }
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin(&self, from: LifecycleState, to: LifecycleState) -> Result<(), Error> {
        let mut lifecycle = self.lock();
        if lifecycle.state != from {
            return Err(Error::Lifecycle(format!(
                "cannot move to {to:?} from {:?} (expected {from:?})",
                lifecycle.state
            )));
        }
        lifecycle.state = to;
        Ok(())
    }

    fn rollback(&self, to: LifecycleState) {
        self.lock().state = to;
    }

    /// The namespace to serve from, once activation has completed.
    fn serving_namespace(&self) -> Option<Namespace> {
        let lifecycle = self.lock();
        match lifecycle.state {
            LifecycleState::Activated => lifecycle.namespace.clone(),
            _ => None,
        }
    }
}

#[async_trait]
impl ServiceWorker for CacheWorker {
    async fn on_install(&self) -> Result<(), Error> {
        self.begin(LifecycleState::Parsed, LifecycleState::Installing)?;

        let namespace = match self.db.open_namespace(&self.settings.namespace).await {
            Ok(namespace) => namespace,
            Err(e) => {
                self.rollback(LifecycleState::Parsed);
                return Err(e);
            }
        };

        precache(&namespace, self.network.as_ref(), &self.settings.manifest).await;

        let mut lifecycle = self.lock();
        lifecycle.namespace = Some(namespace);
        lifecycle.state = LifecycleState::Installed;
        lifecycle.skip_waiting = true;
        tracing::info!(namespace = %self.settings.namespace, "worker installed");
        Ok(())
    }

    async fn on_activate(&self) -> Result<(), Error> {
        self.begin(LifecycleState::Installed, LifecycleState::Activating)?;

        if let Err(e) = reap(&self.db, &self.settings.namespace).await {
            self.rollback(LifecycleState::Installed);
            return Err(e);
        }

        let mut lifecycle = self.lock();
        lifecycle.state = LifecycleState::Activated;
        lifecycle.clients_claimed = true;
        tracing::info!(namespace = %self.settings.namespace, "worker activated; clients claimed");
        Ok(())
    }

    async fn on_intercept(&self, request: Request) -> Intercept {
        let Some(namespace) = self.serving_namespace() else {
            tracing::debug!(url = %request.url, "not activated; declining");
            return Intercept::Decline;
        };

        let Some(class) = classify(&request, &self.origin) else {
            return Intercept::Decline;
        };

        let engine = StrategyEngine {
            namespace: &namespace,
            network: self.network.as_ref(),
            writes: &self.writes,
            offline_url: &self.settings.offline_url,
            fallback_image_url: &self.settings.fallback_image_url,
        };

        Intercept::Respond(engine.respond(class, request).await)
    }
}
