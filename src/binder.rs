//! Per-integration lifecycle: load, initialize, expose actions.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tokio::sync::watch;

use crate::config::IntegrationConfig;
use crate::error::IntegrationError;
use crate::integration::IntegrationSpec;
use crate::loader::ResourceLoader;
use crate::mirror::ConfigMirror;
use crate::registry::HandleRegistry;

/// Lifecycle phase of an integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing rendered yet
    Idle,
    /// Resource requested, not settled
    Loading,
    /// Loaded and initialized
    Ready,
    /// Load, handle lookup, or init failed
    Failed,
}

/// Observable state of one integration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrationState {
    pub phase: Phase,
    pub error: Option<IntegrationError>,
}

impl IntegrationState {
    fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            error: None,
        }
    }

    fn loading() -> Self {
        Self {
            phase: Phase::Loading,
            error: None,
        }
    }

    fn ready() -> Self {
        Self {
            phase: Phase::Ready,
            error: None,
        }
    }

    fn failed(error: IntegrationError) -> Self {
        Self {
            phase: Phase::Failed,
            error: Some(error),
        }
    }

    /// Check if the integration is loaded and initialized.
    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    /// Check if no load is in flight.
    pub fn is_settled(&self) -> bool {
        self.phase != Phase::Loading
    }
}

struct Shared {
    spec: IntegrationSpec,
    mirror: ConfigMirror<IntegrationConfig>,
    registry: Arc<HandleRegistry>,
    state: watch::Sender<IntegrationState>,
    /// Identity of the active epoch. Also serializes epoch starts against
    /// load completions.
    identity: Mutex<Option<String>>,
    epoch: AtomicU64,
    mounted: AtomicBool,
}

impl Shared {
    fn publish(&self, state: IntegrationState) {
        self.state.send_replace(state);
    }

    /// Apply the outcome of a load started for `epoch`.
    fn complete(&self, epoch: u64, url: &str, loaded: crate::Result<()>) {
        let _identity = self
            .identity
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if !self.mounted.load(Ordering::Acquire) {
            tracing::debug!("Discarding {} load result after unmount", self.spec.name);
            return;
        }
        if self.epoch.load(Ordering::Acquire) != epoch {
            tracing::debug!(
                "Discarding stale {} load result for {}",
                self.spec.name,
                url
            );
            return;
        }

        match self.initialize(url, loaded) {
            Ok(()) => {
                tracing::info!("Integration ready: {}", self.spec.name);
                self.publish(IntegrationState::ready());
            }
            Err(e) => {
                tracing::error!("Integration {} failed: {}", self.spec.name, e);
                self.publish(IntegrationState::failed(e));
            }
        }
    }

    fn initialize(&self, url: &str, loaded: crate::Result<()>) -> crate::Result<()> {
        loaded?;

        let handle = self.registry.lookup(&self.spec.handle).ok_or_else(|| {
            IntegrationError::HandleMissing {
                handle: self.spec.handle.clone(),
                url: url.to_string(),
            }
        })?;

        let payload = self.mirror.read(IntegrationConfig::to_init_payload);
        handle
            .init(&payload)
            .map_err(|reason| IntegrationError::InitFailed {
                handle: self.spec.handle.clone(),
                reason,
            })
    }
}

/// Drives one integration from first render to ready or failed.
///
/// Rendering with a configuration whose endpoint matches the active one only
/// refreshes the mirrored config. A new endpoint starts a new epoch: its
/// resource is requested and the handle is initialized once more. Load and
/// initialization failures land in [`IntegrationBinder::error`]; actions
/// never fail.
pub struct IntegrationBinder {
    shared: Arc<Shared>,
    loader: Arc<ResourceLoader>,
}

impl IntegrationBinder {
    /// Create an idle binder. Nothing is loaded until the first render.
    pub fn new(
        spec: IntegrationSpec,
        loader: Arc<ResourceLoader>,
        registry: Arc<HandleRegistry>,
        config: IntegrationConfig,
    ) -> Self {
        let (state, _) = watch::channel(IntegrationState::idle());
        Self {
            shared: Arc::new(Shared {
                spec,
                mirror: ConfigMirror::new(config),
                registry,
                state,
                identity: Mutex::new(None),
                epoch: AtomicU64::new(0),
                mounted: AtomicBool::new(true),
            }),
            loader,
        }
    }

    /// Descriptor of this integration.
    pub fn spec(&self) -> &IntegrationSpec {
        &self.shared.spec
    }

    /// Supply the latest configuration.
    ///
    /// Starts loading on the first call and whenever the endpoint changes.
    pub fn render(&self, config: &IntegrationConfig) {
        let shared = &self.shared;
        shared.mirror.update(config.clone());

        if !shared.mounted.load(Ordering::Acquire) {
            return;
        }

        let mut identity = shared
            .identity
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if identity.as_deref() == Some(config.identity()) {
            return;
        }

        let epoch = shared.epoch.fetch_add(1, Ordering::AcqRel) + 1;

        if let Err(e) = config.validate() {
            // Not pinned: a corrected config with the same endpoint retries.
            *identity = None;
            tracing::error!("Integration {} not started: {}", shared.spec.name, e);
            shared.publish(IntegrationState::failed(e));
            return;
        }

        let url = config.resource_url(&shared.spec.resource_path);
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                // Nothing was requested, so a later render may start over.
                *identity = None;
                let error = IntegrationError::ResourceLoadFailed {
                    url,
                    reason: format!("no async runtime: {}", e),
                };
                tracing::error!("Integration {} not started: {}", shared.spec.name, error);
                shared.publish(IntegrationState::failed(error));
                return;
            }
        };

        *identity = Some(config.identity().to_string());
        tracing::debug!(
            "Starting {} epoch {} with {}",
            shared.spec.name,
            epoch,
            url
        );
        shared.publish(IntegrationState::loading());

        let task_shared = Arc::clone(shared);
        let loader = Arc::clone(&self.loader);
        runtime.spawn(async move {
            let loaded = loader.ensure_loaded(&url).await;
            task_shared.complete(epoch, &url, loaded);
        });
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> IntegrationState {
        self.shared.state.borrow().clone()
    }

    /// Check if loaded and initialized.
    pub fn is_ready(&self) -> bool {
        self.shared.state.borrow().is_ready()
    }

    /// Error of the current epoch, if it failed.
    pub fn error(&self) -> Option<IntegrationError> {
        self.shared.state.borrow().error.clone()
    }

    /// Watch state transitions.
    pub fn subscribe(&self) -> watch::Receiver<IntegrationState> {
        self.shared.state.subscribe()
    }

    /// Wait until no load is in flight and return the resulting state.
    pub async fn settled(&self) -> IntegrationState {
        let mut rx = self.subscribe();
        let settled = rx
            .wait_for(IntegrationState::is_settled)
            .await
            .map(|state| state.clone());
        settled.unwrap_or_else(|_| self.state())
    }

    /// Call an action on the global handle as it exists right now.
    ///
    /// Unknown actions, a missing handle, and handle-side failures are logged
    /// and ignored.
    pub fn invoke(&self, method: &str, args: Value) {
        let spec = &self.shared.spec;

        if !spec.has_action(method) {
            tracing::warn!("{} has no action '{}', ignoring", spec.name, method);
            return;
        }

        let Some(handle) = self.shared.registry.lookup(&spec.handle) else {
            tracing::warn!(
                "{}.{} called before '{}' is available, ignoring",
                spec.name,
                method,
                spec.handle
            );
            return;
        };

        if let Err(e) = handle.invoke(method, &args) {
            tracing::warn!("{}.{} failed: {}", spec.name, method, e);
        }
    }

    /// Stop applying load results. An in-flight load still completes.
    ///
    /// A load still pending is abandoned: the state drops back to `Idle` so
    /// nothing waits on it.
    pub fn unmount(&self) {
        let _identity = self
            .shared
            .identity
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        self.shared.mounted.store(false, Ordering::Release);
        self.shared.state.send_if_modified(|state| {
            if state.phase == Phase::Loading {
                *state = IntegrationState::idle();
                true
            } else {
                false
            }
        });
    }
}

impl Drop for IntegrationBinder {
    fn drop(&mut self) {
        self.unmount();
    }
}
