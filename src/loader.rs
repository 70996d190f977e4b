//! Remote script loader.
//!
//! Each resource URL is fetched and executed at most once per loader. The
//! loader is shared by every binder in the process, so two integrations that
//! happen to use the same URL share one request.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::{IntegrationError, Result};

/// Environment that fetches and executes remote scripts.
///
/// Executing a script is expected to install its global handle into the
/// [`HandleRegistry`](crate::HandleRegistry) as a side effect.
#[async_trait]
pub trait ScriptHost: Send + Sync {
    /// Fetch and run the script at `url`.
    async fn execute(&self, url: &str) -> std::result::Result<(), String>;
}

/// Load status of a single resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceStatus {
    /// Never requested
    Unrequested,
    /// Request in flight
    Loading,
    /// Script executed successfully
    Loaded,
    /// Fetch or execution failed; stays failed for the loader's lifetime
    Failed(String),
}

impl ResourceStatus {
    /// Check if the resource reached a terminal state.
    pub fn is_settled(&self) -> bool {
        matches!(self, ResourceStatus::Loaded | ResourceStatus::Failed(_))
    }
}

/// Loads remote scripts exactly once per URL.
pub struct ResourceLoader {
    host: Arc<dyn ScriptHost>,
    resources: Mutex<HashMap<String, watch::Receiver<ResourceStatus>>>,
}

impl ResourceLoader {
    /// Create a loader backed by a script host.
    pub fn new(host: Arc<dyn ScriptHost>) -> Self {
        Self {
            host,
            resources: Mutex::new(HashMap::new()),
        }
    }

    /// Ensure the script at `url` has been executed.
    ///
    /// The first caller starts the fetch; later callers wait for the same
    /// outcome. A failed resource is never retried, every later call gets
    /// the recorded failure back. The fetch runs detached, so dropping this
    /// future does not cancel it.
    pub async fn ensure_loaded(&self, url: &str) -> Result<()> {
        let mut rx = self.request(url)?;

        let status = match rx.wait_for(ResourceStatus::is_settled).await {
            Ok(status) => status.clone(),
            Err(_) => ResourceStatus::Failed("loader task ended before settling".to_string()),
        };

        match status {
            ResourceStatus::Failed(reason) => Err(IntegrationError::ResourceLoadFailed {
                url: url.to_string(),
                reason,
            }),
            _ => Ok(()),
        }
    }

    /// Register `url` and start its fetch, or join the existing one.
    ///
    /// Check and insert happen under one lock with no await in between.
    fn request(&self, url: &str) -> Result<watch::Receiver<ResourceStatus>> {
        let mut resources = self
            .resources
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(rx) = resources.get(url) {
            tracing::trace!("Resource already requested: {}", url);
            return Ok(rx.clone());
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            IntegrationError::ResourceLoadFailed {
                url: url.to_string(),
                reason: format!("no async runtime: {}", e),
            }
        })?;

        let (tx, rx) = watch::channel(ResourceStatus::Loading);
        resources.insert(url.to_string(), rx.clone());
        drop(resources);

        tracing::debug!("Requesting resource: {}", url);

        let host = Arc::clone(&self.host);
        let url = url.to_string();
        runtime.spawn(async move {
            let status = match host.execute(&url).await {
                Ok(()) => {
                    tracing::info!("Loaded resource: {}", url);
                    ResourceStatus::Loaded
                }
                Err(reason) => {
                    tracing::error!("Failed to load resource {}: {}", url, reason);
                    ResourceStatus::Failed(reason)
                }
            };
            tx.send_replace(status);
        });

        Ok(rx)
    }

    /// Current status of a resource.
    pub fn status(&self, url: &str) -> ResourceStatus {
        self.resources
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .map(|rx| rx.borrow().clone())
            .unwrap_or(ResourceStatus::Unrequested)
    }

    /// URLs requested so far.
    pub fn requested(&self) -> Vec<String> {
        self.resources
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}
