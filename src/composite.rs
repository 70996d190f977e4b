//! Combined view over several integrations.

use std::collections::HashMap;

use serde_json::Value;

use crate::binder::IntegrationBinder;
use crate::config::IntegrationConfig;
use crate::error::{IntegrationError, Result};

/// Readiness and error of a set of integrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeState {
    /// True iff every integration is ready
    pub ready: bool,
    /// First error in declared order
    pub error: Option<IntegrationError>,
}

/// Merges binders into one readiness/error view and one action surface.
///
/// Declaration order is priority order for errors.
pub struct CompositeBinder {
    binders: Vec<IntegrationBinder>,
    /// exposed name -> (binder index, handle method)
    routes: HashMap<String, (usize, String)>,
    exposed: Vec<String>,
}

impl CompositeBinder {
    /// Compose binders. Fails if two actions share an exposed name.
    pub fn new(binders: Vec<IntegrationBinder>) -> Result<Self> {
        let mut routes = HashMap::new();
        let mut exposed = Vec::new();

        for (index, binder) in binders.iter().enumerate() {
            for action in &binder.spec().actions {
                let name = action.exposed_name().to_string();
                if routes.contains_key(&name) {
                    return Err(IntegrationError::ActionCollision(name));
                }
                routes.insert(name.clone(), (index, action.method.clone()));
                exposed.push(name);
            }
        }

        Ok(Self {
            binders,
            routes,
            exposed,
        })
    }

    /// Forward the latest configuration to every integration.
    pub fn render(&self, config: &IntegrationConfig) {
        for binder in &self.binders {
            binder.render(config);
        }
    }

    /// Check if every integration is ready.
    pub fn is_ready(&self) -> bool {
        self.binders.iter().all(IntegrationBinder::is_ready)
    }

    /// First error in declared order.
    pub fn error(&self) -> Option<IntegrationError> {
        self.binders.iter().find_map(IntegrationBinder::error)
    }

    /// Snapshot of the combined state.
    pub fn state(&self) -> CompositeState {
        CompositeState {
            ready: self.is_ready(),
            error: self.error(),
        }
    }

    /// Wait until no integration has a load in flight.
    pub async fn settled(&self) -> CompositeState {
        for binder in &self.binders {
            binder.settled().await;
        }
        self.state()
    }

    /// Call an action by its exposed name.
    pub fn invoke(&self, action: &str, args: Value) {
        match self.routes.get(action) {
            Some((index, method)) => self.binders[*index].invoke(method, args),
            None => tracing::warn!("No integration exposes action '{}', ignoring", action),
        }
    }

    /// Exposed action names in declaration order.
    pub fn actions(&self) -> &[String] {
        &self.exposed
    }

    /// Look up a constituent binder by integration name.
    pub fn binder(&self, name: &str) -> Option<&IntegrationBinder> {
        self.binders.iter().find(|b| b.spec().name == name)
    }

    /// Unmount every integration.
    pub fn unmount(&self) {
        for binder in &self.binders {
            binder.unmount();
        }
    }
}
