//! Tracking + widget provider.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::binder::IntegrationBinder;
use crate::composite::{CompositeBinder, CompositeState};
use crate::config::IntegrationConfig;
use crate::error::{IntegrationError, Result};
use crate::integration::IntegrationSpec;
use crate::loader::ResourceLoader;
use crate::registry::HandleRegistry;

/// Property or trait bag forwarded to the SDK.
pub type Properties = Map<String, Value>;

/// The tracking and widget integrations behind one control surface.
///
/// All action helpers are safe to call at any time; before the SDKs are
/// available they do nothing.
pub struct IntegrationProvider {
    composite: CompositeBinder,
}

impl IntegrationProvider {
    /// Build both integrations and start loading them.
    pub fn mount(
        config: IntegrationConfig,
        loader: Arc<ResourceLoader>,
        registry: Arc<HandleRegistry>,
    ) -> Result<Self> {
        let composite = CompositeBinder::new(vec![
            IntegrationBinder::new(
                IntegrationSpec::tracking(),
                Arc::clone(&loader),
                Arc::clone(&registry),
                config.clone(),
            ),
            IntegrationBinder::new(IntegrationSpec::widget(), loader, registry, config.clone()),
        ])?;
        composite.render(&config);
        Ok(Self { composite })
    }

    /// Supply the latest configuration.
    pub fn render(&self, config: &IntegrationConfig) {
        self.composite.render(config);
    }

    /// Check if both integrations are ready.
    pub fn is_ready(&self) -> bool {
        self.composite.is_ready()
    }

    /// Tracking error if any, else widget error.
    pub fn error(&self) -> Option<IntegrationError> {
        self.composite.error()
    }

    /// Snapshot of readiness and error.
    pub fn state(&self) -> CompositeState {
        self.composite.state()
    }

    /// Wait until both loads have settled.
    pub async fn settled(&self) -> CompositeState {
        self.composite.settled().await
    }

    /// Track an event.
    pub fn track(&self, event: &str, properties: Option<Properties>) {
        self.composite
            .invoke("track", with_bag(Value::from(event), properties));
    }

    /// Identify the current user.
    pub fn identify(&self, user_id: &str, traits: Option<Properties>) {
        self.composite
            .invoke("identify", with_bag(Value::from(user_id), traits));
    }

    /// Open the widget.
    pub fn open_widget(&self) {
        self.composite.invoke("open_widget", Value::Array(Vec::new()));
    }

    /// Close the widget.
    pub fn close_widget(&self) {
        self.composite.invoke("close_widget", Value::Array(Vec::new()));
    }

    /// Toggle the widget.
    pub fn toggle_widget(&self) {
        self.composite.invoke("toggle_widget", Value::Array(Vec::new()));
    }

    /// Underlying composite.
    pub fn composite(&self) -> &CompositeBinder {
        &self.composite
    }
}

/// Positional arguments: the subject, then the bag when present.
fn with_bag(subject: Value, bag: Option<Properties>) -> Value {
    let mut args = vec![subject];
    if let Some(bag) = bag {
        args.push(Value::Object(bag));
    }
    Value::Array(args)
}
