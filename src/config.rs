//! Integration configuration.

use serde::{Deserialize, Serialize};

use crate::error::IntegrationError;

/// Corner of the page the widget launcher is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetPosition {
    BottomRight,
    BottomLeft,
}

/// Presentation options forwarded to the widget SDK.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetOptions {
    /// Accent color (any CSS color string)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Launcher position
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<WidgetPosition>,

    /// Greeting shown when the widget opens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
}

/// Configuration supplied by the host application.
///
/// Only `endpoint_base` is an identity field: changing it means a different
/// resource and a fresh initialization. Every other field is passed through
/// verbatim to the remote `init`, latest value wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationConfig {
    /// Base address the SDK bundles are served from
    pub endpoint_base: String,

    /// Credential identifying the site to the backend
    pub credential: String,

    /// Let the tracking SDK record page views on its own
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_track: Option<bool>,

    /// Known user identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Known session identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Widget presentation
    #[serde(flatten)]
    pub widget: WidgetOptions,
}

impl IntegrationConfig {
    /// Create a configuration with the two required fields.
    pub fn new(endpoint_base: impl Into<String>, credential: impl Into<String>) -> Self {
        Self {
            endpoint_base: endpoint_base.into(),
            credential: credential.into(),
            auto_track: None,
            user_id: None,
            session_id: None,
            widget: WidgetOptions::default(),
        }
    }

    /// Enable or disable automatic page tracking.
    pub fn with_auto_track(mut self, enabled: bool) -> Self {
        self.auto_track = Some(enabled);
        self
    }

    /// Set the user identifier.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Set the session identifier.
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Set the widget accent color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.widget.color = Some(color.into());
        self
    }

    /// Set the widget position.
    pub fn with_position(mut self, position: WidgetPosition) -> Self {
        self.widget.position = Some(position);
        self
    }

    /// Set the widget greeting.
    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.widget.greeting = Some(greeting.into());
        self
    }

    /// Identity of this configuration: the endpoint without trailing slashes.
    pub fn identity(&self) -> &str {
        self.endpoint_base.trim_end_matches('/')
    }

    /// Build the URL of a resource served under the endpoint.
    pub fn resource_url(&self, suffix: &str) -> String {
        format!("{}/{}", self.identity(), suffix.trim_start_matches('/'))
    }

    /// Check the required fields.
    pub fn validate(&self) -> Result<(), IntegrationError> {
        if self.identity().trim().is_empty() {
            return Err(IntegrationError::InvalidConfig(
                "endpoint_base is empty".to_string(),
            ));
        }
        if self.credential.trim().is_empty() {
            return Err(IntegrationError::InvalidConfig(
                "credential is empty".to_string(),
            ));
        }
        Ok(())
    }

    /// JSON object handed to a global handle's `init`.
    pub fn to_init_payload(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            tracing::error!("Failed to serialize integration config: {}", e);
            serde_json::Value::Null
        })
    }
}
