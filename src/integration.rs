//! Integration descriptors.
//!
//! An integration is described entirely as data: where its script lives
//! relative to the endpoint, which global handle the script installs, and
//! which actions that handle supports. The binder state machine is the same
//! for every integration.

/// Path of the tracking SDK under the endpoint.
pub const TRACKING_SDK_PATH: &str = "/static/xsw-sdk.js";

/// Path of the widget SDK under the endpoint.
pub const WIDGET_SDK_PATH: &str = "/static/xsw-widget.js";

/// Global name the tracking SDK installs.
pub const TRACKING_HANDLE: &str = "xsw";

/// Global name the widget SDK installs.
pub const WIDGET_HANDLE: &str = "xswWidget";

/// One action method of an integration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSpec {
    /// Method name on the global handle
    pub method: String,
    /// Name exposed on a combined surface, if it differs from `method`
    pub alias: Option<String>,
}

impl ActionSpec {
    /// Action exposed under its own name.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            alias: None,
        }
    }

    /// Action exposed under a different name when composed.
    pub fn aliased(method: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            alias: Some(alias.into()),
        }
    }

    /// Name on the combined action surface.
    pub fn exposed_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.method)
    }
}

/// Static description of one loadable integration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrationSpec {
    /// Short name used in logs
    pub name: String,
    /// Resource path appended to the endpoint
    pub resource_path: String,
    /// Global handle the resource installs
    pub handle: String,
    /// Supported actions
    pub actions: Vec<ActionSpec>,
}

impl IntegrationSpec {
    /// Create a descriptor with no actions.
    pub fn new(
        name: impl Into<String>,
        resource_path: impl Into<String>,
        handle: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            resource_path: resource_path.into(),
            handle: handle.into(),
            actions: Vec::new(),
        }
    }

    /// Add an action.
    pub fn with_action(mut self, action: ActionSpec) -> Self {
        self.actions.push(action);
        self
    }

    /// Event tracking and user identification.
    pub fn tracking() -> Self {
        Self::new("tracking", TRACKING_SDK_PATH, TRACKING_HANDLE)
            .with_action(ActionSpec::new("track"))
            .with_action(ActionSpec::new("identify"))
    }

    /// Chat widget. Its actions are suffixed when composed.
    pub fn widget() -> Self {
        Self::new("widget", WIDGET_SDK_PATH, WIDGET_HANDLE)
            .with_action(ActionSpec::aliased("open", "open_widget"))
            .with_action(ActionSpec::aliased("close", "close_widget"))
            .with_action(ActionSpec::aliased("toggle", "toggle_widget"))
    }

    /// Check if the handle method is one of this integration's actions.
    pub fn has_action(&self, method: &str) -> bool {
        self.actions.iter().any(|a| a.method == method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widget_actions_are_aliased() {
        let names: Vec<_> = IntegrationSpec::widget()
            .actions
            .iter()
            .map(|a| a.exposed_name().to_string())
            .collect();
        assert_eq!(names, ["open_widget", "close_widget", "toggle_widget"]);
    }

    #[test]
    fn test_tracking_actions_keep_names() {
        let spec = IntegrationSpec::tracking();
        assert!(spec.has_action("track"));
        assert!(spec.has_action("identify"));
        assert!(!spec.has_action("open"));
        assert_eq!(spec.actions[0].exposed_name(), "track");
    }
}
