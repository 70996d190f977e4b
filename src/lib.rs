//! Host-side lifecycle manager for remotely hosted SDKs.
//!
//! Loads the tracking and widget bundles from an endpoint exactly once,
//! initializes each with the latest caller configuration, and exposes a
//! control surface that is safe to use before, during and after loading.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lib_integration_host::{HandleRegistry, IntegrationConfig, IntegrationProvider, ResourceLoader};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Arc::new(HandleRegistry::new());
//!     // Script host that runs bundles and installs their handles into `registry`
//!     let host = Arc::new(MyScriptHost::new(registry.clone()));
//!     let loader = Arc::new(ResourceLoader::new(host));
//!
//!     let config = IntegrationConfig::new("https://x.test", "k1").with_greeting("Hi!");
//!     let provider = IntegrationProvider::mount(config, loader, registry)?;
//!
//!     // Safe right away; a no-op until the SDK is available
//!     provider.track("page_view", None);
//!
//!     let state = provider.settled().await;
//!     if let Some(e) = state.error {
//!         eprintln!("integration unavailable: {}", e);
//!     }
//!     provider.open_widget();
//!
//!     Ok(())
//! }
//! ```

mod binder;
mod composite;
mod config;
mod error;
mod integration;
mod loader;
mod mirror;
mod provider;
mod registry;

#[cfg(test)]
mod test_support;

pub use binder::*;
pub use composite::*;
pub use config::*;
pub use error::*;
pub use integration::*;
pub use loader::*;
pub use mirror::*;
pub use provider::*;
pub use registry::*;

// Re-export dependencies for convenience
pub use async_trait::async_trait;
pub use serde_json;
