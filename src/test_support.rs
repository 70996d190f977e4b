//! Fakes shared by the unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;

use crate::loader::ScriptHost;
use crate::registry::{GlobalHandle, HandleRegistry};

/// Handle that records every call it receives.
#[derive(Default)]
pub struct RecordingHandle {
    inits: Mutex<Vec<Value>>,
    calls: Mutex<Vec<(String, Value)>>,
    init_error: Option<String>,
}

impl RecordingHandle {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_init(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            init_error: Some(reason.to_string()),
            ..Self::default()
        })
    }

    pub fn inits(&self) -> Vec<Value> {
        self.inits.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

impl GlobalHandle for RecordingHandle {
    fn init(&self, config: &Value) -> Result<(), String> {
        self.inits.lock().unwrap().push(config.clone());
        match &self.init_error {
            Some(reason) => Err(reason.clone()),
            None => Ok(()),
        }
    }

    fn invoke(&self, method: &str, args: &Value) -> Result<(), String> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), args.clone()));
        if method == "explode" {
            return Err("handle rejected call".to_string());
        }
        Ok(())
    }
}

enum FakeScript {
    Install(Vec<(String, Arc<RecordingHandle>)>),
    Fail(String),
}

/// Script host serving canned scripts from memory.
///
/// Unknown URLs fail like a 404. A gated host holds every load until
/// `open_gate` is called.
pub struct FakeScriptHost {
    registry: Arc<HandleRegistry>,
    scripts: Mutex<HashMap<String, FakeScript>>,
    requests: Mutex<HashMap<String, usize>>,
    gate: watch::Sender<bool>,
}

impl FakeScriptHost {
    pub fn new(registry: Arc<HandleRegistry>) -> Arc<Self> {
        Arc::new(Self::build(registry, true))
    }

    pub fn gated(registry: Arc<HandleRegistry>) -> Arc<Self> {
        Arc::new(Self::build(registry, false))
    }

    fn build(registry: Arc<HandleRegistry>, open: bool) -> Self {
        let (gate, _) = watch::channel(open);
        Self {
            registry,
            scripts: Mutex::new(HashMap::new()),
            requests: Mutex::new(HashMap::new()),
            gate,
        }
    }

    /// Serve `url`; running it installs the given handles.
    pub fn serve(&self, url: &str, handles: Vec<(&str, Arc<RecordingHandle>)>) {
        let handles = handles
            .into_iter()
            .map(|(name, handle)| (name.to_string(), handle))
            .collect();
        self.scripts
            .lock()
            .unwrap()
            .insert(url.to_string(), FakeScript::Install(handles));
    }

    /// Make `url` fail to load.
    pub fn fail(&self, url: &str, reason: &str) {
        self.scripts
            .lock()
            .unwrap()
            .insert(url.to_string(), FakeScript::Fail(reason.to_string()));
    }

    pub fn open_gate(&self) {
        self.gate.send_replace(true);
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .get(url)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl ScriptHost for FakeScriptHost {
    async fn execute(&self, url: &str) -> Result<(), String> {
        *self
            .requests
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_insert(0) += 1;

        let mut gate = self.gate.subscribe();
        gate.wait_for(|open| *open)
            .await
            .map_err(|_| "gate dropped".to_string())?;

        let handles = match self.scripts.lock().unwrap().get(url) {
            Some(FakeScript::Install(handles)) => handles.clone(),
            Some(FakeScript::Fail(reason)) => return Err(reason.clone()),
            None => return Err(format!("404 Not Found: {}", url)),
        };

        for (name, handle) in handles {
            self.registry.install(name, handle);
        }
        Ok(())
    }
}
