// src/tokens/mock.rs

use super::EnvSource;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory environment, so expansion can be tested without touching the
/// real process environment.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: Arc<Mutex<HashMap<String, String>>>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper for test setup.
    pub fn with(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        let mut vars = self.vars.lock().unwrap();
        vars.insert(name.into(), value.into());
    }

    pub fn remove(&self, name: &str) {
        let mut vars = self.vars.lock().unwrap();
        vars.remove(name);
    }
}

impl EnvSource for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        let vars = self.vars.lock().unwrap();
        vars.get(name).cloned()
    }
}
