// src/tokens/env.rs

use std::fmt::Debug;

/// Abstract read-only view of environment variables.
pub trait EnvSource: Send + Sync + Debug {
    /// Look up `name`. `None` means the variable is not defined.
    fn var(&self, name: &str) -> Option<String>;
}

/// Implementation backed by the current process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        // Non-UTF-8 values are still defined; keep them visible.
        std::env::var_os(name).map(|value| value.to_string_lossy().into_owned())
    }
}
