// src/config/model.rs

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::exec::{
    CommandInvoker, DEFAULT_LINE_CAPACITY, DEFAULT_POLL_INTERVAL, InvokeRequest, WaitStrategy,
};
use crate::sink::LogSink;
use crate::tokens::{DEFAULT_MAX_PASSES, TokenExpander};
use crate::types::{StdoutMode, UndefinedPolicy, WaitMode};

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [invoke]
/// wait = "polling"
/// poll_interval = "5s"
/// stdout = "drain"
/// line_capacity = 256
///
/// [tokens]
/// undefined = "sentinel"
/// max_passes = 256
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub invoke: InvokeSection,

    #[serde(default)]
    pub tokens: TokensSection,
}

/// `[invoke]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct InvokeSection {
    /// `"blocking"` (default) or `"polling"`.
    #[serde(default)]
    pub wait: WaitMode,

    /// Interval between diagnostic snapshots when `wait = "polling"`.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,

    /// `"drain"` (default) or `"inherit"`.
    #[serde(default)]
    pub stdout: StdoutMode,

    /// Capacity of the stdout line channel handed to subscribers.
    #[serde(default = "default_line_capacity")]
    pub line_capacity: usize,
}

fn default_poll_interval() -> String {
    "5s".to_string()
}

fn default_line_capacity() -> usize {
    DEFAULT_LINE_CAPACITY
}

impl Default for InvokeSection {
    fn default() -> Self {
        Self {
            wait: WaitMode::default(),
            poll_interval: default_poll_interval(),
            stdout: StdoutMode::default(),
            line_capacity: default_line_capacity(),
        }
    }
}

/// `[tokens]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TokensSection {
    /// `"sentinel"` (default) or `"fail"`.
    #[serde(default)]
    pub undefined: UndefinedPolicy,

    /// Upper bound on substitution passes per string.
    #[serde(default = "default_max_passes")]
    pub max_passes: usize,
}

fn default_max_passes() -> usize {
    DEFAULT_MAX_PASSES
}

impl Default for TokensSection {
    fn default() -> Self {
        Self {
            undefined: UndefinedPolicy::default(),
            max_passes: default_max_passes(),
        }
    }
}

/// Validated configuration.
///
/// Construct via `ConfigFile::try_from(RawConfigFile)` or
/// [`load_and_validate`](crate::config::load_and_validate).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub invoke: InvokeSection,
    pub tokens: TokensSection,
    poll_interval: Duration,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let raw = RawConfigFile::default();
        Self::new_unchecked(raw.invoke, raw.tokens, DEFAULT_POLL_INTERVAL)
    }
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        invoke: InvokeSection,
        tokens: TokensSection,
        poll_interval: Duration,
    ) -> Self {
        Self {
            invoke,
            tokens,
            poll_interval,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn wait_strategy(&self) -> WaitStrategy {
        match self.invoke.wait {
            WaitMode::Blocking => WaitStrategy::Blocking,
            WaitMode::Polling => WaitStrategy::Polling {
                interval: self.poll_interval,
            },
        }
    }

    /// Expander over the process environment with the configured policy.
    pub fn token_expander(&self) -> TokenExpander {
        TokenExpander::default()
            .with_policy(self.tokens.undefined)
            .with_max_passes(self.tokens.max_passes)
    }

    /// Invoker wired with this configuration and the given sink.
    pub fn invoker(&self, sink: Arc<dyn LogSink>) -> CommandInvoker {
        CommandInvoker::with_shared_sink(sink)
            .with_expander(self.token_expander())
            .with_wait_strategy(self.wait_strategy())
    }

    /// Request for `command` using the configured stdout mode.
    pub fn request(&self, command: impl Into<String>) -> InvokeRequest {
        InvokeRequest::new(command).stdout(self.invoke.stdout)
    }

    /// Like [`ConfigFile::request`], with a line channel of the configured capacity.
    pub fn subscribed_request(&self, command: impl Into<String>) -> InvokeRequest {
        self.request(command).subscribe_lines(self.invoke.line_capacity)
    }
}
