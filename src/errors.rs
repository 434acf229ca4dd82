// src/errors.rs

//! Crate-wide error type and result alias.

use std::collections::BTreeSet;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InvokeError {
    /// The OS refused to create the child process.
    #[error("failed to launch `{command_line}`: {source}")]
    ProcessLaunch {
        command_line: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran to completion with an exit code outside the accepted set.
    #[error(
        "command exited with code {actual} (accepted: {default_code}{})",
        format_extra(.extra)
    )]
    UnexpectedExitCode {
        actual: i32,
        default_code: i32,
        extra: BTreeSet<i32>,
    },

    #[error("environment variable '{0}' is not defined")]
    UndefinedVariable(String),

    #[error("token expansion of '%{name}%' did not terminate after {passes} passes")]
    CyclicToken { name: String, passes: usize },

    /// Waiting on an already started child failed at the OS level.
    #[error("failed while waiting for `{command_line}`: {source}")]
    Wait {
        command_line: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn format_extra(extra: &BTreeSet<i32>) -> String {
    extra.iter().map(|code| format!(", {code}")).collect()
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, InvokeError>;
