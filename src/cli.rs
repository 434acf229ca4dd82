// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::WaitMode;

/// Command-line arguments for `cmdinvoke`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cmdinvoke",
    version,
    about = "Run an external command, stream its output and check its exit code.",
    long_about = None
)]
pub struct CliArgs {
    /// Command to run.
    ///
    /// Without `--args` this is a full command line for the system
    /// interpreter (`sh -c` / `cmd /C`); with `--args` it is the executable.
    #[arg(value_name = "COMMAND")]
    pub command: String,

    /// Argument string passed directly to COMMAND (no shell involved).
    #[arg(long = "args", value_name = "STRING", allow_hyphen_values = true)]
    pub arguments: Option<String>,

    /// Working directory for the child. Ignored if it does not exist.
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Exit code that counts as success.
    #[arg(long, value_name = "CODE", default_value_t = 0, allow_negative_numbers = true)]
    pub default_code: i32,

    /// Additional accepted exit code (repeatable).
    #[arg(long = "accept", value_name = "CODE", allow_negative_numbers = true)]
    pub accept: Vec<i32>,

    /// Path to the config file (TOML).
    ///
    /// Default: `Cmdinvoke.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Wait strategy; overrides `[invoke].wait`.
    #[arg(long, value_enum, value_name = "MODE")]
    pub wait: Option<WaitMode>,

    /// Interval between diagnostics when polling (e.g. `5s`, `500ms`).
    #[arg(long, value_name = "DURATION")]
    pub poll_interval: Option<String>,

    /// Let the child write straight to this process's stdout.
    #[arg(long)]
    pub inherit_stdout: bool,

    /// Do not expand `%NAME%` tokens in COMMAND, `--args` and `--cwd`.
    #[arg(long)]
    pub no_expand: bool,

    /// Print COMMAND with tokens expanded and exit without running it.
    #[arg(long)]
    pub expand: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CMDINVOKE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
