// src/lib.rs

//! Run external commands, stream their output and validate exit codes.
//!
//! The library entry point is [`CommandInvoker`]; the `cmdinvoke` binary is a
//! thin CLI over it (see [`run`]).

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod sink;
pub mod tokens;
pub mod types;

use std::sync::Arc;

use anyhow::{Result, anyhow};
use tracing::{debug, error, info};

use crate::cli::CliArgs;
use crate::config::{
    ConfigFile, default_config_path, load_and_validate, load_or_default, parse_duration,
};
use crate::errors::InvokeError;
use crate::types::{StdoutMode, WaitMode};

pub use crate::errors::Result as InvokeResult;
pub use crate::exec::{
    AcceptedExitCodes, CommandInvoker, InvocationResult, InvokeRequest, LaunchSpec,
    RunningInvocation, WaitStrategy, accepts,
};
pub use crate::sink::{LogSink, MemorySink, SinkEntry, TracingSink};
pub use crate::tokens::{TokenExpander, expand_tokens, normalize_dir, normalize_path};

/// High-level entry point used by `main.rs`.
///
/// Returns the exit status the binary should terminate with:
/// - `0` when the child's exit code is accepted
/// - the child's own code when it is rejected (`1` if it cannot serve as a
///   process exit status)
///
/// Launch, configuration and token failures are returned as errors.
pub async fn run(args: CliArgs) -> Result<i32> {
    let cfg = match args.config.as_ref() {
        Some(path) => load_and_validate(path)?,
        None => load_or_default(default_config_path())?,
    };

    if args.expand {
        println!("{}", cfg.token_expander().expand(&args.command)?);
        return Ok(0);
    }

    let wait = resolve_wait_strategy(&args, &cfg)?;
    let invoker = cfg.invoker(Arc::new(TracingSink)).with_wait_strategy(wait);
    let request = build_request(&args, &cfg);
    debug!(?request, ?wait, "invoking");

    match invoker.invoke_and_validate(request).await {
        Ok(result) => {
            info!(exit_code = result.exit_code, "command succeeded");
            Ok(0)
        }
        Err(InvokeError::UnexpectedExitCode {
            actual,
            default_code,
            extra,
        }) => {
            error!(
                exit_code = actual,
                default_code,
                ?extra,
                "command exited with an unexpected code"
            );
            Ok(rejected_exit_status(actual))
        }
        Err(err) => Err(err.into()),
    }
}

/// CLI flags win over `[invoke]` settings.
fn resolve_wait_strategy(args: &CliArgs, cfg: &ConfigFile) -> Result<WaitStrategy> {
    let interval = match args.poll_interval.as_deref() {
        Some(s) => parse_duration(s).map_err(|e| anyhow!("--poll-interval: {e}"))?,
        None => cfg.poll_interval(),
    };
    if interval.is_zero() {
        return Err(anyhow!("--poll-interval must be > 0"));
    }

    Ok(match args.wait.unwrap_or(cfg.invoke.wait) {
        WaitMode::Blocking => WaitStrategy::Blocking,
        WaitMode::Polling => WaitStrategy::Polling { interval },
    })
}

fn build_request(args: &CliArgs, cfg: &ConfigFile) -> InvokeRequest {
    let mut request = cfg
        .request(&args.command)
        .accepted(
            AcceptedExitCodes::new(args.default_code).with_extra(args.accept.iter().copied()),
        )
        .expand_tokens(!args.no_expand);

    if args.inherit_stdout {
        request = request.stdout(StdoutMode::Inherit);
    }

    if let Some(arguments) = args.arguments.as_ref() {
        request = request.arguments(arguments);
    }
    if let Some(dir) = args.cwd.as_ref() {
        request = request.working_dir(dir.clone());
    }
    request
}

fn rejected_exit_status(code: i32) -> i32 {
    if (1..=255).contains(&code) { code } else { 1 }
}
