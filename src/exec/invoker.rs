// src/exec/invoker.rs

//! Lifecycle of one child process.
//!
//! ```text
//! NotStarted -> Started -> Draining -> Exited(code) -> Released
//! ```
//!
//! [`CommandInvoker::start`] covers the first three states: the launch spec is
//! built, the process is spawned and the stdout drain is running before
//! control returns to the caller. [`RunningInvocation::wait`] covers the rest.
//! The process handle and all drain tasks are released on every path out of
//! `wait`, including errors.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::sync::Arc;

use tokio::process::Child;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::errors::{InvokeError, Result};
use crate::exec::drain::{DrainStats, spawn_stderr_collector, spawn_stdout_drain};
use crate::exec::probe::{ProcessProbe, SysinfoProbe};
use crate::exec::wait::{WaitStrategy, wait_for_exit};
use crate::exec::{AcceptedExitCodes, InvocationResult, InvokeRequest, LaunchSpec};
use crate::sink::{LogSink, SinkEntry, TracingSink};
use crate::tokens::TokenExpander;
use crate::types::StdoutMode;

/// Where an invocation is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationState {
    NotStarted,
    Started,
    Draining,
    Exited(i32),
    Released,
}

/// Runs external commands and reports through an injected [`LogSink`].
///
/// Holds no per-invocation state, so one invoker can be shared (cloned) by
/// any number of concurrent invocations.
#[derive(Debug, Clone)]
pub struct CommandInvoker {
    sink: Arc<dyn LogSink>,
    expander: TokenExpander,
    wait: WaitStrategy,
    probe: Arc<dyn ProcessProbe>,
}

impl Default for CommandInvoker {
    fn default() -> Self {
        Self::new(TracingSink)
    }
}

impl CommandInvoker {
    /// Blocking wait, process-environment token expansion, `sysinfo` probe.
    pub fn new(sink: impl LogSink + 'static) -> Self {
        Self::with_shared_sink(Arc::new(sink))
    }

    pub fn with_shared_sink(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            expander: TokenExpander::default(),
            wait: WaitStrategy::default(),
            probe: Arc::new(SysinfoProbe::new()),
        }
    }

    pub fn with_expander(mut self, expander: TokenExpander) -> Self {
        self.expander = expander;
        self
    }

    pub fn with_wait_strategy(mut self, wait: WaitStrategy) -> Self {
        self.wait = wait;
        self
    }

    pub fn with_probe(mut self, probe: impl ProcessProbe + 'static) -> Self {
        self.probe = Arc::new(probe);
        self
    }

    pub fn expander(&self) -> &TokenExpander {
        &self.expander
    }

    pub fn wait_strategy(&self) -> WaitStrategy {
        self.wait
    }

    /// Resolve the request into a launch spec, expanding tokens if asked to.
    pub fn launch_spec(&self, request: &InvokeRequest) -> Result<LaunchSpec> {
        if !request.expand_tokens {
            return Ok(LaunchSpec {
                working_dir: request.working_dir.clone(),
                executable: request.command.clone(),
                arguments: request.arguments.clone(),
            });
        }

        let working_dir = match request.working_dir.as_deref() {
            // Paths that are not valid UTF-8 cannot hold tokens we could parse.
            Some(dir) => match dir.to_str() {
                Some(s) => Some(PathBuf::from(self.expander.expand(s)?)),
                None => Some(dir.to_path_buf()),
            },
            None => None,
        };

        Ok(LaunchSpec {
            working_dir,
            executable: self.expander.expand(&request.command)?,
            arguments: self.expander.expand_opt(request.arguments.as_deref())?,
        })
    }

    /// Spawn the child and start draining its output.
    ///
    /// Must be called from within a Tokio runtime. Fails only if the launch
    /// spec cannot be built or the OS refuses to start the process.
    pub fn start(&self, request: InvokeRequest) -> Result<RunningInvocation> {
        let mut state = InvocationState::NotStarted;
        let spec = self.launch_spec(&request)?;
        let command_line = spec.command_line();

        let mut cmd = spec.to_command(request.stdout)?;
        self.sink
            .record(SinkEntry::Status(format!("running: {command_line}")));

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(source) => {
                self.sink
                    .record(SinkEntry::Status(format!("launch failed: {source}")));
                return Err(InvokeError::ProcessLaunch {
                    command_line,
                    source,
                });
            }
        };
        transition(&mut state, InvocationState::Started, &command_line);

        let pid = child.id();
        info!(command = %command_line, pid, "process started");

        let (lines_tx, lines_rx) = match (request.stdout, request.line_capacity) {
            (StdoutMode::Drain, Some(capacity)) => {
                let (tx, rx) = mpsc::channel(capacity);
                (Some(tx), Some(rx))
            }
            _ => (None, None),
        };

        let stdout_drain = child
            .stdout
            .take()
            .map(|stdout| spawn_stdout_drain(stdout, Arc::clone(&self.sink), lines_tx));
        let stderr_collector = child.stderr.take().map(spawn_stderr_collector);
        transition(&mut state, InvocationState::Draining, &command_line);

        Ok(RunningInvocation {
            child,
            pid,
            command_line,
            accepted: request.accepted,
            stdout_drain,
            stderr_collector,
            lines: lines_rx,
            sink: Arc::clone(&self.sink),
            probe: Arc::clone(&self.probe),
            wait: self.wait,
            state,
        })
    }

    /// Run the command to completion and return its result.
    ///
    /// The exit code is not judged here; see [`invoke_and_validate`](Self::invoke_and_validate).
    pub async fn invoke(&self, request: InvokeRequest) -> Result<InvocationResult> {
        self.start(request)?.wait().await
    }

    /// Run the command and fail with [`InvokeError::UnexpectedExitCode`] when
    /// the exit code is not in the request's accepted set.
    pub async fn invoke_and_validate(&self, request: InvokeRequest) -> Result<InvocationResult> {
        let accepted = request.accepted.clone();
        let result = self.invoke(request).await?;
        accepted.check(result.exit_code)?;
        Ok(result)
    }
}

/// A started child whose stdout is being drained.
#[derive(Debug)]
pub struct RunningInvocation {
    child: Child,
    pid: Option<u32>,
    command_line: String,
    accepted: AcceptedExitCodes,
    stdout_drain: Option<JoinHandle<DrainStats>>,
    stderr_collector: Option<JoinHandle<String>>,
    lines: Option<mpsc::Receiver<String>>,
    sink: Arc<dyn LogSink>,
    probe: Arc<dyn ProcessProbe>,
    wait: WaitStrategy,
    state: InvocationState,
}

impl RunningInvocation {
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    pub fn state(&self) -> InvocationState {
        self.state
    }

    /// Take the stdout line channel, if one was requested.
    ///
    /// Lines arrive in order; lines that do not fit are dropped for this
    /// receiver only and counted in [`InvocationResult::dropped_lines`].
    pub fn take_lines(&mut self) -> Option<mpsc::Receiver<String>> {
        self.lines.take()
    }

    /// Wait for exit, surface stderr, release everything.
    pub async fn wait(mut self) -> Result<InvocationResult> {
        let waited = wait_for_exit(&mut self.child, self.wait, &*self.probe, &*self.sink).await;

        let result = match waited {
            Ok(status) => Ok(self.finish(status).await),
            Err(source) => Err(InvokeError::Wait {
                command_line: self.command_line.clone(),
                source,
            }),
        };

        self.release();
        result
    }

    /// Wait, then check the exit code against the accepted set carried by the
    /// original request.
    pub async fn wait_and_validate(self) -> Result<InvocationResult> {
        let accepted = self.accepted.clone();
        let result = self.wait().await?;
        accepted.check(result.exit_code)?;
        Ok(result)
    }

    async fn finish(&mut self, status: ExitStatus) -> InvocationResult {
        let exit_code = exit_code(&status);
        transition(&mut self.state, InvocationState::Exited(exit_code), &self.command_line);

        // Every stdout line reaches the sink before anything else is reported.
        let stats = match self.stdout_drain.take() {
            Some(handle) => handle.await.unwrap_or_else(|e| {
                warn!(command = %self.command_line, error = %e, "stdout drain task failed");
                DrainStats::default()
            }),
            None => DrainStats::default(),
        };

        // The one and only full read of stderr, after termination.
        if let Some(handle) = self.stderr_collector.take() {
            match handle.await {
                Ok(text) if !text.trim().is_empty() => {
                    self.sink
                        .record(SinkEntry::Stderr(text.trim_end().to_string()));
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(command = %self.command_line, error = %e, "stderr collector task failed");
                }
            }
        }

        self.sink.record(SinkEntry::Status(format!(
            "finished with exit code {exit_code}"
        )));
        info!(
            command = %self.command_line,
            pid = self.pid,
            exit_code,
            success = status.success(),
            "process exited"
        );

        InvocationResult {
            exit_code,
            stdout_lines: stats.forwarded,
            dropped_lines: stats.dropped,
        }
    }

    fn release(&mut self) {
        if let Some(handle) = self.stdout_drain.take() {
            handle.abort();
        }
        if let Some(handle) = self.stderr_collector.take() {
            handle.abort();
        }
        transition(&mut self.state, InvocationState::Released, &self.command_line);
        debug!(command = %self.command_line, "process handle released");
    }
}

fn transition(state: &mut InvocationState, next: InvocationState, command_line: &str) {
    trace!(command = %command_line, from = ?state, to = ?next, "invocation state");
    *state = next;
}

/// Numeric exit code; termination by signal maps to -1.
fn exit_code(status: &ExitStatus) -> i32 {
    match status.code() {
        Some(code) => code,
        None => {
            #[cfg(unix)]
            {
                use std::os::unix::process::ExitStatusExt;
                warn!(signal = ?status.signal(), "process terminated by signal");
            }
            -1
        }
    }
}
