// src/sink/mod.rs

//! Destination for everything an invocation reports.
//!
//! The invoker never logs child output directly; it hands [`SinkEntry`]s to a
//! [`LogSink`] it was constructed with. Production code uses
//! [`TracingSink`], tests use [`MemorySink`] to inspect what was written.
//!
//! Implementations must tolerate concurrent `record` calls from several
//! invocations running at the same time.

use std::fmt::Debug;

use tracing::{debug, error, info};

use crate::exec::ProcessSnapshot;

pub mod memory;

pub use memory::MemorySink;

/// One append-only record produced by an invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEntry {
    /// Lifecycle status line written by the invoker itself.
    Status(String),
    /// One line of the child's standard output.
    Stdout(String),
    /// The child's complete standard error, surfaced once after exit.
    Stderr(String),
    /// Periodic snapshot emitted by the polling wait strategy.
    Diagnostic(ProcessSnapshot),
}

/// Append-only sink shared by invocations.
pub trait LogSink: Send + Sync + Debug {
    fn record(&self, entry: SinkEntry);
}

/// Sink that forwards entries to `tracing` under the `cmdinvoke::child` target.
///
/// - status and stdout lines at `INFO`
/// - stderr blocks at `ERROR`
/// - diagnostics at `DEBUG`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn record(&self, entry: SinkEntry) {
        match entry {
            SinkEntry::Status(line) => {
                info!(target: "cmdinvoke::child", "{line}");
            }
            SinkEntry::Stdout(line) => {
                info!(target: "cmdinvoke::child", stream = "stdout", "{line}");
            }
            SinkEntry::Stderr(block) => {
                error!(target: "cmdinvoke::child", stream = "stderr", "{block}");
            }
            SinkEntry::Diagnostic(snapshot) => {
                debug!(
                    target: "cmdinvoke::child",
                    pid = snapshot.pid,
                    memory_bytes = snapshot.memory_bytes,
                    virtual_memory_bytes = snapshot.virtual_memory_bytes,
                    cpu_percent = snapshot.cpu_percent,
                    cpu_time_ms = snapshot.cpu_time_estimate.as_millis() as u64,
                    run_time_s = snapshot.run_time.as_secs(),
                    priority = ?snapshot.priority,
                    responsive = snapshot.responsive,
                    status = %snapshot.status,
                    "process still running"
                );
            }
        }
    }
}
