// src/exec/wait.rs

//! Wait strategies for a started child.
//!
//! Neither strategy ever kills the child: the poll interval only paces
//! diagnostics. stderr is not touched here at all; it is drained exactly once,
//! after termination, by the invoker.

use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;
use tokio::time::{Instant, timeout};
use tracing::debug;

use crate::exec::probe::{ProcessProbe, ProcessSnapshot};
use crate::sink::{LogSink, SinkEntry};

/// Default interval between diagnostic snapshots.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Shorter intervals are raised to this to keep polling from spinning.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How the invoker waits for termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitStrategy {
    /// Wait unconditionally for exit.
    #[default]
    Blocking,
    /// Wait in slices of `interval`; after each slice that ends with the child
    /// still running, write a diagnostic snapshot to the sink.
    Polling { interval: Duration },
}

impl WaitStrategy {
    pub fn polling() -> Self {
        WaitStrategy::Polling {
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Wait until `child` exits using `strategy`.
pub async fn wait_for_exit(
    child: &mut Child,
    strategy: WaitStrategy,
    probe: &dyn ProcessProbe,
    sink: &dyn LogSink,
) -> std::io::Result<ExitStatus> {
    match strategy {
        WaitStrategy::Blocking => child.wait().await,
        WaitStrategy::Polling { interval } => poll_until_exit(child, interval, probe, sink).await,
    }
}

async fn poll_until_exit(
    child: &mut Child,
    interval: Duration,
    probe: &dyn ProcessProbe,
    sink: &dyn LogSink,
) -> std::io::Result<ExitStatus> {
    let interval = interval.max(MIN_POLL_INTERVAL);
    let pid = child.id();
    let mut cpu_time = Duration::ZERO;
    let mut last = Instant::now();

    loop {
        // `Child::wait` is cancel safe, so timing out a slice loses nothing.
        if let Ok(status) = timeout(interval, child.wait()).await {
            return status;
        }

        let Some(pid) = pid else {
            continue;
        };

        let now = Instant::now();
        let elapsed = now.duration_since(last);
        last = now;

        match probe.probe(pid) {
            Some(reading) => {
                cpu_time += cpu_share(elapsed, reading.cpu_percent);
                let snapshot = ProcessSnapshot::from_reading(pid, reading, cpu_time);
                sink.record(SinkEntry::Diagnostic(snapshot));
            }
            None => debug!(pid, "no diagnostics available for running process"),
        }
    }
}

/// Processor time consumed over `elapsed` at `cpu_percent` usage.
fn cpu_share(elapsed: Duration, cpu_percent: f32) -> Duration {
    if !cpu_percent.is_finite() || cpu_percent <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(elapsed.as_secs_f64() * f64::from(cpu_percent) / 100.0)
}
