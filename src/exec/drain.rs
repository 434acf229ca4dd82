// src/exec/drain.rs

//! Background readers for the child's output pipes.
//!
//! - stdout is drained line by line while the caller waits; every line goes
//!   to the sink, and optionally to a bounded subscriber channel.
//! - stderr is buffered whole and only surfaced once the child has exited.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::sink::{LogSink, SinkEntry};

/// Counters reported by the stdout drain when it reaches end of stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainStats {
    /// Lines written to the sink.
    pub forwarded: usize,
    /// Lines the subscriber channel had no room for.
    pub dropped: usize,
}

/// Spawn the stdout drain.
///
/// Backpressure: the sink receives every non-empty line in arrival order.
/// The subscriber channel is filled with `try_send`; a full channel drops the
/// line for the subscriber only, so a slow consumer never stalls the child.
/// A closed channel simply stops further sends.
pub fn spawn_stdout_drain<R>(
    stdout: R,
    sink: Arc<dyn LogSink>,
    mut subscriber: Option<mpsc::Sender<String>>,
) -> JoinHandle<DrainStats>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        let mut stats = DrainStats::default();

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "stdout drain stopped on read error");
                    break;
                }
            }

            let line = decode_line(&buf);
            if line.is_empty() {
                continue;
            }

            if let Some(tx) = subscriber.as_ref() {
                match tx.try_send(line.clone()) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => stats.dropped += 1,
                    Err(TrySendError::Closed(_)) => {
                        debug!("stdout subscriber went away; lines go to the sink only");
                        subscriber = None;
                    }
                }
            }

            sink.record(SinkEntry::Stdout(line));
            stats.forwarded += 1;
        }

        stats
    })
}

/// Spawn the stderr collector. Resolves to everything the child wrote.
pub fn spawn_stderr_collector<R>(stderr: R) -> JoinHandle<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = stderr;
        let mut buf = Vec::new();
        if let Err(e) = reader.read_to_end(&mut buf).await {
            warn!(error = %e, "stderr collection stopped on read error");
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

/// Lossy UTF-8 decode without the trailing `\n` / `\r\n`.
fn decode_line(raw: &[u8]) -> String {
    let mut end = raw.len();
    if end > 0 && raw[end - 1] == b'\n' {
        end -= 1;
        if end > 0 && raw[end - 1] == b'\r' {
            end -= 1;
        }
    }
    String::from_utf8_lossy(&raw[..end]).into_owned()
}
