// src/sink/memory.rs

use std::sync::{Arc, Mutex};

use super::{LogSink, SinkEntry};
use crate::exec::ProcessSnapshot;

/// Sink that keeps every entry in memory, in arrival order.
///
/// Clones share the same buffer, so a test can hand one clone to the invoker
/// and inspect another.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<SinkEntry>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<SinkEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn stdout_lines(&self) -> Vec<String> {
        self.filter(|entry| match entry {
            SinkEntry::Stdout(line) => Some(line.clone()),
            _ => None,
        })
    }

    pub fn stderr_blocks(&self) -> Vec<String> {
        self.filter(|entry| match entry {
            SinkEntry::Stderr(block) => Some(block.clone()),
            _ => None,
        })
    }

    pub fn statuses(&self) -> Vec<String> {
        self.filter(|entry| match entry {
            SinkEntry::Status(line) => Some(line.clone()),
            _ => None,
        })
    }

    pub fn diagnostics(&self) -> Vec<ProcessSnapshot> {
        self.filter(|entry| match entry {
            SinkEntry::Diagnostic(snapshot) => Some(snapshot.clone()),
            _ => None,
        })
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    fn filter<T>(&self, f: impl Fn(&SinkEntry) -> Option<T>) -> Vec<T> {
        self.entries.lock().unwrap().iter().filter_map(f).collect()
    }
}

impl LogSink for MemorySink {
    fn record(&self, entry: SinkEntry) {
        self.entries.lock().unwrap().push(entry);
    }
}
