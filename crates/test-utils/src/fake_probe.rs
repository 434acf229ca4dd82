use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use cmdinvoke::exec::{ProbeReading, ProcessProbe};

/// A probe that:
/// - counts how often it was asked
/// - always reports the same reading.
#[derive(Debug, Clone)]
pub struct StaticProbe {
    reading: ProbeReading,
    calls: Arc<AtomicUsize>,
}

impl StaticProbe {
    pub fn new() -> Self {
        Self::with_reading(ProbeReading {
            memory_bytes: 4 * 1024 * 1024,
            virtual_memory_bytes: 16 * 1024 * 1024,
            cpu_percent: 50.0,
            run_time: Duration::from_secs(1),
            priority: Some(0),
            responsive: true,
            status: "Sleeping".to_string(),
        })
    }

    pub fn with_reading(reading: ProbeReading) -> Self {
        Self {
            reading,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for StaticProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessProbe for StaticProbe {
    fn probe(&self, _pid: u32) -> Option<ProbeReading> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Some(self.reading.clone())
    }
}
