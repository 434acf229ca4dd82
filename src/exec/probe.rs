// src/exec/probe.rs

//! Liveness and resource diagnostics for a running child.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use sysinfo::{Pid, ProcessRefreshKind, ProcessStatus, System};

/// Raw values read from the OS for one process at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReading {
    pub memory_bytes: u64,
    pub virtual_memory_bytes: u64,
    /// CPU usage since the previous reading of this process, in percent of
    /// one core (may exceed 100 on multi-core machines).
    pub cpu_percent: f32,
    pub run_time: Duration,
    /// Scheduling priority (nice value on Unix), when available.
    pub priority: Option<i32>,
    pub responsive: bool,
    pub status: String,
}

/// Snapshot written to the sink while polling a still-running child.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessSnapshot {
    pub pid: u32,
    pub memory_bytes: u64,
    pub virtual_memory_bytes: u64,
    pub cpu_percent: f32,
    /// Processor time accumulated so far, integrated from CPU usage over
    /// the poll intervals.
    pub cpu_time_estimate: Duration,
    pub run_time: Duration,
    pub priority: Option<i32>,
    pub responsive: bool,
    pub status: String,
}

impl ProcessSnapshot {
    pub fn from_reading(pid: u32, reading: ProbeReading, cpu_time_estimate: Duration) -> Self {
        Self {
            pid,
            memory_bytes: reading.memory_bytes,
            virtual_memory_bytes: reading.virtual_memory_bytes,
            cpu_percent: reading.cpu_percent,
            cpu_time_estimate,
            run_time: reading.run_time,
            priority: reading.priority,
            responsive: reading.responsive,
            status: reading.status,
        }
    }
}

/// Source of [`ProbeReading`]s, swappable in tests.
pub trait ProcessProbe: Send + Sync + std::fmt::Debug {
    /// Read the current state of `pid`. `None` if the process is gone or the
    /// platform cannot report on it.
    fn probe(&self, pid: u32) -> Option<ProbeReading>;
}

/// Probe backed by `sysinfo`.
///
/// The inner `System` is kept between calls so CPU usage is measured relative
/// to the previous reading of the same process.
#[derive(Debug, Clone)]
pub struct SysinfoProbe {
    system: Arc<Mutex<System>>,
}

impl SysinfoProbe {
    pub fn new() -> Self {
        Self {
            system: Arc::new(Mutex::new(System::new())),
        }
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessProbe for SysinfoProbe {
    fn probe(&self, pid: u32) -> Option<ProbeReading> {
        let mut system = self.system.lock().ok()?;
        let sysinfo_pid = Pid::from_u32(pid);

        // Only memory and CPU are refreshed; the rest stays untouched.
        if !system.refresh_process_specifics(
            sysinfo_pid,
            ProcessRefreshKind::new().with_memory().with_cpu(),
        ) {
            return None;
        }

        let process = system.process(sysinfo_pid)?;
        let status = process.status();

        Some(ProbeReading {
            memory_bytes: process.memory(),
            virtual_memory_bytes: process.virtual_memory(),
            cpu_percent: process.cpu_usage(),
            run_time: Duration::from_secs(process.run_time()),
            priority: process_priority(pid),
            responsive: is_responsive(status),
            status: status.to_string(),
        })
    }
}

/// A process that is stopped, traced or already dead is not making progress.
fn is_responsive(status: ProcessStatus) -> bool {
    !matches!(
        status,
        ProcessStatus::Stop | ProcessStatus::Zombie | ProcessStatus::Dead | ProcessStatus::Tracing
    )
}

/// `-1` is both a valid nice value and the error return, so errno decides.
#[cfg(unix)]
fn process_priority(pid: u32) -> Option<i32> {
    clear_errno();
    // SAFETY: getpriority only reads scheduler state for the given pid.
    let nice = unsafe { libc::getpriority(libc::PRIO_PROCESS, pid as libc::id_t) };
    if nice == -1 {
        let errno = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);
        if errno != 0 {
            return None;
        }
    }
    Some(nice)
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn clear_errno() {
    // SAFETY: the pointer refers to this thread's errno.
    unsafe { *libc::__errno_location() = 0 };
}

#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "dragonfly"
))]
fn clear_errno() {
    // SAFETY: the pointer refers to this thread's errno.
    unsafe { *libc::__error() = 0 };
}

#[cfg(all(
    unix,
    not(any(
        target_os = "linux",
        target_os = "android",
        target_os = "macos",
        target_os = "ios",
        target_os = "freebsd",
        target_os = "dragonfly"
    ))
))]
fn clear_errno() {}

#[cfg(not(unix))]
fn process_priority(_pid: u32) -> Option<i32> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probes_the_current_process() {
        let probe = SysinfoProbe::new();
        let reading = probe
            .probe(std::process::id())
            .expect("current process must be visible");
        assert!(reading.memory_bytes > 0);
        assert!(reading.responsive);
    }

    #[test]
    fn unknown_pid_yields_none() {
        let probe = SysinfoProbe::new();
        // PIDs are bounded well below this on every supported platform.
        assert!(probe.probe(u32::MAX - 7).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn priority_of_a_missing_pid_is_unknown() {
        assert_eq!(process_priority(u32::MAX - 7), None);
    }

    #[cfg(unix)]
    #[test]
    fn priority_of_the_current_process_is_known() {
        assert!(process_priority(std::process::id()).is_some());
    }

    #[test]
    fn stopped_and_zombie_processes_are_unresponsive() {
        assert!(!is_responsive(ProcessStatus::Zombie));
        assert!(!is_responsive(ProcessStatus::Stop));
        assert!(is_responsive(ProcessStatus::Run));
        assert!(is_responsive(ProcessStatus::Sleep));
    }
}
