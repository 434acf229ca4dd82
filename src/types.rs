use std::str::FromStr;
use serde::Deserialize;

/// What token expansion does when a `%NAME%` variable is not defined.
///
/// - `Sentinel`: substitute a visible marker (`$NAME_UNDEFINED$`) and keep
///   going, logging a warning (default behaviour).
/// - `Fail`: abort the expansion with an `UndefinedVariable` error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UndefinedPolicy {
    Sentinel,
    Fail,
}

impl Default for UndefinedPolicy {
    fn default() -> Self {
        UndefinedPolicy::Sentinel
    }
}

impl FromStr for UndefinedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sentinel" => Ok(UndefinedPolicy::Sentinel),
            "fail" => Ok(UndefinedPolicy::Fail),
            other => Err(format!(
                "invalid undefined variable policy: {other} (expected \"sentinel\" or \"fail\")"
            )),
        }
    }
}

/// How the invoker waits for the child, as named in configuration.
///
/// The polling interval lives next to it in `[invoke]`; see
/// `exec::WaitStrategy` for the resolved form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WaitMode {
    /// Wait unconditionally for exit.
    Blocking,
    /// Wait in bounded slices and emit diagnostics between them.
    Polling,
}

impl Default for WaitMode {
    fn default() -> Self {
        WaitMode::Blocking
    }
}

impl FromStr for WaitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "blocking" => Ok(WaitMode::Blocking),
            "polling" => Ok(WaitMode::Polling),
            other => Err(format!(
                "invalid wait mode: {other} (expected \"blocking\" or \"polling\")"
            )),
        }
    }
}

/// What happens to the child's standard output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StdoutMode {
    /// Pipe stdout and forward each line to the sink (default).
    Drain,
    /// Let the child write straight to our own stdout.
    Inherit,
}

impl Default for StdoutMode {
    fn default() -> Self {
        StdoutMode::Drain
    }
}
