// src/exec/request.rs

//! Per-call request and result types.

use std::path::PathBuf;

use crate::exec::AcceptedExitCodes;
use crate::types::StdoutMode;

/// Default capacity of the optional stdout subscriber channel.
pub const DEFAULT_LINE_CAPACITY: usize = 256;

/// Everything a caller specifies for one invocation.
///
/// Defaults:
/// - no arguments (interpreter mode), no working directory
/// - accepted exit codes `{0}`
/// - stdout drained to the sink, no subscriber channel
/// - `%NAME%` tokens expanded in command, arguments and working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeRequest {
    pub command: String,
    pub arguments: Option<String>,
    pub working_dir: Option<PathBuf>,
    pub accepted: AcceptedExitCodes,
    pub stdout: StdoutMode,
    pub expand_tokens: bool,
    /// `Some(capacity)` opens a bounded channel of stdout lines.
    pub line_capacity: Option<usize>,
}

impl InvokeRequest {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            arguments: None,
            working_dir: None,
            accepted: AcceptedExitCodes::default(),
            stdout: StdoutMode::default(),
            expand_tokens: true,
            line_capacity: None,
        }
    }

    pub fn arguments(mut self, arguments: impl Into<String>) -> Self {
        self.arguments = Some(arguments.into());
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn accepted(mut self, accepted: AcceptedExitCodes) -> Self {
        self.accepted = accepted;
        self
    }

    /// Replace the default accepted code, keeping any extra codes.
    pub fn default_code(mut self, code: i32) -> Self {
        self.accepted = AcceptedExitCodes::new(code).with_extra(self.accepted.extra().clone());
        self
    }

    /// Accept `code` in addition to the default.
    pub fn accept(mut self, code: i32) -> Self {
        self.accepted = self.accepted.with_extra([code]);
        self
    }

    pub fn stdout(mut self, mode: StdoutMode) -> Self {
        self.stdout = mode;
        self
    }

    pub fn expand_tokens(mut self, expand: bool) -> Self {
        self.expand_tokens = expand;
        self
    }

    /// Ask for a channel of stdout lines with room for `capacity` lines
    /// (at least 1). Ignored when stdout is inherited.
    pub fn subscribe_lines(mut self, capacity: usize) -> Self {
        self.line_capacity = Some(capacity.max(1));
        self
    }
}

/// Outcome of one finished invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvocationResult {
    pub exit_code: i32,
    /// Non-empty stdout lines written to the sink.
    pub stdout_lines: usize,
    /// Lines the subscriber channel had no room for.
    pub dropped_lines: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documentation() {
        let req = InvokeRequest::new("echo hi");
        assert_eq!(req.arguments, None);
        assert_eq!(req.working_dir, None);
        assert_eq!(req.accepted, AcceptedExitCodes::new(0));
        assert_eq!(req.stdout, StdoutMode::Drain);
        assert!(req.expand_tokens);
        assert_eq!(req.line_capacity, None);
    }

    #[test]
    fn default_code_keeps_extra_codes() {
        let req = InvokeRequest::new("x").accept(3).default_code(1);
        assert_eq!(req.accepted.default_code(), 1);
        assert!(req.accepted.accepts(3));
        assert!(!req.accepted.accepts(0));
    }

    #[test]
    fn subscriber_capacity_is_at_least_one() {
        assert_eq!(InvokeRequest::new("x").subscribe_lines(0).line_capacity, Some(1));
    }
}
