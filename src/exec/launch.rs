// src/exec/launch.rs

//! Launch specification: what gets handed to the OS process-creation call.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::errors::Result;
use crate::types::StdoutMode;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// How the executable string is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// No arguments: `executable` is a full command line run through the
    /// system interpreter (`cmd /C` on Windows, `sh -c` elsewhere).
    Interpreter,
    /// Arguments present: `executable` is run directly, no shell involved.
    Direct,
}

/// Resolved executable, arguments and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub working_dir: Option<PathBuf>,
    pub executable: String,
    pub arguments: Option<String>,
}

impl LaunchSpec {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            working_dir: None,
            executable: executable.into(),
            arguments: None,
        }
    }

    pub fn with_arguments(mut self, arguments: impl Into<String>) -> Self {
        self.arguments = Some(arguments.into());
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Decided solely by whether the argument string is empty.
    pub fn mode(&self) -> LaunchMode {
        match self.arguments.as_deref() {
            Some(args) if !args.is_empty() => LaunchMode::Direct,
            _ => LaunchMode::Interpreter,
        }
    }

    /// The program actually started.
    pub fn program(&self) -> &str {
        match self.mode() {
            LaunchMode::Direct => &self.executable,
            LaunchMode::Interpreter => interpreter().0,
        }
    }

    /// The parameter string given to [`program`](Self::program).
    pub fn parameters(&self) -> String {
        match self.mode() {
            LaunchMode::Direct => self.arguments.clone().unwrap_or_default(),
            LaunchMode::Interpreter => format!("{} {}", interpreter().1, self.executable),
        }
    }

    /// Human-readable command line, used in logs and launch errors.
    pub fn command_line(&self) -> String {
        format!("{} {}", self.program(), self.parameters())
    }

    /// The working directory to apply, if any.
    ///
    /// A directory that does not exist is ignored and the child inherits the
    /// caller's working directory.
    pub fn effective_working_dir(&self) -> Option<&Path> {
        let dir = self.working_dir.as_deref()?;
        if dir.as_os_str().is_empty() {
            return None;
        }
        if dir.is_dir() {
            Some(dir)
        } else {
            debug!(
                working_dir = %dir.display(),
                "working directory does not exist; using the current directory"
            );
            None
        }
    }

    /// Build the Tokio command: stderr piped, stdout piped or inherited.
    pub fn to_command(&self, stdout: StdoutMode) -> Result<Command> {
        let mut cmd = Command::new(self.program());
        self.apply_parameters(&mut cmd)?;

        if let Some(dir) = self.effective_working_dir() {
            cmd.current_dir(dir);
        }

        let stdout = match stdout {
            StdoutMode::Drain => Stdio::piped(),
            StdoutMode::Inherit => Stdio::inherit(),
        };
        cmd.stdout(stdout).stderr(Stdio::piped());

        #[cfg(windows)]
        cmd.creation_flags(CREATE_NO_WINDOW);

        Ok(cmd)
    }

    #[cfg(windows)]
    fn apply_parameters(&self, cmd: &mut Command) -> Result<()> {
        // cmd.exe and most Windows programs parse their own command line.
        cmd.raw_arg(self.parameters());
        Ok(())
    }

    #[cfg(not(windows))]
    fn apply_parameters(&self, cmd: &mut Command) -> Result<()> {
        match self.mode() {
            LaunchMode::Interpreter => {
                cmd.arg(interpreter().1).arg(&self.executable);
            }
            LaunchMode::Direct => {
                let raw = self.arguments.as_deref().unwrap_or_default();
                let args = shell_words::split(raw).map_err(|e| {
                    crate::errors::InvokeError::ProcessLaunch {
                        command_line: self.command_line(),
                        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
                    }
                })?;
                cmd.args(args);
            }
        }
        Ok(())
    }
}

/// Interpreter program and its "run this line" flag.
fn interpreter() -> (&'static str, &'static str) {
    if cfg!(windows) {
        ("cmd", "/C")
    } else {
        ("sh", "-c")
    }
}
