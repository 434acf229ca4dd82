// src/exec/mod.rs

//! Process execution layer.
//!
//! This module runs external commands with `tokio::process::Command` and
//! reports what happens through a [`LogSink`](crate::sink::LogSink).
//!
//! - [`launch`] turns a request into a [`LaunchSpec`] (interpreter vs direct
//!   mode, working-directory fallback).
//! - [`invoker`] owns the lifecycle of one child: [`CommandInvoker`] and
//!   [`RunningInvocation`].
//! - [`drain`] holds the background stdout drain and stderr collector.
//! - [`wait`] implements the blocking and polling [`WaitStrategy`]s.
//! - [`probe`] provides diagnostics snapshots for the polling strategy.
//! - [`policy`] decides whether an exit code is acceptable.
//! - [`request`] defines [`InvokeRequest`] and [`InvocationResult`].

pub mod drain;
pub mod invoker;
pub mod launch;
pub mod policy;
pub mod probe;
pub mod request;
pub mod wait;

pub use drain::DrainStats;
pub use invoker::{CommandInvoker, InvocationState, RunningInvocation};
pub use launch::{LaunchMode, LaunchSpec};
pub use policy::{AcceptedExitCodes, accepts};
pub use probe::{ProbeReading, ProcessProbe, ProcessSnapshot, SysinfoProbe};
pub use request::{DEFAULT_LINE_CAPACITY, InvocationResult, InvokeRequest};
pub use wait::{DEFAULT_POLL_INTERVAL, WaitStrategy};
