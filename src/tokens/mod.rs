// src/tokens/mod.rs

//! `%NAME%` environment-token expansion.
//!
//! - [`env`] defines the [`EnvSource`] seam and the real process environment.
//! - [`mock`] holds an in-memory environment for tests.
//! - [`expander`] owns the expansion loop and the undefined-variable policy.
//! - [`path`] builds path normalisation on top of the expander.
//!
//! A single [`TokenExpander`] is meant to be shared by every call site
//! (paths, commands, arguments) so the undefined-variable policy is applied
//! uniformly.

pub mod env;
pub mod expander;
pub mod mock;
pub mod path;

pub use env::{EnvSource, ProcessEnv};
pub use crate::types::UndefinedPolicy;
pub use expander::{DEFAULT_MAX_PASSES, TokenExpander, expand_tokens, undefined_sentinel};
pub use mock::MapEnv;
pub use path::{normalize_dir, normalize_path};
