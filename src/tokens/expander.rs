// src/tokens/expander.rs

//! The `%NAME%` expansion loop.
//!
//! Each pass finds the leftmost token, resolves it and replaces **every**
//! occurrence of that token. Passes repeat until no token is left, so values
//! that themselves contain tokens are expanded too.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{trace, warn};

use crate::errors::{InvokeError, Result};
use crate::tokens::{EnvSource, ProcessEnv};
use crate::types::UndefinedPolicy;

/// Upper bound on substitution passes for a single input.
pub const DEFAULT_MAX_PASSES: usize = 256;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%([A-Za-z0-9_()]+)%").expect("token regex is valid"));

/// Text substituted for an undefined variable under [`UndefinedPolicy::Sentinel`].
pub fn undefined_sentinel(name: &str) -> String {
    format!("${name}_UNDEFINED$")
}

/// Expands `%NAME%` tokens against an [`EnvSource`].
///
/// Cloning is cheap; clones share the same environment source.
#[derive(Debug, Clone)]
pub struct TokenExpander {
    env: Arc<dyn EnvSource>,
    policy: UndefinedPolicy,
    max_passes: usize,
}

impl Default for TokenExpander {
    fn default() -> Self {
        Self::new(ProcessEnv)
    }
}

impl TokenExpander {
    pub fn new(env: impl EnvSource + 'static) -> Self {
        Self {
            env: Arc::new(env),
            policy: UndefinedPolicy::default(),
            max_passes: DEFAULT_MAX_PASSES,
        }
    }

    pub fn with_policy(mut self, policy: UndefinedPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Values below 1 are clamped to 1.
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes.max(1);
        self
    }

    pub fn policy(&self) -> UndefinedPolicy {
        self.policy
    }

    pub fn max_passes(&self) -> usize {
        self.max_passes
    }

    /// Expand all tokens in `input`.
    ///
    /// Errors:
    /// - [`InvokeError::UndefinedVariable`] under [`UndefinedPolicy::Fail`].
    /// - [`InvokeError::CyclicToken`] when a value contains its own token or
    ///   the pass limit is exhausted.
    pub fn expand(&self, input: &str) -> Result<String> {
        let mut current = input.to_string();
        let mut passes = 0usize;

        while let Some(name) = next_token(&current) {
            if passes >= self.max_passes {
                return Err(InvokeError::CyclicToken { name, passes });
            }
            passes += 1;

            let token = format!("%{name}%");
            let value = self.resolve(&name)?;
            if value.contains(&token) {
                return Err(InvokeError::CyclicToken { name, passes });
            }

            current = current.replace(&token, &value);
        }

        if passes > 0 {
            trace!(input, output = %current, passes, "expanded environment tokens");
        }
        Ok(current)
    }

    /// Expand an optional string, passing `None` through.
    pub fn expand_opt(&self, input: Option<&str>) -> Result<Option<String>> {
        input.map(|s| self.expand(s)).transpose()
    }

    fn resolve(&self, name: &str) -> Result<String> {
        match self.env.var(name) {
            Some(value) => Ok(value),
            None => match self.policy {
                UndefinedPolicy::Sentinel => {
                    warn!(variable = name, "environment variable is not defined");
                    Ok(undefined_sentinel(name))
                }
                UndefinedPolicy::Fail => Err(InvokeError::UndefinedVariable(name.to_string())),
            },
        }
    }
}

/// Name of the leftmost `%NAME%` token, if any.
fn next_token(s: &str) -> Option<String> {
    TOKEN_RE
        .captures(s)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Expand tokens against the process environment with the default policy.
pub fn expand_tokens(input: &str) -> Result<String> {
    TokenExpander::default().expand(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::MapEnv;

    fn expander(env: MapEnv) -> TokenExpander {
        TokenExpander::new(env)
    }

    #[test]
    fn replaces_every_occurrence_of_a_token() {
        let env = MapEnv::new().with("X", "val");
        let out = expander(env).expand("A%X%B%X%").unwrap();
        assert_eq!(out, "AvalBval");
    }

    #[test]
    fn expansion_is_idempotent_once_no_tokens_remain() {
        let exp = expander(MapEnv::new().with("X", "val"));
        let once = exp.expand("A%X%B%X%").unwrap();
        assert_eq!(exp.expand(&once).unwrap(), once);
    }

    #[test]
    fn nested_values_are_expanded() {
        let env = MapEnv::new()
            .with("ROOT", "/opt/%APP%")
            .with("APP", "tool");
        let out = expander(env).expand("%ROOT%/bin").unwrap();
        assert_eq!(out, "/opt/tool/bin");
    }

    #[test]
    fn names_may_contain_parentheses_and_underscores() {
        let env = MapEnv::new().with("ProgramFiles(x86)", "C:\\PF86").with("MY_VAR", "v");
        let out = expander(env)
            .expand("%ProgramFiles(x86)%\\%MY_VAR%")
            .unwrap();
        assert_eq!(out, "C:\\PF86\\v");
    }

    #[test]
    fn percent_signs_around_non_token_text_are_left_alone() {
        let exp = expander(MapEnv::new());
        assert_eq!(exp.expand("50% of 100%").unwrap(), "50% of 100%");
        assert_eq!(exp.expand("%%").unwrap(), "%%");
        assert_eq!(exp.expand("").unwrap(), "");
    }

    #[test]
    fn undefined_variable_yields_sentinel_by_default() {
        let out = expander(MapEnv::new()).expand("a/%MISSING%/b").unwrap();
        assert_eq!(out, "a/$MISSING_UNDEFINED$/b");
    }

    #[test]
    fn undefined_variable_fails_under_fail_policy() {
        let exp = expander(MapEnv::new()).with_policy(UndefinedPolicy::Fail);
        match exp.expand("%MISSING%") {
            Err(InvokeError::UndefinedVariable(name)) => assert_eq!(name, "MISSING"),
            other => panic!("expected UndefinedVariable, got {other:?}"),
        }
    }

    #[test]
    fn empty_value_counts_as_defined() {
        let exp = expander(MapEnv::new().with("EMPTY", "")).with_policy(UndefinedPolicy::Fail);
        assert_eq!(exp.expand("a%EMPTY%b").unwrap(), "ab");
    }

    #[test]
    fn self_referencing_value_is_cyclic() {
        let exp = expander(MapEnv::new().with("X", "again %X%"));
        match exp.expand("%X%") {
            Err(InvokeError::CyclicToken { name, .. }) => assert_eq!(name, "X"),
            other => panic!("expected CyclicToken, got {other:?}"),
        }
    }

    #[test]
    fn mutual_recursion_hits_pass_limit() {
        let env = MapEnv::new().with("A", "%B%").with("B", "%A%");
        let exp = expander(env).with_max_passes(8);
        match exp.expand("%A%") {
            Err(InvokeError::CyclicToken { passes, .. }) => assert_eq!(passes, 8),
            other => panic!("expected CyclicToken, got {other:?}"),
        }
    }

    #[test]
    fn zero_max_passes_is_clamped() {
        let exp = expander(MapEnv::new().with("X", "1")).with_max_passes(0);
        assert_eq!(exp.max_passes(), 1);
        assert_eq!(exp.expand("%X%").unwrap(), "1");
    }

    #[test]
    fn expand_opt_passes_none_through() {
        let exp = expander(MapEnv::new().with("X", "1"));
        assert_eq!(exp.expand_opt(None).unwrap(), None);
        assert_eq!(exp.expand_opt(Some("%X%")).unwrap().as_deref(), Some("1"));
    }
}
