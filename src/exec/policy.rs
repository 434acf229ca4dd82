// src/exec/policy.rs

//! Exit-code acceptance.

use std::collections::BTreeSet;

use crate::errors::{InvokeError, Result};

/// Whether `actual` is acceptable given a default code and extra codes.
///
/// With no extra codes only `default_code` is accepted.
pub fn accepts(actual: i32, default_code: i32, extra: &BTreeSet<i32>) -> bool {
    actual == default_code || extra.contains(&actual)
}

/// The default exit code plus any additional codes a caller approves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedExitCodes {
    default_code: i32,
    extra: BTreeSet<i32>,
}

impl Default for AcceptedExitCodes {
    fn default() -> Self {
        Self::new(0)
    }
}

impl AcceptedExitCodes {
    pub fn new(default_code: i32) -> Self {
        Self {
            default_code,
            extra: BTreeSet::new(),
        }
    }

    /// Add extra accepted codes. Duplicates and the default itself are
    /// harmless.
    pub fn with_extra(mut self, codes: impl IntoIterator<Item = i32>) -> Self {
        self.extra.extend(codes);
        self
    }

    pub fn default_code(&self) -> i32 {
        self.default_code
    }

    pub fn extra(&self) -> &BTreeSet<i32> {
        &self.extra
    }

    pub fn accepts(&self, actual: i32) -> bool {
        accepts(actual, self.default_code, &self.extra)
    }

    /// `Ok(())` if accepted, otherwise [`InvokeError::UnexpectedExitCode`].
    pub fn check(&self, actual: i32) -> Result<()> {
        if self.accepts(actual) {
            Ok(())
        } else {
            Err(InvokeError::UnexpectedExitCode {
                actual,
                default_code: self.default_code,
                extra: self.extra.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_extra_accepts_only_default() {
        let codes = AcceptedExitCodes::new(0);
        assert!(codes.accepts(0));
        assert!(!codes.accepts(1));
        assert!(!codes.accepts(-1));
    }

    #[test]
    fn extra_codes_are_accepted_alongside_default() {
        let codes = AcceptedExitCodes::new(0).with_extra([1, 3]);
        assert!(codes.accepts(0));
        assert!(codes.accepts(1));
        assert!(codes.accepts(3));
        assert!(!codes.accepts(2));
    }

    #[test]
    fn non_zero_default() {
        let codes = AcceptedExitCodes::new(2);
        assert!(codes.accepts(2));
        assert!(!codes.accepts(0));
    }

    #[test]
    fn check_reports_actual_and_accepted_codes() {
        let codes = AcceptedExitCodes::new(0).with_extra([4]);
        match codes.check(1) {
            Err(InvokeError::UnexpectedExitCode {
                actual,
                default_code,
                extra,
            }) => {
                assert_eq!(actual, 1);
                assert_eq!(default_code, 0);
                assert_eq!(extra, BTreeSet::from([4]));
            }
            other => panic!("expected UnexpectedExitCode, got {other:?}"),
        }
        assert!(codes.check(4).is_ok());
    }
}
