// src/tokens/path.rs

//! Path normalisation: token expansion plus an optional trailing separator.

use std::path::MAIN_SEPARATOR;

use tracing::trace;

use crate::errors::Result;
use crate::tokens::TokenExpander;

/// Expand tokens in `path` and, if `append_separator` is set, make sure the
/// result ends with the platform separator.
///
/// An empty input is returned unchanged (no separator is appended).
pub fn normalize_path(
    expander: &TokenExpander,
    path: &str,
    append_separator: bool,
) -> Result<String> {
    trace!(path, "normalising path");
    if path.is_empty() {
        return Ok(String::new());
    }

    let mut normalized = expander.expand(path)?;
    if append_separator && !normalized.ends_with(MAIN_SEPARATOR) {
        normalized.push(MAIN_SEPARATOR);
    }

    trace!(path = %normalized, "normalised path");
    Ok(normalized)
}

/// Directory form of [`normalize_path`]: always appends the separator.
pub fn normalize_dir(expander: &TokenExpander, path: &str) -> Result<String> {
    normalize_path(expander, path, true)
}
