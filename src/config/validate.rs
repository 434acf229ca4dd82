// src/config/validate.rs

use crate::config::duration::parse_duration;
use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{InvokeError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::InvokeError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        let poll_interval = parse_duration(&raw.invoke.poll_interval)
            .map_err(|e| InvokeError::ConfigError(format!("[invoke].poll_interval: {e}")))?;
        Ok(ConfigFile::new_unchecked(raw.invoke, raw.tokens, poll_interval))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_invoke_section(cfg)?;
    validate_tokens_section(cfg)?;
    Ok(())
}

fn validate_invoke_section(cfg: &RawConfigFile) -> Result<()> {
    // `wait` and `stdout` are strongly typed and validated during
    // deserialization, so only the free-form values are checked here.
    let interval = parse_duration(&cfg.invoke.poll_interval)
        .map_err(|e| InvokeError::ConfigError(format!("[invoke].poll_interval: {e}")))?;
    if interval.is_zero() {
        return Err(InvokeError::ConfigError(format!(
            "[invoke].poll_interval must be > 0 (got \"{}\")",
            cfg.invoke.poll_interval
        )));
    }

    if cfg.invoke.line_capacity == 0 {
        return Err(InvokeError::ConfigError(
            "[invoke].line_capacity must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_tokens_section(cfg: &RawConfigFile) -> Result<()> {
    if cfg.tokens.max_passes == 0 {
        return Err(InvokeError::ConfigError(
            "[tokens].max_passes must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}
