// tests/config_loading.rs

use std::error::Error;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tempfile::NamedTempFile;

use cmdinvoke::config::{load_and_validate, load_from_path, load_or_default};
use cmdinvoke::errors::InvokeError;
use cmdinvoke::tokens::UndefinedPolicy;
use cmdinvoke::types::{StdoutMode, WaitMode};
use cmdinvoke::{MemorySink, WaitStrategy};
use cmdinvoke_test_utils::commands::{count_to, print_lines};
use cmdinvoke_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(contents: &str) -> Result<NamedTempFile, Box<dyn Error>> {
    let mut file = NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}

#[test]
fn full_config_file_is_loaded_and_validated() -> TestResult {
    let file = write_config(
        r#"
[invoke]
wait = "polling"
poll_interval = "250ms"
stdout = "inherit"
line_capacity = 8

[tokens]
undefined = "fail"
max_passes = 4
"#,
    )?;

    let cfg = load_and_validate(file.path())?;
    assert_eq!(cfg.invoke.wait, WaitMode::Polling);
    assert_eq!(cfg.invoke.stdout, StdoutMode::Inherit);
    assert_eq!(cfg.poll_interval(), Duration::from_millis(250));
    assert_eq!(
        cfg.wait_strategy(),
        WaitStrategy::Polling {
            interval: Duration::from_millis(250)
        }
    );

    let expander = cfg.token_expander();
    assert_eq!(expander.policy(), UndefinedPolicy::Fail);
    assert_eq!(expander.max_passes(), 4);
    Ok(())
}

#[test]
fn empty_file_yields_defaults() -> TestResult {
    let file = write_config("")?;
    let cfg = load_and_validate(file.path())?;

    assert_eq!(cfg.wait_strategy(), WaitStrategy::Blocking);
    assert_eq!(cfg.invoke.stdout, StdoutMode::Drain);
    assert_eq!(cfg.invoke.line_capacity, 256);
    assert_eq!(cfg.token_expander().policy(), UndefinedPolicy::Sentinel);
    Ok(())
}

#[test]
fn missing_file_yields_defaults_only_through_load_or_default() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Cmdinvoke.toml");

    let cfg = load_or_default(&path)?;
    assert_eq!(cfg.poll_interval(), Duration::from_secs(5));

    assert!(matches!(
        load_and_validate(&path),
        Err(InvokeError::IoError(_))
    ));
    Ok(())
}

#[test]
fn unknown_enum_value_is_a_toml_error() -> TestResult {
    let file = write_config("[invoke]\nwait = \"sometimes\"\n")?;
    assert!(matches!(
        load_from_path(file.path()),
        Err(InvokeError::TomlError(_))
    ));
    Ok(())
}

#[test]
fn semantic_errors_surface_as_config_errors() -> TestResult {
    let file = write_config("[invoke]\npoll_interval = \"soon\"\n")?;

    // Raw loading accepts any string; validation does not.
    assert!(load_from_path(file.path()).is_ok());
    match load_and_validate(file.path()) {
        Err(InvokeError::ConfigError(msg)) => assert!(msg.contains("poll_interval")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn configured_invoker_runs_a_command() -> TestResult {
    init_tracing();
    let file = write_config("[invoke]\nwait = \"polling\"\npoll_interval = \"50ms\"\n")?;
    let cfg = load_and_validate(file.path())?;

    let sink = MemorySink::new();
    let invoker = cfg.invoker(Arc::new(sink.clone()));
    assert_eq!(
        invoker.wait_strategy(),
        WaitStrategy::Polling {
            interval: Duration::from_millis(50)
        }
    );

    let result = with_timeout(invoker.invoke_and_validate(cfg.request(print_lines(&["x"])))).await?;
    assert_eq!(result.exit_code, 0);
    assert_eq!(sink.stdout_lines(), vec!["x"]);
    Ok(())
}

#[tokio::test]
async fn configured_line_capacity_bounds_the_subscriber() -> TestResult {
    init_tracing();
    let file = write_config("[invoke]\nline_capacity = 2\n")?;
    let cfg = load_and_validate(file.path())?;
    let invoker = cfg.invoker(Arc::new(MemorySink::new()));

    let mut running = invoker.start(cfg.subscribed_request(count_to(10)))?;
    let _lines = running.take_lines().expect("channel was requested");
    let result = with_timeout(running.wait()).await?;

    assert_eq!(result.stdout_lines, 10);
    assert_eq!(result.dropped_lines, 8);
    Ok(())
}
