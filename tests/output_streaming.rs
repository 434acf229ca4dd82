// tests/output_streaming.rs

use std::error::Error;

use cmdinvoke::exec::InvocationState;
use cmdinvoke::types::StdoutMode;
use cmdinvoke::{CommandInvoker, InvokeRequest, MemorySink, SinkEntry};
use cmdinvoke_test_utils::commands::{count_to, print_lines, stdout_and_stderr};
#[cfg(unix)]
use cmdinvoke_test_utils::commands::flood;
use cmdinvoke_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn stdout_lines_reach_the_sink_in_order() -> TestResult {
    init_tracing();
    let sink = MemorySink::new();
    let invoker = CommandInvoker::new(sink.clone());

    let result =
        with_timeout(invoker.invoke_and_validate(InvokeRequest::new(print_lines(&["a", "b", "c"]))))
            .await?;

    assert_eq!(sink.stdout_lines(), vec!["a", "b", "c"]);
    assert_eq!(result.stdout_lines, 3);
    assert_eq!(result.dropped_lines, 0);
    Ok(())
}

#[tokio::test]
async fn status_lines_frame_the_child_output() -> TestResult {
    init_tracing();
    let sink = MemorySink::new();
    let invoker = CommandInvoker::new(sink.clone());

    with_timeout(invoker.invoke(InvokeRequest::new(print_lines(&["only"])))).await?;

    let entries = sink.entries();
    assert_eq!(entries.len(), 3);
    assert!(matches!(&entries[0], SinkEntry::Status(s) if s.starts_with("running: ")));
    assert_eq!(entries[1], SinkEntry::Stdout("only".to_string()));
    assert_eq!(
        entries[2],
        SinkEntry::Status("finished with exit code 0".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn stderr_is_one_block_after_stdout_and_not_a_failure() -> TestResult {
    init_tracing();
    let sink = MemorySink::new();
    let invoker = CommandInvoker::new(sink.clone());

    let result =
        with_timeout(invoker.invoke_and_validate(InvokeRequest::new(stdout_and_stderr("out", "oops"))))
            .await?;
    assert_eq!(result.exit_code, 0);

    assert_eq!(sink.stderr_blocks(), vec!["oops"]);

    let entries = sink.entries();
    let stdout_pos = entries
        .iter()
        .position(|e| matches!(e, SinkEntry::Stdout(_)))
        .expect("stdout entry");
    let stderr_pos = entries
        .iter()
        .position(|e| matches!(e, SinkEntry::Stderr(_)))
        .expect("stderr entry");
    assert!(stdout_pos < stderr_pos);
    assert!(matches!(entries.last(), Some(SinkEntry::Status(_))));
    Ok(())
}

#[tokio::test]
async fn subscriber_channel_receives_lines_in_order() -> TestResult {
    init_tracing();
    let sink = MemorySink::new();
    let invoker = CommandInvoker::new(sink.clone());

    let mut running = invoker.start(InvokeRequest::new(print_lines(&["a", "b", "c"])).subscribe_lines(16))?;
    assert_eq!(running.state(), InvocationState::Draining);
    assert!(running.pid().is_some());

    let mut lines = running.take_lines().expect("channel was requested");
    let consumer = tokio::spawn(async move {
        let mut seen = Vec::new();
        while let Some(line) = lines.recv().await {
            seen.push(line);
        }
        seen
    });

    let result = with_timeout(running.wait()).await?;
    let seen = with_timeout(consumer).await?;

    assert_eq!(seen, vec!["a", "b", "c"]);
    assert_eq!(result.dropped_lines, 0);
    Ok(())
}

#[tokio::test]
async fn slow_subscriber_loses_lines_but_sink_does_not() -> TestResult {
    init_tracing();
    let sink = MemorySink::new();
    let invoker = CommandInvoker::new(sink.clone());

    let mut running = invoker.start(InvokeRequest::new(count_to(100)).subscribe_lines(1))?;
    // Held but never read: only the first line fits.
    let mut lines = running.take_lines().expect("channel was requested");

    let result = with_timeout(running.wait()).await?;

    assert_eq!(result.stdout_lines, 100);
    assert_eq!(result.dropped_lines, 99);
    assert_eq!(sink.stdout_lines().len(), 100);
    assert_eq!(lines.recv().await.as_deref(), Some("1"));
    Ok(())
}

#[tokio::test]
async fn inherited_stdout_is_not_drained() -> TestResult {
    init_tracing();
    let sink = MemorySink::new();
    let invoker = CommandInvoker::new(sink.clone());

    let mut running = invoker.start(
        InvokeRequest::new(print_lines(&["to the terminal"]))
            .stdout(StdoutMode::Inherit)
            .subscribe_lines(4),
    )?;
    assert!(running.take_lines().is_none());

    let result = with_timeout(running.wait()).await?;
    assert_eq!(result.exit_code, 0);
    assert_eq!(result.stdout_lines, 0);
    assert!(sink.stdout_lines().is_empty());
    Ok(())
}

/// Both streams are far larger than an OS pipe buffer (64 KiB on Linux).
#[cfg(unix)]
#[tokio::test]
async fn output_larger_than_the_pipe_buffer_never_stalls_the_child() -> TestResult {
    init_tracing();
    let sink = MemorySink::new();
    let invoker = CommandInvoker::new(sink.clone());

    let result =
        with_timeout(invoker.invoke_and_validate(InvokeRequest::new(flood(20_000, 200_000))))
            .await?;

    assert_eq!(result.exit_code, 0);
    assert_eq!(result.stdout_lines, 20_000);

    let stdout = sink.stdout_lines();
    assert_eq!(stdout.len(), 20_000);
    assert_eq!(stdout[0], "line1");
    assert_eq!(stdout[19_999], "line20000");

    let stderr = sink.stderr_blocks();
    assert_eq!(stderr.len(), 1);
    assert_eq!(stderr[0].len(), 200_000);
    assert!(stderr[0].bytes().all(|b| b == b'e'));
    Ok(())
}
