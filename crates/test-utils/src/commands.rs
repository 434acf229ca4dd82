//! Portable interpreter command lines for test children.
//!
//! Each helper returns a command line meant for interpreter mode (`sh -c` on
//! Unix, `cmd /C` on Windows), so the request has no `arguments`.

use cmdinvoke::InvokeRequest;

/// Print each of `lines` on its own line, then exit 0.
pub fn print_lines(lines: &[&str]) -> String {
    if cfg!(windows) {
        let echoes: Vec<String> = lines.iter().map(|l| format!("echo {l}")).collect();
        format!("({})", echoes.join("& "))
    } else {
        let quoted: Vec<String> = lines.iter().map(|l| format!("'{l}'")).collect();
        format!("printf '%s\\n' {}", quoted.join(" "))
    }
}

/// Print the numbers `1..=n`, one per line.
pub fn count_to(n: u32) -> String {
    if cfg!(windows) {
        format!("for /L %i in (1,1,{n}) do @echo %i")
    } else {
        format!("i=1; while [ $i -le {n} ]; do echo $i; i=$((i+1)); done")
    }
}

/// Exit with `code` without printing anything.
pub fn exit_with(code: i32) -> String {
    if cfg!(windows) {
        format!("exit /b {code}")
    } else {
        format!("exit {code}")
    }
}

/// Write `out` to stdout and `err` to stderr, then exit 0.
pub fn stdout_and_stderr(out: &str, err: &str) -> String {
    if cfg!(windows) {
        format!("echo {out}& echo {err} 1>&2")
    } else {
        format!("echo {out}; echo {err} 1>&2")
    }
}

/// Write `stderr_bytes` bytes of `e` to stderr, then `lines` numbered lines
/// (`line1`, `line2`, ...) to stdout. Unix only.
pub fn flood(lines: u32, stderr_bytes: usize) -> String {
    format!(
        "head -c {stderr_bytes} /dev/zero | tr '\\0' 'e' 1>&2; \
         i=1; while [ $i -le {lines} ]; do echo line$i; i=$((i+1)); done"
    )
}

/// Print the working directory.
pub fn print_cwd() -> String {
    if cfg!(windows) { "cd".to_string() } else { "pwd".to_string() }
}

/// Stay alive for roughly `secs` seconds, then exit 0.
pub fn sleep_for(secs: u32) -> String {
    if cfg!(windows) {
        format!("ping -n {} 127.0.0.1 >NUL", secs + 1)
    } else {
        format!("sleep {secs}")
    }
}

/// Direct-mode `ping` of the loopback address with a short count.
pub fn ping_loopback() -> InvokeRequest {
    let count_flag = if cfg!(windows) { "-n" } else { "-c" };
    InvokeRequest::new("ping").arguments(format!("{count_flag} 2 127.0.0.1"))
}

/// Direct-mode request for an executable that does not exist.
pub fn missing_executable() -> InvokeRequest {
    InvokeRequest::new("/nonexistent/cmdinvoke-test/no-such-binary").arguments("--help")
}
