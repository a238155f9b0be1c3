//! Helpers for running a backend child process with a timeout, bounded output
//! and cooperative cancellation.

use std::io::{BufRead, BufReader, Read, Write};
use std::process::{ChildStdin, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

use crate::io::cancel::{CancelToken, Interrupted};

/// How often a running child is checked for cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Captured child process output.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub stdout_truncated: usize,
    pub stderr_truncated: usize,
    pub timed_out: bool,
}

impl CommandOutput {
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// Limits and hooks for one child process run.
pub struct RunLimits<'a> {
    pub timeout: Duration,
    pub output_limit_bytes: usize,
    pub cancel: &'a CancelToken,
}

/// Run a command, feeding `stdin` and capturing stdout/stderr without risking pipe deadlocks.
///
/// Output is read concurrently while the child runs; `on_line` is invoked from
/// the calling thread once per stdout line as it arrives. `output_limit_bytes`
/// bounds the amount of stdout/stderr stored in memory. The child is killed on
/// timeout and on cancellation; cancellation returns an [`Interrupted`] error.
#[instrument(skip_all, fields(timeout_secs = limits.timeout.as_secs(), output_limit_bytes = limits.output_limit_bytes))]
pub fn run_command_streaming<F: FnMut()>(
    mut cmd: Command,
    stdin: Option<&[u8]>,
    limits: &RunLimits<'_>,
    mut on_line: F,
) -> Result<CommandOutput> {
    if stdin.is_some() {
        cmd.stdin(Stdio::piped());
    } else {
        cmd.stdin(Stdio::null());
    }
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

    debug!("spawning child process");
    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            error!(err = %e, "failed to spawn command");
            return Err(e).context("spawn command");
        }
    };

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("stdout was not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;

    let limit = limits.output_limit_bytes;
    let (line_tx, line_rx) = mpsc::channel::<()>();
    let stdout_handle = thread::spawn(move || read_lines_limited(stdout, limit, line_tx));
    let stderr_handle = thread::spawn(move || read_stream_limited(stderr, limit));

    // Written off-thread so a child that never reads stdin cannot block the
    // timeout and cancellation checks below.
    let stdin_handle = match stdin {
        Some(input) => {
            let child_stdin = child
                .stdin
                .take()
                .ok_or_else(|| anyhow!("stdin was not piped"))?;
            let input = input.to_vec();
            Some(thread::spawn(move || write_stdin(child_stdin, &input)))
        }
        None => None,
    };

    let deadline = Instant::now() + limits.timeout;
    let mut timed_out = false;
    let mut cancelled = false;
    let status = loop {
        while line_rx.try_recv().is_ok() {
            on_line();
        }
        if let Some(status) = child.wait_timeout(POLL_INTERVAL).context("wait for command")? {
            break status;
        }
        if limits.cancel.is_cancelled() {
            warn!("cancellation requested, killing command");
            cancelled = true;
        } else if Instant::now() >= deadline {
            warn!(
                timeout_secs = limits.timeout.as_secs(),
                "command timed out, killing"
            );
            timed_out = true;
        } else {
            continue;
        }
        child.kill().context("kill command")?;
        break child.wait().context("wait command after kill")?;
    };

    if let Some(handle) = stdin_handle {
        match handle.join() {
            Ok(result) if !(cancelled || timed_out) => result?,
            Ok(_) => {}
            Err(_) => return Err(anyhow!("stdin writer thread panicked")),
        }
    }
    let (stdout, stdout_truncated) = join_output(stdout_handle).context("join stdout")?;
    let (stderr, stderr_truncated) = join_output(stderr_handle).context("join stderr")?;
    while line_rx.try_recv().is_ok() {
        on_line();
    }

    if cancelled {
        return Err(Interrupted.into());
    }
    if stdout_truncated > 0 || stderr_truncated > 0 {
        warn!(stdout_truncated, stderr_truncated, "output truncated");
    }

    debug!(exit_code = ?status.code(), timed_out, "command finished");
    Ok(CommandOutput {
        status,
        stdout,
        stderr,
        stdout_truncated,
        stderr_truncated,
        timed_out,
    })
}

/// Write the whole prompt, then close stdin to signal end of input.
fn write_stdin(mut child_stdin: ChildStdin, input: &[u8]) -> Result<()> {
    match child_stdin.write_all(input) {
        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
            debug!("command exited without reading stdin");
            Ok(())
        }
        other => other.context("write stdin"),
    }
}

fn join_output(handle: thread::JoinHandle<Result<(Vec<u8>, usize)>>) -> Result<(Vec<u8>, usize)> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(anyhow!("output reader thread panicked")),
    }
}

/// Read a stream line by line with a size limit, signalling each line on `lines`.
fn read_lines_limited<R: Read>(
    reader: R,
    limit: usize,
    lines: mpsc::Sender<()>,
) -> Result<(Vec<u8>, usize)> {
    let mut buf_reader = BufReader::new(reader);
    let mut collected = Vec::new();
    let mut truncated = 0usize;

    loop {
        let mut line = Vec::new();
        let n = buf_reader
            .read_until(b'\n', &mut line)
            .context("read line")?;
        if n == 0 {
            break;
        }
        lines.send(()).ok();

        let remaining = limit.saturating_sub(collected.len());
        if remaining > 0 {
            let keep = n.min(remaining);
            collected.extend_from_slice(&line[..keep]);
            truncated += n.saturating_sub(keep);
        } else {
            truncated += n;
        }
    }

    Ok((collected, truncated))
}

fn read_stream_limited<R: Read>(mut reader: R, limit: usize) -> Result<(Vec<u8>, usize)> {
    let mut buf = Vec::new();
    let mut truncated = 0usize;
    let mut chunk = [0u8; 8192];

    loop {
        let n = reader.read(&mut chunk).context("read output")?;
        if n == 0 {
            break;
        }
        let remaining = limit.saturating_sub(buf.len());
        if remaining > 0 {
            let keep = n.min(remaining);
            buf.extend_from_slice(&chunk[..keep]);
            truncated += n.saturating_sub(keep);
        } else {
            truncated += n;
        }
    }

    Ok((buf, truncated))
}
