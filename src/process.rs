//! Process execution.
//!
//! Checker commands are run to completion with stdout and stderr merged into
//! one stream of lines, delivered to the caller as they arrive. System
//! actions and URLs are fire-and-forget: once the child is spawned we stop
//! caring about it.

use crate::checker::CheckCommand;
use crate::error::{DeskError, Result};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;

/// Outcome of running a checker.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub command: CheckCommand,
    /// Combined stdout/stderr, one entry per line, in arrival order.
    pub lines: Vec<String>,
    /// Exit code, or `None` if the process was killed by a signal.
    pub exit_code: Option<i32>,
}

impl CheckReport {
    /// A checker that printed nothing found nothing.
    pub fn is_clean(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Split a command line on whitespace. No quoting rules apply.
pub fn tokenize(command_line: &str) -> Result<Vec<String>> {
    let argv: Vec<String> = command_line.split_whitespace().map(str::to_string).collect();
    if argv.is_empty() {
        return Err(DeskError::EmptyCommand);
    }
    Ok(argv)
}

/// Whether `program` resolves on `PATH` (or is an existing path).
pub fn program_available(program: &str) -> bool {
    which::which(program).is_ok()
}

/// Argument vector that hands `url` to the platform's URL opener.
pub fn url_opener_argv(url: &str) -> Vec<String> {
    #[cfg(target_os = "windows")]
    let argv = vec![
        "rundll32".to_string(),
        "url.dll,FileProtocolHandler".to_string(),
        url.to_string(),
    ];
    #[cfg(target_os = "macos")]
    let argv = vec!["open".to_string(), url.to_string()];
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let argv = vec!["xdg-open".to_string(), url.to_string()];
    argv
}

fn spawn_argv(argv: &[String]) -> Result<()> {
    let (program, args) = argv.split_first().ok_or(DeskError::EmptyCommand)?;
    let child = std::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| DeskError::launch(program.as_str(), e))?;
    tracing::info!(program = %program, pid = child.id(), "spawned detached process");
    Ok(())
}

/// Launch a command line without waiting for it.
pub fn spawn_detached(command_line: &str) -> Result<()> {
    spawn_argv(&tokenize(command_line)?)
}

/// Open a URL with the platform's URL handler.
pub fn open_url(url: &str) -> Result<()> {
    tracing::debug!(url, "opening url");
    spawn_argv(&url_opener_argv(url))
}

/// Strip one trailing `\n` or `\r\n`.
fn chomp(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}

/// Forward each line of `reader` until end of input. Bytes that are not
/// UTF-8 are replaced rather than dropped, so a checker speaking a legacy
/// locale still produces findings.
async fn forward_lines<R>(reader: R, tx: mpsc::UnboundedSender<std::io::Result<String>>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let item = match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => Ok(String::from_utf8_lossy(chomp(&buf)).into_owned()),
            Err(e) => Err(e),
        };
        let failed = item.is_err();
        if tx.send(item).is_err() || failed {
            break;
        }
    }
}

/// Run a checker command to completion, calling `on_line` for every line of
/// output as it arrives.
pub async fn run_check<F>(command: &CheckCommand, mut on_line: F) -> Result<CheckReport>
where
    F: FnMut(&str),
{
    let argv = command.argv().ok_or(DeskError::UnsupportedFileType)?;
    let (program, args) = argv.split_first().ok_or(DeskError::EmptyCommand)?;

    tracing::info!(command = %command.display(), "running checker");
    let mut child = tokio::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| DeskError::launch(program.as_str(), e))?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(forward_lines(stdout, tx.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(forward_lines(stderr, tx.clone()));
    }
    drop(tx);

    let mut lines = Vec::new();
    let mut read_err = None;
    while let Some(item) = rx.recv().await {
        match item {
            Ok(line) => {
                on_line(&line);
                lines.push(line);
            }
            Err(e) => {
                tracing::warn!(error = %e, "reading checker output failed");
                read_err.get_or_insert(e);
            }
        }
    }

    let status = child
        .wait()
        .await
        .map_err(|e| DeskError::launch(program.as_str(), e))?;
    tracing::debug!(code = ?status.code(), lines = lines.len(), "checker finished");
    if let Some(source) = read_err {
        return Err(DeskError::ProcessOutput {
            program: program.clone(),
            source,
        });
    }

    Ok(CheckReport {
        command: command.clone(),
        lines,
        exit_code: status.code(),
    })
}
