// src/exec/process.rs

//! Running one stage as a child process.

use std::collections::VecDeque;
use std::path::Path;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::{PipelineError, Result};
use crate::stage::Stage;

/// Lines of stderr kept for the failure diagnostic.
pub const STDERR_TAIL_LINES: usize = 50;

/// Run `program` with the stage's arguments and wait for it to exit.
///
/// - stdout is forwarded to the log at debug level;
/// - stderr is forwarded too, and its last [`STDERR_TAIL_LINES`] lines become
///   the diagnostic of the `StageExecution` error on non-zero exit.
///
/// The child is killed if this future is dropped (e.g. on Ctrl-C).
pub async fn run_stage_process(program: &Path, stage: &Stage) -> Result<()> {
    info!(
        stage = %stage.name,
        program = %program.display(),
        "starting stage process"
    );
    debug!(stage = %stage.name, cmd = %stage.command_line(), cwd = %stage.working_dir.display());

    let mut cmd = Command::new(program);
    cmd.args(&stage.args)
        .current_dir(&stage.working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|e| PipelineError::StageExecution {
        stage: stage.name.clone(),
        code: None,
        diagnostic: format!("failed to start {}: {e}", program.display()),
    })?;

    let stdout_task = child.stdout.take().map(|stdout| {
        let name = stage.name.clone();
        tokio::spawn(async move {
            pump_lines(stdout, |line| debug!(stage = %name, "stdout: {}", line)).await;
        })
    });

    let stderr_task = child.stderr.take().map(|stderr| {
        let name = stage.name.clone();
        tokio::spawn(async move {
            let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);
            pump_lines(stderr, |line| {
                debug!(stage = %name, "stderr: {}", line);
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            })
            .await;
            tail
        })
    });

    let status = child.wait().await.map_err(|e| PipelineError::StageExecution {
        stage: stage.name.clone(),
        code: None,
        diagnostic: format!("waiting for {}: {e}", program.display()),
    })?;

    if let Some(task) = stdout_task {
        let _ = task.await;
    }
    let tail = match stderr_task {
        Some(task) => task.await.unwrap_or_default(),
        None => VecDeque::new(),
    };

    info!(
        stage = %stage.name,
        exit_code = ?status.code(),
        success = status.success(),
        "stage process exited"
    );

    if status.success() {
        return Ok(());
    }

    let diagnostic = if tail.is_empty() {
        "(no output on stderr)".to_string()
    } else {
        Vec::from(tail).join("\n")
    };

    Err(PipelineError::StageExecution {
        stage: stage.name.clone(),
        code: status.code(),
        diagnostic,
    })
}

/// Read `reader` to EOF, handing each line to `on_line`.
///
/// Lines are split on raw `\n` and decoded lossily: tools print file names,
/// which need not be UTF-8. The pipe is drained until EOF even after a read
/// error so the child never sees a closed pipe.
async fn pump_lines<R, F>(reader: R, mut on_line: F)
where
    R: AsyncRead + Unpin,
    F: FnMut(String),
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                while matches!(buf.last(), Some(b'\n' | b'\r')) {
                    buf.pop();
                }
                on_line(String::from_utf8_lossy(&buf).into_owned());
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!(error = %e, "output pipe read failed; discarding the rest");
                let mut sink = tokio::io::sink();
                let _ = tokio::io::copy(&mut reader, &mut sink).await;
                break;
            }
        }
    }
}
