//! Execution of FreeIPMI tools.
//!
//! Credentials never appear on the command line and never touch the disk:
//! the FreeIPMI config blob is written into an owner-only named pipe by a
//! blocking task while the tool reads it through `--config-file`.

use super::ToolOutput;
use crate::error::{ExporterError, Result};
use crate::metrics::traits::Executor;
use nix::fcntl::OFlag;
use nix::sys::stat::Mode;
use nix::unistd::mkfifo;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, error};
use uuid::Uuid;

const PIPE_PREFIX: &str = "ipmi_exporter-";

/// Runs FreeIPMI tools as child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct FreeipmiExecutor;

impl Executor for FreeipmiExecutor {
    async fn execute(&self, command: &str, args: &[String], config: &str, target: &str) -> ToolOutput {
        execute(command, args, config, target).await
    }
}

/// Run `command` with `args`, feeding `config` through a named pipe.
///
/// `--config-file <pipe>` is appended to the arguments, followed by
/// `-h <target>` unless the target is the local BMC (empty string).
/// Stdout and stderr are captured (in that order). A non-zero exit is
/// reported as an error alongside whatever output was produced.
pub async fn execute(command: &str, args: &[String], config: &str, target: &str) -> ToolOutput {
    let mut pipe = match ConfigPipe::create(config) {
        Ok(pipe) => pipe,
        Err(err) => return ToolOutput::failure(Vec::new(), err),
    };

    let mut full_args = args.to_vec();
    full_args.push("--config-file".to_string());
    full_args.push(pipe.path().to_string_lossy().into_owned());
    if !target.is_empty() {
        full_args.push("-h".to_string());
        full_args.push(target.to_string());
    }

    debug!(command, args = ?full_args, "Executing");
    let output = Command::new(command)
        .args(&full_args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await;

    // The pipe is removed when it goes out of scope, after the child exited.
    pipe.finish().await;

    match output {
        Ok(output) => {
            let mut combined = output.stdout;
            combined.extend_from_slice(&output.stderr);
            if output.status.success() {
                ToolOutput::success(combined)
            } else {
                ToolOutput::failure(
                    combined,
                    ExporterError::command_error(command, output.status.to_string()),
                )
            }
        }
        Err(err) => ToolOutput::failure(Vec::new(), ExporterError::command_error(command, err.to_string())),
    }
}

/// A named pipe holding one config blob for one tool invocation.
struct ConfigPipe {
    path: PathBuf,
    writer: Option<JoinHandle<()>>,
}

impl ConfigPipe {
    /// Create the pipe and start the writer task.
    ///
    /// Opening a FIFO for writing blocks until a reader attaches, so the
    /// writer runs on the blocking pool while the tool is spawned.
    fn create(config: &str) -> Result<Self> {
        let path = pipe_path();
        mkfifo(&path, Mode::S_IRUSR | Mode::S_IWUSR).map_err(|e| {
            ExporterError::transport_error(format!(
                "failed to create named pipe {}: {}",
                path.display(),
                e
            ))
        })?;

        let data = config.as_bytes().to_vec();
        let writer_path = path.clone();
        let writer = tokio::task::spawn_blocking(move || write_config(&writer_path, &data));

        Ok(Self {
            path,
            writer: Some(writer),
        })
    }

    fn path(&self) -> &Path {
        &self.path
    }

    /// Wait for the writer task to end.
    ///
    /// A tool that exited without opening the pipe leaves the writer stuck in
    /// `open`; attaching a non-blocking reader releases it.
    async fn finish(&mut self) {
        let Some(writer) = self.writer.take() else {
            return;
        };

        let release = if writer.is_finished() {
            None
        } else {
            match open_release_reader(&self.path) {
                Ok(reader) => Some(reader),
                Err(e) => {
                    error!(error = %e, "Error releasing config pipe writer");
                    return;
                }
            }
        };

        if let Err(e) = writer.await {
            error!(error = %e, "Config pipe writer task failed");
        }
        drop(release);
    }
}

impl Drop for ConfigPipe {
    fn drop(&mut self) {
        // Cancelled before `finish`: unblock the writer before unlinking.
        let _release = match &self.writer {
            Some(writer) if !writer.is_finished() => open_release_reader(&self.path).ok(),
            _ => None,
        };
        if let Err(e) = fs::remove_file(&self.path) {
            error!(error = %e, pipe = %self.path.display(), "Error deleting named pipe");
        }
    }
}

fn pipe_path() -> PathBuf {
    std::env::temp_dir().join(format!("{}{}", PIPE_PREFIX, Uuid::new_v4().simple()))
}

fn open_release_reader(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .read(true)
        .custom_flags(OFlag::O_NONBLOCK.bits())
        .open(path)
}

fn write_config(path: &Path, data: &[u8]) {
    let result = OpenOptions::new()
        .write(true)
        .open(path)
        .and_then(|mut pipe| pipe.write_all(data));
    if let Err(e) = result {
        error!(error = %e, "Error writing config to pipe");
    }
}
