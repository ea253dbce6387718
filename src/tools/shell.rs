use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tokio::time::timeout;

use super::args::{optional_str, required_str};
use super::response::{truncate_output, Status};
use super::settings::ShellSettings;
use super::{ToolError, ToolSettings};

/// Outcome of a shell command. Execution problems are reported here, never as errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellOutcome {
    pub stdout: String,
    pub stderr: String,
    pub returncode: i32,
    pub status: Status,
}

impl ShellOutcome {
    fn failed(stderr: String, returncode: i32) -> Self {
        Self {
            stdout: String::new(),
            stderr,
            returncode,
            status: Status::Failure,
        }
    }
}

fn shell_command(command: &str) -> Command {
    #[cfg(windows)]
    {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    }
    #[cfg(not(windows))]
    {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }
}

pub async fn run_shell_command(command: &str, cwd: &Path, shell: &ShellSettings) -> ShellOutcome {
    let start_time = Instant::now();

    let mut cmd = shell_command(command);
    cmd.current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => return ShellOutcome::failed(e.to_string(), 1),
    };

    let output = match timeout(shell.timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => return ShellOutcome::failed(e.to_string(), 1),
        Err(_) => {
            return ShellOutcome::failed(
                format!("Command timed out after {} seconds", shell.timeout.as_secs()),
                -1,
            )
        }
    };

    let returncode = output.status.code().unwrap_or(-1);
    tracing::debug!(
        command,
        returncode,
        duration_ms = start_time.elapsed().as_millis() as u64,
        "shell command finished"
    );

    ShellOutcome {
        stdout: truncate_output(&output.stdout, shell.max_output_bytes),
        stderr: truncate_output(&output.stderr, shell.max_output_bytes),
        returncode,
        status: Status::from_success(returncode == 0),
    }
}

pub async fn handle_execute_shell_command(
    args: &Value,
    settings: &ToolSettings,
) -> Result<Value, ToolError> {
    let command = required_str(args, "command")?;
    let cwd = match optional_str(args, "current_working_directory")? {
        Some(dir) if !dir.is_empty() => settings.resolve(dir),
        _ => settings.workspace.clone(),
    };

    if settings.verbose {
        eprintln!(
            "{}",
            format!("[tools] run: sh -c {:?} (cwd={})", command, cwd.display()).dimmed()
        );
    }

    let outcome = run_shell_command(command, &cwd, &settings.shell).await;

    if settings.verbose {
        eprintln!(
            "{}",
            format!(
                "[tools] done: returncode={}, stdout={} bytes",
                outcome.returncode,
                outcome.stdout.len()
            )
            .dimmed()
        );
    }

    Ok(serde_json::to_value(outcome)?)
}
