use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

use super::args::required_str;
use super::response::{truncate_output, Status};
use super::settings::SandboxSettings;
use super::{ToolError, ToolSettings};

const RUNNER_FILE_NAME: &str = "snippet_runner.py";

const RUNNER_SCRIPT: &str = r#"import json
import sys
import traceback

request = json.load(sys.stdin)
namespace = {"__name__": "__snippet__", "output": None, "logs": ""}
skipped = []

for statement in request.get("preload", []):
    try:
        exec(statement, namespace)
    except Exception as exc:
        skipped.append("%s (%s)" % (statement, exc))


def emit(payload):
    payload["preload_skipped"] = skipped
    with open(request["result_path"], "w", encoding="utf-8") as handle:
        json.dump(payload, handle)


try:
    exec(compile(request["code"], "<snippet>", "exec"), namespace)
    result = {"output": str(namespace.get("output")), "logs": str(namespace.get("logs", ""))}
except BaseException:
    emit({"error": traceback.format_exc()})
    sys.exit(1)

emit(result)
"#;

/// What the runner writes to the result file.
#[derive(Debug, Default, Deserialize)]
struct RunnerPayload {
    output: Option<String>,
    logs: Option<String>,
    error: Option<String>,
    #[serde(default)]
    preload_skipped: Vec<String>,
}

/// Result of a successful snippet run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub status: Status,
    pub output: String,
    pub logs: String,
    pub stdout: String,
    pub stderr: String,
}

/// Run `code` in a fresh interpreter rooted at `workspace`.
///
/// The snippet sees the preload names plus `output = None` and `logs = ""`;
/// both are converted to text and written to a result file. Nothing survives
/// from one call to the next.
///
/// An exception raised by the snippet is a [`ToolError::Runtime`] carrying the
/// traceback; failing to start, finish or report is a [`ToolError::ProcessFailure`].
pub async fn execute_snippet(
    code: &str,
    sandbox: &SandboxSettings,
    workspace: &Path,
) -> Result<ExecutionRecord, ToolError> {
    let start_time = Instant::now();
    let scratch = workspace.join(".sd-agent").join("tmp");
    tokio::fs::create_dir_all(&scratch)
        .await
        .map_err(|e| ToolError::from_io(e, &scratch))?;

    let runner_path = scratch.join(RUNNER_FILE_NAME);
    tokio::fs::write(&runner_path, RUNNER_SCRIPT)
        .await
        .map_err(|e| ToolError::from_io(e, &runner_path))?;

    let result_file = tempfile::Builder::new()
        .prefix("result-")
        .suffix(".json")
        .tempfile_in(&scratch)
        .map_err(|e| ToolError::from_io(e, &scratch))?;

    let request = json!({
        "code": code,
        "result_path": result_file.path().to_string_lossy(),
        "preload": sandbox.preload,
    });

    let mut cmd = Command::new(&sandbox.python);
    cmd.arg(&runner_path)
        .current_dir(workspace)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    for (key, value) in &sandbox.env {
        cmd.env(key, value);
    }

    tracing::debug!(
        python = %sandbox.python,
        runner = %runner_path.display(),
        code_bytes = code.len(),
        "starting snippet"
    );

    let mut child = cmd.spawn().map_err(|e| {
        ToolError::ProcessFailure(format!("failed to start '{}': {}", sandbox.python, e))
    })?;

    let request_json = serde_json::to_vec(&request)?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(&request_json)
            .await
            .map_err(|e| ToolError::ProcessFailure(format!("failed to write to stdin: {}", e)))?;
        stdin
            .flush()
            .await
            .map_err(|e| ToolError::ProcessFailure(format!("failed to flush stdin: {}", e)))?;
    }

    let output = timeout(sandbox.timeout, child.wait_with_output())
        .await
        .map_err(|_| {
            ToolError::ProcessFailure(format!(
                "snippet timed out after {} seconds",
                sandbox.timeout.as_secs()
            ))
        })?
        .map_err(|e| ToolError::ProcessFailure(format!("failed to wait for interpreter: {}", e)))?;

    let stdout = truncate_output(&output.stdout, sandbox.max_output_bytes);
    let stderr = truncate_output(&output.stderr, sandbox.max_output_bytes);

    let raw = tokio::fs::read_to_string(result_file.path())
        .await
        .unwrap_or_default();
    let payload: RunnerPayload = if raw.trim().is_empty() {
        RunnerPayload::default()
    } else {
        serde_json::from_str(&raw).map_err(|e| {
            ToolError::ProcessFailure(format!("unreadable result from interpreter: {}", e))
        })?
    };

    if !payload.preload_skipped.is_empty() {
        tracing::debug!(skipped = ?payload.preload_skipped, "preload statements skipped");
    }

    tracing::debug!(
        exit_code = output.status.code().unwrap_or(-1),
        duration_ms = start_time.elapsed().as_millis() as u64,
        "snippet finished"
    );

    if let Some(traceback) = payload.error {
        return Err(ToolError::Runtime(traceback.trim_end().to_string()));
    }

    match (payload.output, payload.logs) {
        (Some(output_text), Some(logs)) if output.status.success() => Ok(ExecutionRecord {
            status: Status::Success,
            output: output_text,
            logs,
            stdout,
            stderr,
        }),
        _ => Err(ToolError::ProcessFailure(format!(
            "interpreter exited with code {} without reporting a result: {}",
            output.status.code().unwrap_or(-1),
            stderr.trim_end()
        ))),
    }
}

pub async fn handle_execute_python(args: &Value, settings: &ToolSettings) -> Result<Value, ToolError> {
    let code = required_str(args, "code")?;

    if settings.verbose {
        eprintln!(
            "{}",
            format!(
                "[tools] run: {} snippet ({} lines, timeout={}s)",
                settings.sandbox.python,
                code.lines().count(),
                settings.sandbox.timeout.as_secs()
            )
            .dimmed()
        );
    }

    let record = execute_snippet(code, &settings.sandbox, &settings.workspace).await?;
    Ok(serde_json::to_value(record)?)
}
