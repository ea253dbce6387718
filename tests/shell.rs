use sd_agent::artifacts::FilesystemArtifactStore;
use sd_agent::tools::shell::run_shell_command;
use sd_agent::tools::{call_tool, ShellSettings, Status, ToolRegistry, ToolSettings};
use serde_json::json;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn shell_settings() -> ShellSettings {
    ShellSettings {
        timeout: Duration::from_secs(30),
        max_output_bytes: 1024 * 1024,
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_echo_succeeds() {
    let temp_dir = TempDir::new().unwrap();

    let outcome = run_shell_command("echo hello", temp_dir.path(), &shell_settings()).await;
    assert_eq!(outcome.stdout, "hello\n");
    assert_eq!(outcome.stderr, "");
    assert_eq!(outcome.returncode, 0);
    assert_eq!(outcome.status, Status::Success);
}

#[cfg(unix)]
#[tokio::test]
async fn test_nonzero_exit_keeps_streams() {
    let temp_dir = TempDir::new().unwrap();

    let outcome = run_shell_command(
        "echo partial; echo oops >&2; exit 3",
        temp_dir.path(),
        &shell_settings(),
    )
    .await;
    assert_eq!(outcome.status, Status::Failure);
    assert_eq!(outcome.returncode, 3);
    assert_eq!(outcome.stdout, "partial\n");
    assert_eq!(outcome.stderr, "oops\n");
}

#[cfg(unix)]
#[tokio::test]
async fn test_unknown_command_is_failure() {
    let temp_dir = TempDir::new().unwrap();

    let outcome = run_shell_command(
        "definitely-not-a-command-xyz",
        temp_dir.path(),
        &shell_settings(),
    )
    .await;
    assert_eq!(outcome.status, Status::Failure);
    assert_ne!(outcome.returncode, 0);
    assert!(!outcome.stderr.is_empty());
}

#[tokio::test]
async fn test_missing_working_directory_is_failure() {
    let temp_dir = TempDir::new().unwrap();

    let outcome = run_shell_command(
        "echo hi",
        &temp_dir.path().join("missing"),
        &shell_settings(),
    )
    .await;
    assert_eq!(outcome.status, Status::Failure);
    assert_eq!(outcome.returncode, 1);
    assert_eq!(outcome.stdout, "");
    assert!(!outcome.stderr.is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn test_timeout_reports_minus_one() {
    let temp_dir = TempDir::new().unwrap();
    let settings = ShellSettings {
        timeout: Duration::from_millis(200),
        max_output_bytes: 1024,
    };

    let outcome = run_shell_command("sleep 5", temp_dir.path(), &settings).await;
    assert_eq!(outcome.status, Status::Failure);
    assert_eq!(outcome.returncode, -1);
}

#[cfg(unix)]
#[tokio::test]
async fn test_tool_uses_given_working_directory() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("runs")).unwrap();
    fs::write(temp_dir.path().join("runs/marker.txt"), "").unwrap();

    let store = FilesystemArtifactStore::new(temp_dir.path().join("artifacts"));
    let registry = ToolRegistry::new(ToolSettings::new(temp_dir.path(), Arc::new(store)), &[]);

    let value = call_tool(
        &registry,
        "execute_shell_command",
        &json!({"command": "ls", "current_working_directory": "runs"}),
    )
    .await
    .unwrap();

    assert_eq!(value["status"], "success");
    assert_eq!(value["returncode"], 0);
    assert_eq!(value["stdout"], "marker.txt\n");
}
