use sd_agent::artifacts::FilesystemArtifactStore;
use sd_agent::tools::fs::{list_directory, list_models, read_text_file, write_text_file, EntryKind};
use sd_agent::tools::{call_tool, format_tools_for_llm, Status, ToolError, ToolRegistry, ToolSettings};
use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn settings_for(workspace: &Path) -> ToolSettings {
    let store = FilesystemArtifactStore::new(workspace.join(".sd-agent").join("artifacts"));
    ToolSettings::new(workspace, Arc::new(store))
}

fn model_tree() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let epidemic = temp_dir.path().join("source/models/Epidemic");
    fs::create_dir_all(epidemic.join("variants")).unwrap();
    fs::write(epidemic.join("SIR.mdl"), "{UTF-8}\nInfected = INTEG(...)").unwrap();
    fs::write(epidemic.join("variants/SEIR.xmile"), "<xmile/>").unwrap();
    fs::write(epidemic.join("README.txt"), "notes").unwrap();
    fs::create_dir_all(temp_dir.path().join("source/models/Empty")).unwrap();
    fs::write(temp_dir.path().join("source/models/Empty/notes.txt"), "x").unwrap();
    fs::write(temp_dir.path().join("secret.txt"), "top secret").unwrap();
    temp_dir
}

#[test]
fn test_list_directory_non_recursive_and_recursive() {
    let temp_dir = model_tree();
    let settings = settings_for(temp_dir.path());

    let flat = list_directory(&settings, "source/models/Epidemic", false);
    assert_eq!(flat.status, Status::Success);
    assert_eq!(flat.logs, "Listed contents of source/models/Epidemic successfully.");
    let paths: Vec<&str> = flat.entries.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "source/models/Epidemic/README.txt",
            "source/models/Epidemic/SIR.mdl",
            "source/models/Epidemic/variants",
        ]
    );
    assert_eq!(flat.entries[2].kind, EntryKind::Directory);

    let deep = list_directory(&settings, "source/models/Epidemic", true);
    assert!(deep.entries.len() >= flat.entries.len());
    assert!(deep
        .entries
        .iter()
        .any(|e| e.path == "source/models/Epidemic/variants/SEIR.xmile" && e.kind == EntryKind::File));
}

#[test]
fn test_list_directory_missing_root_is_failure() {
    let temp_dir = TempDir::new().unwrap();
    let settings = settings_for(temp_dir.path());

    let result = list_directory(&settings, "does/not/exist", false);
    assert_eq!(result.status, Status::Failure);
    assert!(result.entries.is_empty());
    assert!(result.logs.contains("does/not/exist"));
}

#[test]
fn test_list_models_filters_by_extension() {
    let temp_dir = model_tree();
    let settings = settings_for(temp_dir.path());

    let result = list_models(&settings, "Epidemic");
    assert_eq!(result.status, Status::Success);
    assert_eq!(
        result.files,
        vec![
            "source/models/Epidemic/SIR.mdl".to_string(),
            "source/models/Epidemic/variants/SEIR.xmile".to_string(),
        ]
    );
}

#[test]
fn test_list_models_without_models_is_empty_success() {
    let temp_dir = model_tree();
    let settings = settings_for(temp_dir.path());

    let result = list_models(&settings, "Empty");
    assert_eq!(result.status, Status::Success);
    assert!(result.files.is_empty());

    let missing = list_models(&settings, "Economics");
    assert_eq!(missing.status, Status::Failure);
}

#[test]
fn test_list_models_topic_stays_under_models_dir() {
    let temp_dir = model_tree();
    let settings = settings_for(temp_dir.path());

    let absolute = list_models(&settings, "/Epidemic");
    assert_eq!(absolute.status, Status::Success);
    assert_eq!(absolute.files.len(), 2);
    assert!(absolute.files.iter().all(|f| f.starts_with("source/models/Epidemic")));

    let outside = list_models(&settings, temp_dir.path().to_str().unwrap());
    assert_eq!(outside.status, Status::Failure);
    assert!(outside.files.is_empty());

    let escaped = list_models(&settings, "../..");
    assert_eq!(escaped.status, Status::Failure);
    assert!(escaped.logs.contains("outside the models directory"));
}

#[test]
fn test_read_outside_allowed_roots_is_denied() {
    let temp_dir = model_tree();
    let settings = settings_for(temp_dir.path());

    for path in ["secret.txt", "source/models/../../secret.txt", "/etc/hostname"] {
        match read_text_file(&settings, path) {
            Err(ToolError::PermissionDenied(_)) => {}
            other => panic!("expected permission denied for {}, got {:?}", path, other.map(|r| r.content)),
        }
    }
}

#[test]
fn test_write_outside_allowed_roots_creates_nothing() {
    let temp_dir = model_tree();
    let settings = settings_for(temp_dir.path());

    let result = write_text_file(&settings, "source/models/../escape.txt", "data");
    assert!(matches!(result, Err(ToolError::PermissionDenied(_))));
    assert!(!temp_dir.path().join("source/escape.txt").exists());

    let result = write_text_file(&settings, "elsewhere/new.mdl", "data");
    assert!(matches!(result, Err(ToolError::PermissionDenied(_))));
    assert!(!temp_dir.path().join("elsewhere").exists());
}

#[test]
fn test_write_then_read_round_trip() {
    let temp_dir = model_tree();
    let settings = settings_for(temp_dir.path());
    let text = "{UTF-8}\nStock = INTEG(Inflow - Outflow, 100)\n~\t~\t|\n";

    let written = write_text_file(&settings, "source/models/Custom/new/Stock.mdl", text).unwrap();
    assert_eq!(written.status, Status::Success);
    assert_eq!(written.bytes_written, text.len());
    assert_eq!(written.logs, "Wrote to source/models/Custom/new/Stock.mdl successfully.");

    let read = read_text_file(&settings, "source/models/Custom/new/Stock.mdl").unwrap();
    assert_eq!(read.content, text);
    assert_eq!(read.logs, "Read source/models/Custom/new/Stock.mdl successfully.");
}

#[test]
fn test_read_missing_file_is_not_found() {
    let temp_dir = model_tree();
    let settings = settings_for(temp_dir.path());

    let result = read_text_file(&settings, "source/models/Epidemic/missing.mdl");
    assert!(matches!(result, Err(ToolError::NotFound(_))));
}

#[test]
fn test_read_rejects_large_files() {
    let temp_dir = model_tree();
    let mut settings = settings_for(temp_dir.path());
    settings.max_file_size_bytes = 4;

    let result = read_text_file(&settings, "source/models/Epidemic/SIR.mdl");
    assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
}

#[cfg(unix)]
#[test]
fn test_symlink_escape_is_denied() {
    let temp_dir = model_tree();
    let settings = settings_for(temp_dir.path());
    std::os::unix::fs::symlink(
        temp_dir.path().join("secret.txt"),
        temp_dir.path().join("source/models/link.txt"),
    )
    .unwrap();

    let result = read_text_file(&settings, "source/models/link.txt");
    assert!(matches!(result, Err(ToolError::PermissionDenied(_))));
}

#[test]
fn test_dangling_symlink_escape_is_denied() {
    let temp_dir = model_tree();
    let settings = settings_for(temp_dir.path());
    let outside = temp_dir.path().join("outside");
    fs::create_dir_all(&outside).unwrap();
    std::os::unix::fs::symlink(
        outside.join("pwned.txt"),
        temp_dir.path().join("source/models/evil.mdl"),
    )
    .unwrap();

    let result = write_text_file(&settings, "source/models/evil.mdl", "x");
    assert!(matches!(result, Err(ToolError::PermissionDenied(_))));
    assert!(!outside.join("pwned.txt").exists());

    // A missing target directory behind the link is still resolved.
    std::os::unix::fs::symlink(
        temp_dir.path().join("elsewhere/deep/pwned.txt"),
        temp_dir.path().join("source/models/evil2.mdl"),
    )
    .unwrap();
    let result = write_text_file(&settings, "source/models/evil2.mdl", "x");
    assert!(matches!(result, Err(ToolError::PermissionDenied(_))));
    assert!(!temp_dir.path().join("elsewhere").exists());
}

#[test]
fn test_dangling_symlink_inside_root_is_written_through() {
    let temp_dir = model_tree();
    let settings = settings_for(temp_dir.path());
    std::os::unix::fs::symlink(
        "Epidemic/SEIRS.mdl",
        temp_dir.path().join("source/models/latest.mdl"),
    )
    .unwrap();

    let written = write_text_file(&settings, "source/models/latest.mdl", "{UTF-8}").unwrap();
    assert_eq!(written.bytes_written, 7);
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("source/models/Epidemic/SEIRS.mdl")).unwrap(),
        "{UTF-8}"
    );
}

#[test]
fn test_symlink_loop_is_denied() {
    let temp_dir = model_tree();
    let settings = settings_for(temp_dir.path());
    let models = temp_dir.path().join("source/models");
    std::os::unix::fs::symlink(models.join("b.mdl"), models.join("a.mdl")).unwrap();
    std::os::unix::fs::symlink(models.join("a.mdl"), models.join("b.mdl")).unwrap();

    let result = write_text_file(&settings, "source/models/a.mdl", "x");
    assert!(matches!(result, Err(ToolError::PermissionDenied(_))));
}

#[tokio::test]
async fn test_call_tool_validates_arguments() {
    let temp_dir = model_tree();
    let registry = ToolRegistry::new(settings_for(temp_dir.path()), &[]);

    let result = call_tool(&registry, "read_text_file", &json!({})).await;
    assert!(matches!(result, Err(ToolError::InvalidArguments(_))));

    let result = call_tool(&registry, "list_directory", &json!({"path": ".", "extra": 1})).await;
    assert!(matches!(result, Err(ToolError::InvalidArguments(_))));

    let result = call_tool(&registry, "no_such_tool", &json!({})).await;
    assert!(matches!(result, Err(ToolError::UnknownTool(_))));
}

#[tokio::test]
async fn test_call_tool_returns_result_mapping() {
    let temp_dir = model_tree();
    let registry = ToolRegistry::new(settings_for(temp_dir.path()), &[]);

    let value = call_tool(&registry, "list_models", &json!({"topic": "Epidemic"}))
        .await
        .unwrap();
    assert_eq!(value["status"], "success");
    assert_eq!(value["files"].as_array().unwrap().len(), 2);

    let value = call_tool(
        &registry,
        "read_model_file",
        &json!({"model_path": "source/models/Epidemic/SIR.mdl"}),
    )
    .await
    .unwrap();
    assert!(value["content"].as_str().unwrap().starts_with("{UTF-8}"));
}

#[tokio::test]
async fn test_write_model_file_alias_is_guarded() {
    let temp_dir = model_tree();
    let registry = ToolRegistry::new(settings_for(temp_dir.path()), &[]);

    let result = call_tool(
        &registry,
        "write_model_file",
        &json!({"model_path": "outside.mdl", "model": "x"}),
    )
    .await;
    assert!(matches!(result, Err(ToolError::PermissionDenied(_))));
    assert!(!temp_dir.path().join("outside.mdl").exists());
}

#[test]
fn test_disabled_tools_are_not_registered() {
    let temp_dir = TempDir::new().unwrap();
    let disabled = vec!["execute_shell_command".to_string()];
    let registry = ToolRegistry::new(settings_for(temp_dir.path()), &disabled);

    assert!(registry.get("execute_shell_command").is_none());
    assert!(registry.get("execute_python_code_snippet").is_some());
    assert!(!registry.names().contains(&"execute_shell_command"));
}

#[test]
fn test_format_tools_for_llm() {
    let temp_dir = TempDir::new().unwrap();
    let registry = ToolRegistry::new(settings_for(temp_dir.path()), &[]);

    let offered = registry.offered(&["list_models", "read_png_file", "not_registered"]);
    let formatted = format_tools_for_llm(&offered);
    assert_eq!(formatted.len(), 2);
    assert_eq!(formatted[0]["type"], "function");
    assert_eq!(formatted[0]["function"]["name"], "list_models");
    assert_eq!(formatted[1]["function"]["parameters"]["required"], json!(["image_path", "artifact_name"]));
}
