use sd_agent::artifacts::{Artifact, ArtifactError, ArtifactStore, FilesystemArtifactStore, PNG_MIME_TYPE};
use sd_agent::tools::artifacts::IMAGE_STORED_MESSAGE;
use sd_agent::tools::{call_tool, ToolError, ToolRegistry, ToolSettings};
use serde_json::json;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

#[test]
fn test_versions_increment_from_zero() {
    let temp_dir = TempDir::new().unwrap();
    let store = FilesystemArtifactStore::new(temp_dir.path().join("session-1"));

    let first = store.save("plot.png", &Artifact::new(PNG_MIME_TYPE, vec![1, 2, 3])).unwrap();
    let second = store.save("plot.png", &Artifact::new(PNG_MIME_TYPE, vec![4, 5])).unwrap();
    assert_eq!((first, second), (0, 1));

    let (meta, latest) = store.load("plot.png", None).unwrap();
    assert_eq!(meta.version, 1);
    assert_eq!(latest.data, vec![4, 5]);

    let (meta, original) = store.load("plot.png", Some(0)).unwrap();
    assert_eq!(meta.size, 3);
    assert_eq!(original, Artifact::new(PNG_MIME_TYPE, vec![1, 2, 3]));
}

#[test]
fn test_list_and_missing_artifacts() {
    let temp_dir = TempDir::new().unwrap();
    let store = FilesystemArtifactStore::new(temp_dir.path());
    assert!(store.list().unwrap().is_empty());

    store.save("b.png", &Artifact::new(PNG_MIME_TYPE, vec![0])).unwrap();
    store.save("a.png", &Artifact::new(PNG_MIME_TYPE, vec![0])).unwrap();
    assert_eq!(store.list().unwrap(), vec!["a.png".to_string(), "b.png".to_string()]);

    assert!(matches!(store.load("c.png", None), Err(ArtifactError::NotFound(_))));
    assert!(matches!(
        store.load("a.png", Some(7)),
        Err(ArtifactError::VersionNotFound { version: 7, .. })
    ));
    assert!(store.latest("c.png").unwrap().is_none());
}

#[test]
fn test_invalid_names_are_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let store = FilesystemArtifactStore::new(temp_dir.path().join("s"));

    let result = store.save("../escape.png", &Artifact::new(PNG_MIME_TYPE, vec![0]));
    assert!(matches!(result, Err(ArtifactError::InvalidName(_))));
    assert!(!temp_dir.path().join("escape.png").exists());
}

fn registry_for(temp_dir: &TempDir) -> ToolRegistry {
    let store = FilesystemArtifactStore::new(temp_dir.path().join(".sd-agent/artifacts/session-x"));
    ToolRegistry::new(ToolSettings::new(temp_dir.path(), Arc::new(store)), &[])
}

#[tokio::test]
async fn test_read_png_file_stores_artifact() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("simulation_results.png"), PNG_HEADER).unwrap();
    let registry = registry_for(&temp_dir);

    let args = json!({"image_path": "simulation_results.png", "artifact_name": "simulation_results.png"});
    let value = call_tool(&registry, "read_png_file", &args).await.unwrap();
    assert_eq!(value["status"], "success");
    assert_eq!(value["message"], IMAGE_STORED_MESSAGE);
    assert_eq!(value["artifact_name"], "simulation_results.png");
    assert_eq!(value["version"], 0);

    let again = call_tool(&registry, "read_png_file", &args).await.unwrap();
    assert_eq!(again["version"], 1);

    let (meta, artifact) = registry
        .settings()
        .artifacts
        .load("simulation_results.png", None)
        .unwrap();
    assert_eq!(meta.mime_type, "image/png");
    assert_eq!(artifact.data, PNG_HEADER);
}

#[tokio::test]
async fn test_read_png_file_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let registry = registry_for(&temp_dir);

    let result = call_tool(
        &registry,
        "read_png_file",
        &json!({"image_path": "nope.png", "artifact_name": "nope.png"}),
    )
    .await;
    assert!(matches!(result, Err(ToolError::NotFound(_))));
    assert!(registry.settings().artifacts.list().unwrap().is_empty());
}

#[tokio::test]
async fn test_load_artifacts_describes_requested_names() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("phase.png"), PNG_HEADER).unwrap();
    let registry = registry_for(&temp_dir);

    call_tool(
        &registry,
        "read_png_file",
        &json!({"image_path": "phase.png", "artifact_name": "phase_portrait.png"}),
    )
    .await
    .unwrap();

    let value = call_tool(
        &registry,
        "load_artifacts",
        &json!({"artifact_names": ["phase_portrait.png", "unknown.png"]}),
    )
    .await
    .unwrap();

    assert_eq!(value["status"], "success");
    assert_eq!(value["available"], json!(["phase_portrait.png"]));
    assert_eq!(value["artifacts"][0]["name"], "phase_portrait.png");
    assert_eq!(value["artifacts"][0]["version"], 0);
    assert_eq!(value["artifacts"][0]["size"], PNG_HEADER.len());
    assert!(value["artifacts"][0]["path"].as_str().unwrap().ends_with("0.bin"));
    assert!(value["logs"].as_str().unwrap().contains("unknown.png"));

    let listing = call_tool(&registry, "load_artifacts", &json!({})).await.unwrap();
    assert_eq!(listing["artifacts"], json!([]));
}
