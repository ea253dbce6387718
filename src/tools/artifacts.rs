use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use crate::artifacts::{validate_artifact_name, Artifact, ArtifactMeta, PNG_MIME_TYPE};

use super::args::{optional_str_list, required_str};
use super::response::Status;
use super::{ToolError, ToolSettings};

pub const IMAGE_STORED_MESSAGE: &str = "Image loaded successfully and stored in artifacts.";

#[derive(Debug, Serialize)]
pub struct StoredImage {
    pub status: Status,
    pub message: String,
    pub artifact_name: String,
    pub version: u32,
}

#[derive(Debug, Serialize)]
pub struct ArtifactSummary {
    #[serde(flatten)]
    pub meta: ArtifactMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoadedArtifacts {
    pub status: Status,
    pub available: Vec<String>,
    pub artifacts: Vec<ArtifactSummary>,
    pub logs: String,
}

/// Read the file at `image_path` and store it as a new version of `artifact_name`.
pub async fn read_png_file(
    settings: &ToolSettings,
    image_path: &str,
    artifact_name: &str,
) -> Result<StoredImage, ToolError> {
    validate_artifact_name(artifact_name)?;

    let resolved = settings.resolve(image_path);
    let data = tokio::fs::read(&resolved)
        .await
        .map_err(|e| ToolError::from_io(e, Path::new(image_path)))?;

    let store = Arc::clone(&settings.artifacts);
    let name = artifact_name.to_string();
    let artifact = Artifact::new(PNG_MIME_TYPE, data);
    let version = tokio::task::spawn_blocking(move || store.save(&name, &artifact))
        .await
        .map_err(|e| ToolError::Runtime(format!("artifact save task failed: {}", e)))??;

    Ok(StoredImage {
        status: Status::Success,
        message: IMAGE_STORED_MESSAGE.to_string(),
        artifact_name: artifact_name.to_string(),
        version,
    })
}

/// Describe the stored artifacts, with details for each requested name.
///
/// Unknown names are reported in `logs` rather than failing the call.
pub fn load_artifacts(settings: &ToolSettings, names: &[String]) -> Result<LoadedArtifacts, ToolError> {
    let store = &settings.artifacts;
    let available = store.list()?;

    let mut artifacts = Vec::new();
    let mut missing = Vec::new();
    for name in names {
        match store.latest(name)? {
            Some(meta) => {
                let path = store
                    .location(&meta.name, meta.version)
                    .map(|p| p.display().to_string());
                artifacts.push(ArtifactSummary { meta, path });
            }
            None => missing.push(name.as_str()),
        }
    }

    let logs = if missing.is_empty() {
        format!("{} artifact(s) available.", available.len())
    } else {
        format!(
            "{} artifact(s) available. Not found: {}.",
            available.len(),
            missing.join(", ")
        )
    };

    Ok(LoadedArtifacts {
        status: Status::Success,
        available,
        artifacts,
        logs,
    })
}

pub async fn handle_read_png_file(args: &Value, settings: &ToolSettings) -> Result<Value, ToolError> {
    let image_path = required_str(args, "image_path")?;
    let artifact_name = required_str(args, "artifact_name")?;
    Ok(serde_json::to_value(read_png_file(settings, image_path, artifact_name).await?)?)
}

pub fn handle_load_artifacts(args: &Value, settings: &ToolSettings) -> Result<Value, ToolError> {
    let names = optional_str_list(args, "artifact_names")?.unwrap_or_default();
    for name in &names {
        validate_artifact_name(name)?;
    }
    Ok(serde_json::to_value(load_artifacts(settings, &names)?)?)
}
