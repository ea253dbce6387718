use super::storage::{validate_artifact_name, Artifact, ArtifactError, ArtifactMeta, ArtifactStore};
use chrono::Local;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Stores `<root>/<name>/<version>.bin` with a sibling `<version>.json` of metadata.
///
/// `root` is normally `<artifacts_dir>/<session_id>`.
pub struct FilesystemArtifactStore {
    root: PathBuf,
}

impl FilesystemArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn artifact_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn data_path(&self, name: &str, version: u32) -> PathBuf {
        self.artifact_dir(name).join(format!("{}.bin", version))
    }

    fn meta_path(&self, name: &str, version: u32) -> PathBuf {
        self.artifact_dir(name).join(format!("{}.json", version))
    }

    /// Stored versions of `name`, ascending. Missing directory means none.
    fn versions(&self, name: &str) -> Result<Vec<u32>, ArtifactError> {
        let entries = match fs::read_dir(self.artifact_dir(name)) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut versions: Vec<u32> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension()? != "json" {
                    return None;
                }
                path.file_stem()?.to_str()?.parse::<u32>().ok()
            })
            .collect();
        versions.sort_unstable();
        Ok(versions)
    }

    fn read_meta(&self, name: &str, version: u32) -> Result<ArtifactMeta, ArtifactError> {
        let content = fs::read_to_string(self.meta_path(name, version)).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                ArtifactError::VersionNotFound {
                    name: name.to_string(),
                    version,
                }
            } else {
                e.into()
            }
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl ArtifactStore for FilesystemArtifactStore {
    fn save(&self, name: &str, artifact: &Artifact) -> Result<u32, ArtifactError> {
        validate_artifact_name(name)?;
        fs::create_dir_all(self.artifact_dir(name))?;

        let version = self
            .versions(name)?
            .last()
            .map(|v| v + 1)
            .unwrap_or(0);

        fs::write(self.data_path(name, version), &artifact.data)?;

        // Metadata is written last; a version without it is not listed.
        let meta = ArtifactMeta {
            name: name.to_string(),
            version,
            mime_type: artifact.mime_type.clone(),
            size: artifact.data.len() as u64,
            created_at: Local::now(),
        };
        fs::write(self.meta_path(name, version), serde_json::to_string_pretty(&meta)?)?;

        tracing::debug!(name, version, size = meta.size, "artifact saved");
        Ok(version)
    }

    fn load(&self, name: &str, version: Option<u32>) -> Result<(ArtifactMeta, Artifact), ArtifactError> {
        validate_artifact_name(name)?;
        let version = match version {
            Some(v) => v,
            None => *self
                .versions(name)?
                .last()
                .ok_or_else(|| ArtifactError::NotFound(name.to_string()))?,
        };

        let meta = self.read_meta(name, version)?;
        let data = fs::read(self.data_path(name, version))?;
        let artifact = Artifact::new(meta.mime_type.clone(), data);
        Ok((meta, artifact))
    }

    fn latest(&self, name: &str) -> Result<Option<ArtifactMeta>, ArtifactError> {
        validate_artifact_name(name)?;
        match self.versions(name)?.last() {
            Some(&version) => Ok(Some(self.read_meta(name, version)?)),
            None => Ok(None),
        }
    }

    fn list(&self) -> Result<Vec<String>, ArtifactError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries.filter_map(|e| e.ok()) {
            if !entry.path().is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if !self.versions(&name)?.is_empty() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    fn location(&self, name: &str, version: u32) -> Option<PathBuf> {
        Some(self.data_path(name, version))
    }
}
