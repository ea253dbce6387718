use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// A binary blob tagged with its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl Artifact {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }
}

/// Metadata kept next to every stored version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMeta {
    pub name: String,
    pub version: u32,
    pub mime_type: String,
    pub size: u64,
    pub created_at: DateTime<Local>,
}

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("invalid artifact name '{0}'")]
    InvalidName(String),

    #[error("artifact '{0}' not found")]
    NotFound(String),

    #[error("artifact '{name}' has no version {version}")]
    VersionNotFound { name: String, version: u32 },

    #[error("artifact storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("artifact metadata is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

/// Versioned, named blob storage scoped to one session.
pub trait ArtifactStore: Send + Sync {
    /// Append a new version of `name` and return its version number.
    fn save(&self, name: &str, artifact: &Artifact) -> Result<u32, ArtifactError>;

    /// Load the given version, or the latest when `version` is `None`.
    fn load(&self, name: &str, version: Option<u32>) -> Result<(ArtifactMeta, Artifact), ArtifactError>;

    /// Metadata of the latest version of `name`, if any.
    fn latest(&self, name: &str) -> Result<Option<ArtifactMeta>, ArtifactError>;

    /// Names of all stored artifacts, sorted.
    fn list(&self) -> Result<Vec<String>, ArtifactError>;

    /// Where the data of a version lives, for stores that keep it on disk.
    fn location(&self, _name: &str, _version: u32) -> Option<PathBuf> {
        None
    }
}

/// Reject names that are empty, contain path separators or parent references.
pub fn validate_artifact_name(name: &str) -> Result<(), ArtifactError> {
    let bad = name.trim().is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || name.contains('\0')
        || name.starts_with('.');
    if bad {
        return Err(ArtifactError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_artifact_name() {
        assert!(validate_artifact_name("sir_plot.png").is_ok());
        assert!(validate_artifact_name("peak infections").is_ok());
        assert!(validate_artifact_name("").is_err());
        assert!(validate_artifact_name("   ").is_err());
        assert!(validate_artifact_name("../escape").is_err());
        assert!(validate_artifact_name("a/b").is_err());
        assert!(validate_artifact_name("a\\b").is_err());
        assert!(validate_artifact_name(".hidden").is_err());
    }

    #[test]
    fn test_not_found_message() {
        let err = ArtifactError::VersionNotFound {
            name: "plot".into(),
            version: 3,
        };
        assert_eq!(err.to_string(), "artifact 'plot' has no version 3");
        let err = ArtifactError::NotFound("plot".into());
        assert_eq!(err.to_string(), "artifact 'plot' not found");
    }
}
