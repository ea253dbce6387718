mod filesystem;
mod storage;

pub use filesystem::FilesystemArtifactStore;
pub use storage::{validate_artifact_name, Artifact, ArtifactError, ArtifactMeta, ArtifactStore};

pub const PNG_MIME_TYPE: &str = "image/png";
