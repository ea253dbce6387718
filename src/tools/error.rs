use std::io;
use std::path::Path;

use thiserror::Error;

use crate::artifacts::ArtifactError;

/// Errors a tool handler can return instead of a result mapping.
///
/// The tool-call loop turns these into an `Error: ...` tool message so the
/// model sees the failure.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Path is outside every allow-listed root. No I/O was performed.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Arguments failed schema validation or are otherwise unusable.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// Evaluated code raised, or file I/O failed.
    #[error("runtime error: {0}")]
    Runtime(String),

    /// The interpreter could not be spawned, waited on, or timed out.
    #[error("process failure: {0}")]
    ProcessFailure(String),

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("failed to serialize tool result: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ToolError {
    /// Classify an I/O error raised while touching `path`.
    pub fn from_io(err: io::Error, path: &Path) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => ToolError::NotFound(path.display().to_string()),
            io::ErrorKind::PermissionDenied => {
                ToolError::PermissionDenied(format!("{}: {}", path.display(), err))
            }
            _ => ToolError::Runtime(format!("{}: {}", path.display(), err)),
        }
    }
}
