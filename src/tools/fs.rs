use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::args::{optional_bool, required_str};
use super::paths::{display_path, normalize_lexically, resolve_within_roots};
use super::response::Status;
use super::{ToolError, ToolSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntryInfo {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListDirectoryResult {
    pub status: Status,
    pub entries: Vec<DirEntryInfo>,
    pub logs: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListModelsResult {
    pub status: Status,
    pub files: Vec<String>,
    pub logs: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadFileResult {
    pub status: Status,
    pub content: String,
    pub logs: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WriteFileResult {
    pub status: Status,
    pub bytes_written: usize,
    pub logs: String,
}

/// Enumerate entries under `root`, excluding `root` itself.
///
/// Paths are reported as `display_root` joined with the entry's path relative
/// to `root`, so a relative request yields relative paths. Entries are sorted.
pub fn collect_entries(
    root: &Path,
    display_root: &Path,
    recursive: bool,
) -> Result<Vec<DirEntryInfo>, ToolError> {
    if !root.exists() {
        return Err(ToolError::NotFound(format!(
            "directory not found: {}",
            display_root.display()
        )));
    }
    if !root.is_dir() {
        return Err(ToolError::InvalidArguments(format!(
            "path is not a directory: {}",
            display_root.display()
        )));
    }

    let mut walker = WalkDir::new(root).min_depth(1).follow_links(false);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut entries = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            let io_err = io::Error::from(e);
            ToolError::from_io(io_err, root)
        })?;
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let kind = if entry.path().is_file() {
            EntryKind::File
        } else {
            EntryKind::Directory
        };
        entries.push(DirEntryInfo {
            path: display_path(&display_root.join(relative)),
            kind,
        });
    }

    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

pub fn list_directory(settings: &ToolSettings, path: &str, recursive: bool) -> ListDirectoryResult {
    let root = settings.resolve(path);
    match collect_entries(&root, Path::new(path), recursive) {
        Ok(entries) => ListDirectoryResult {
            status: Status::Success,
            logs: format!("Listed contents of {} successfully.", path),
            entries,
        },
        Err(e) => {
            tracing::debug!(path, error = %e, "list_directory failed");
            ListDirectoryResult {
                status: Status::Failure,
                entries: Vec::new(),
                logs: format!("Failed to list {}: {}", path, e),
            }
        }
    }
}

/// True if `name` ends with one of the model suffixes.
pub fn is_model_file(name: &str, extensions: &[String]) -> bool {
    extensions.iter().any(|ext| name.ends_with(ext.as_str()))
}

pub fn list_models(settings: &ToolSettings, topic: &str) -> ListModelsResult {
    // The topic is always a sub-directory of the models root, even when absolute.
    let topic = topic.trim_start_matches(['/', '\\']);
    let display_root: PathBuf = if topic.is_empty() {
        settings.models_dir.clone()
    } else {
        settings.models_dir.join(topic)
    };
    let models_root = normalize_lexically(&settings.resolve(&display_path(&settings.models_dir)));
    let root = normalize_lexically(&settings.resolve(&display_path(&display_root)));
    if !root.starts_with(&models_root) {
        return ListModelsResult {
            status: Status::Failure,
            files: Vec::new(),
            logs: format!("Topic '{}' is outside the models directory.", topic),
        };
    }

    match collect_entries(&root, &display_root, true) {
        Ok(entries) => {
            let files: Vec<String> = entries
                .into_iter()
                .filter(|e| e.kind == EntryKind::File && is_model_file(&e.path, &settings.model_extensions))
                .map(|e| e.path)
                .collect();
            ListModelsResult {
                status: Status::Success,
                logs: format!("Found {} model file(s) in {}.", files.len(), display_root.display()),
                files,
            }
        }
        Err(e) => {
            tracing::debug!(topic, error = %e, "list_models failed");
            ListModelsResult {
                status: Status::Failure,
                files: Vec::new(),
                logs: format!("Failed to list models in {}: {}", display_root.display(), e),
            }
        }
    }
}

pub fn read_text_file(settings: &ToolSettings, path: &str) -> Result<ReadFileResult, ToolError> {
    let resolved = resolve_within_roots(path, &settings.workspace, &settings.read_allowed)?;

    let metadata = fs::metadata(&resolved).map_err(|e| ToolError::from_io(e, Path::new(path)))?;
    if !metadata.is_file() {
        return Err(ToolError::InvalidArguments(format!("path is not a file: {}", path)));
    }
    if metadata.len() > settings.max_file_size_bytes {
        return Err(ToolError::InvalidArguments(format!(
            "file too large: {} bytes (max: {} bytes)",
            metadata.len(),
            settings.max_file_size_bytes
        )));
    }

    let content = fs::read_to_string(&resolved).map_err(|e| match e.kind() {
        io::ErrorKind::InvalidData => {
            ToolError::Runtime(format!("{} is not valid UTF-8 text", path))
        }
        _ => ToolError::from_io(e, Path::new(path)),
    })?;

    Ok(ReadFileResult {
        status: Status::Success,
        content,
        logs: format!("Read {} successfully.", path),
    })
}

pub fn write_text_file(
    settings: &ToolSettings,
    path: &str,
    content: &str,
) -> Result<WriteFileResult, ToolError> {
    let resolved = resolve_within_roots(path, &settings.workspace, &settings.write_allowed)?;

    if resolved.is_dir() {
        return Err(ToolError::InvalidArguments(format!("path is a directory: {}", path)));
    }
    if let Some(parent) = resolved.parent() {
        fs::create_dir_all(parent).map_err(|e| ToolError::from_io(e, parent))?;
    }
    fs::write(&resolved, content).map_err(|e| ToolError::from_io(e, Path::new(path)))?;

    Ok(WriteFileResult {
        status: Status::Success,
        bytes_written: content.len(),
        logs: format!("Wrote to {} successfully.", path),
    })
}

// Tool handlers

pub fn handle_list_directory(args: &Value, settings: &ToolSettings) -> Result<Value, ToolError> {
    let path = required_str(args, "path")?;
    let recursive = optional_bool(args, "recursive")?.unwrap_or(false);
    Ok(serde_json::to_value(list_directory(settings, path, recursive))?)
}

pub fn handle_list_models(args: &Value, settings: &ToolSettings) -> Result<Value, ToolError> {
    let topic = required_str(args, "topic")?;
    Ok(serde_json::to_value(list_models(settings, topic))?)
}

pub fn handle_read_text_file(args: &Value, settings: &ToolSettings) -> Result<Value, ToolError> {
    let path = required_str(args, "path")?;
    Ok(serde_json::to_value(read_text_file(settings, path)?)?)
}

pub fn handle_write_text_file(args: &Value, settings: &ToolSettings) -> Result<Value, ToolError> {
    let path = required_str(args, "path")?;
    let content = required_str(args, "content")?;
    Ok(serde_json::to_value(write_text_file(settings, path, content)?)?)
}

/// `read_model_file(model_path)`: same guard as `read_text_file`.
pub fn handle_read_model_file(args: &Value, settings: &ToolSettings) -> Result<Value, ToolError> {
    let path = required_str(args, "model_path")?;
    Ok(serde_json::to_value(read_text_file(settings, path)?)?)
}

/// `write_model_file(model_path, model)`: same guard as `write_text_file`.
pub fn handle_write_model_file(args: &Value, settings: &ToolSettings) -> Result<Value, ToolError> {
    let path = required_str(args, "model_path")?;
    let content = required_str(args, "model")?;
    Ok(serde_json::to_value(write_text_file(settings, path, content)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_model_file() {
        let exts = vec![".mdl".to_string(), ".xmile".to_string()];
        assert!(is_model_file("source/models/Epidemic/SIR.mdl", &exts));
        assert!(is_model_file("teacup.xmile", &exts));
        assert!(!is_model_file("notes.txt", &exts));
        assert!(!is_model_file("model.mdl.bak", &exts));
    }
}
