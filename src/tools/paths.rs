use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use super::ToolError;

const MAX_PATH_LEN: usize = 4096;

/// Join `path` onto `base` unless it is already absolute.
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Remove `.` and `..` components without touching the filesystem.
/// `..` never climbs above the root.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let at_root = matches!(
                    out.components().next_back(),
                    None | Some(Component::RootDir) | Some(Component::Prefix(_))
                );
                if !at_root {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Dangling symlinks followed before giving up.
const MAX_SYMLINK_HOPS: usize = 40;

/// Canonicalize the deepest existing ancestor of `path` and re-append the
/// components that do not exist yet. `path` must already be lexically normal.
///
/// A dangling symlink is not a missing name: its target is resolved the same way.
pub fn resolve_existing_prefix(path: &Path) -> io::Result<PathBuf> {
    resolve_following_links(path, MAX_SYMLINK_HOPS)
}

fn resolve_following_links(path: &Path, hops: usize) -> io::Result<PathBuf> {
    let mut existing = path.to_path_buf();
    let mut missing: Vec<OsString> = Vec::new();

    loop {
        if let Ok(canonical) = existing.canonicalize() {
            return Ok(append_missing(canonical, &missing));
        }

        let is_link = fs::symlink_metadata(&existing)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false);
        if is_link {
            if hops == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!("too many levels of symbolic links: {}", path.display()),
                ));
            }
            let target = fs::read_link(&existing)?;
            let base = existing.parent().map(Path::to_path_buf).unwrap_or_default();
            let next = normalize_lexically(&absolutize(&target, &base));
            let resolved = resolve_following_links(&next, hops - 1)?;
            return Ok(append_missing(resolved, &missing));
        }

        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent.to_path_buf();
            }
            _ => return Ok(path.to_path_buf()),
        }
    }
}

fn append_missing(mut resolved: PathBuf, missing: &[OsString]) -> PathBuf {
    for name in missing.iter().rev() {
        resolved.push(name);
    }
    resolved
}

/// Resolve a user path to its real location, following symlinks where they exist.
pub fn resolve_real_path(user_path: &Path, workspace: &Path) -> io::Result<PathBuf> {
    resolve_existing_prefix(&normalize_lexically(&absolutize(user_path, workspace)))
}

/// Resolve `user_path` and require it to lie inside one of `roots`.
///
/// Containment is checked on resolved paths, so `..` segments and symlinks
/// that lead outside a root are rejected even when the text starts with an
/// allowed prefix.
pub fn resolve_within_roots(
    user_path: &str,
    workspace: &Path,
    roots: &[PathBuf],
) -> Result<PathBuf, ToolError> {
    if user_path.is_empty() || user_path.len() > MAX_PATH_LEN {
        return Err(ToolError::InvalidArguments(format!(
            "path must be non-empty and under {} characters",
            MAX_PATH_LEN
        )));
    }

    let resolved = resolve_real_path(Path::new(user_path), workspace).map_err(|e| {
        ToolError::PermissionDenied(format!("cannot resolve '{}': {}", user_path, e))
    })?;

    let allowed = roots
        .iter()
        .filter_map(|root| resolve_real_path(root, workspace).ok())
        .any(|root| resolved.starts_with(&root));

    if allowed {
        Ok(resolved)
    } else {
        Err(ToolError::PermissionDenied(format!(
            "access to '{}' is not allowed. Allowed directories: {}",
            user_path,
            roots
                .iter()
                .map(|r| r.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }
}

/// Convert a path to a String, replacing invalid UTF-8.
pub fn display_path(p: &Path) -> String {
    p.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lexically() {
        assert_eq!(
            normalize_lexically(Path::new("source/models/../models/./sir.mdl")),
            PathBuf::from("source/models/sir.mdl")
        );
        assert_eq!(normalize_lexically(Path::new("/../etc")), PathBuf::from("/etc"));
        assert_eq!(normalize_lexically(Path::new("a/../../b")), PathBuf::from("b"));
    }

    #[test]
    fn test_absolutize_keeps_absolute_paths() {
        let base = Path::new("/work");
        assert_eq!(absolutize(Path::new("/tmp/x"), base), PathBuf::from("/tmp/x"));
        assert_eq!(absolutize(Path::new("x"), base), PathBuf::from("/work/x"));
    }
}
