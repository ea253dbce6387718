use super::storage::SessionStore;
use crate::error::{Result, SdAgentError};
use crate::models::Session;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

pub const SESSION_EXPIRY_MINUTES: i64 = 30;

/// Stores each session as `session-<id>.json` in one directory.
pub struct FilesystemSessionStore {
    dir: PathBuf,
}

impl FilesystemSessionStore {
    /// Store under the user cache directory (`~/.cache/sd-agent` on Linux).
    pub fn new() -> Result<Self> {
        let dir = dirs::cache_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".cache")))
            .ok_or_else(|| {
                SdAgentError::SessionError("Cannot determine a cache directory".to_string())
            })?
            .join("sd-agent");
        Ok(Self::with_dir(dir))
    }

    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn is_session_file(path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "json")
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("session-"))
    }

    /// Every readable session, most recent first.
    fn load_all(&self) -> Vec<(PathBuf, Session)> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };

        let mut sessions: Vec<(PathBuf, Session)> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| Self::is_session_file(path))
            .filter_map(|path| {
                let content = fs::read_to_string(&path).ok()?;
                match serde_json::from_str::<Session>(&content) {
                    Ok(session) => Some((path, session)),
                    Err(e) => {
                        tracing::debug!(path = %path.display(), error = %e, "skipping unreadable session");
                        None
                    }
                }
            })
            .collect();

        sessions.sort_by(|a, b| b.1.last_updated.cmp(&a.1.last_updated));
        sessions
    }
}

impl SessionStore for FilesystemSessionStore {
    fn find_recent_session(&self) -> Option<Session> {
        let now = Local::now();
        let (path, session) = self.load_all().into_iter().next()?;

        let age_minutes = now.signed_duration_since(session.last_updated).num_minutes();
        if age_minutes.abs() < SESSION_EXPIRY_MINUTES {
            Some(session)
        } else {
            // Expired sessions are cleaned up lazily.
            let _ = fs::remove_file(path);
            None
        }
    }

    fn find_latest_session(&self) -> Option<Session> {
        self.load_all().into_iter().next().map(|(_, session)| session)
    }

    fn save_session(&self, session: &Session) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            SdAgentError::SessionError(format!("Failed to create {}: {}", self.dir.display(), e))
        })?;
        let session_file = self.dir.join(format!("session-{}.json", session.session_id));
        let content = serde_json::to_string_pretty(session)?;
        fs::write(&session_file, content).map_err(|e| {
            SdAgentError::SessionError(format!("Failed to write {}: {}", session_file.display(), e))
        })?;
        Ok(())
    }

    fn clear_all_sessions(&self) -> Result<()> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Ok(());
        };
        for path in entries.filter_map(|e| e.ok()).map(|e| e.path()) {
            if Self::is_session_file(&path) {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}
