use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::artifacts::ArtifactStore;
use crate::config::{expand_env_vars, Config, SandboxConfig, ShellConfig, ToolsConfig};

use super::paths::{absolutize, normalize_lexically};

#[derive(Debug, Clone)]
pub struct SandboxSettings {
    pub python: String,
    pub preload: Vec<String>,
    pub timeout: Duration,
    pub max_output_bytes: u64,
    pub env: HashMap<String, String>,
}

impl From<&SandboxConfig> for SandboxSettings {
    fn from(config: &SandboxConfig) -> Self {
        Self {
            python: config.python.clone(),
            preload: config.preload.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            max_output_bytes: config.max_output_bytes,
            env: expand_env_vars(&config.env),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShellSettings {
    pub timeout: Duration,
    pub max_output_bytes: u64,
}

impl From<&ShellConfig> for ShellSettings {
    fn from(config: &ShellConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            max_output_bytes: config.max_output_bytes,
        }
    }
}

/// Everything a tool handler may consult. Immutable once built.
#[derive(Clone)]
pub struct ToolSettings {
    /// Absolute directory relative paths resolve against.
    pub workspace: PathBuf,
    pub max_file_size_bytes: u64,
    /// Models root as configured (relative paths are kept relative for display).
    pub models_dir: PathBuf,
    pub model_extensions: Vec<String>,
    pub read_allowed: Vec<PathBuf>,
    pub write_allowed: Vec<PathBuf>,
    pub sandbox: SandboxSettings,
    pub shell: ShellSettings,
    pub artifacts: Arc<dyn ArtifactStore>,
    pub verbose: bool,
}

impl ToolSettings {
    /// Settings with every default, rooted at `workspace`.
    pub fn new(workspace: &Path, artifacts: Arc<dyn ArtifactStore>) -> Self {
        Self::from_parts(
            workspace,
            &ToolsConfig::default(),
            &SandboxConfig::default(),
            &ShellConfig::default(),
            artifacts,
        )
    }

    pub fn from_config(config: &Config, artifacts: Arc<dyn ArtifactStore>) -> Self {
        let mut settings = Self::from_parts(
            &config.workspace,
            &config.tools,
            &config.sandbox,
            &config.shell,
            artifacts,
        );
        settings.verbose = config.verbose;
        settings
    }

    fn from_parts(
        workspace: &Path,
        tools: &ToolsConfig,
        sandbox: &SandboxConfig,
        shell: &ShellConfig,
        artifacts: Arc<dyn ArtifactStore>,
    ) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let workspace = normalize_lexically(&absolutize(workspace, &cwd));

        let roots = |dirs: &[String]| -> Vec<PathBuf> {
            dirs.iter()
                .map(|d| crate::config::expand_env_var_in_string(d))
                .filter(|d| !d.is_empty())
                .map(PathBuf::from)
                .collect()
        };

        Self {
            max_file_size_bytes: tools.max_file_size_mb * 1024 * 1024,
            models_dir: PathBuf::from(crate::config::expand_env_var_in_string(&tools.models_dir)),
            model_extensions: tools.model_extensions.clone(),
            read_allowed: roots(&tools.read_allowed),
            write_allowed: roots(&tools.write_allowed),
            sandbox: SandboxSettings::from(sandbox),
            shell: ShellSettings::from(shell),
            artifacts,
            verbose: false,
            workspace,
        }
    }

    /// Resolve a user-supplied path against the workspace without any containment check.
    pub fn resolve(&self, user_path: &str) -> PathBuf {
        absolutize(Path::new(user_path), &self.workspace)
    }
}
