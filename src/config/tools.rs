use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::defaults::{
    default_allowed_dirs, default_max_file_size_mb, default_max_output_bytes,
    default_model_extensions, default_models_dir, default_preload, default_python,
    default_sandbox_timeout, default_shell_timeout, default_true,
};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Directory relative paths are resolved against. Defaults to the current directory.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,

    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,

    #[serde(default = "default_models_dir")]
    pub models_dir: String,

    #[serde(default = "default_model_extensions")]
    pub model_extensions: Vec<String>,

    #[serde(default = "default_allowed_dirs")]
    pub read_allowed: Vec<String>,

    #[serde(default = "default_allowed_dirs")]
    pub write_allowed: Vec<String>,

    /// Tool names that are never offered to the model.
    #[serde(default)]
    pub disabled: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            workspace: None,
            max_file_size_mb: default_max_file_size_mb(),
            models_dir: default_models_dir(),
            model_extensions: default_model_extensions(),
            read_allowed: default_allowed_dirs(),
            write_allowed: default_allowed_dirs(),
            disabled: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SandboxConfig {
    #[serde(default = "default_python")]
    pub python: String,

    #[serde(default = "default_preload")]
    pub preload: Vec<String>,

    #[serde(default = "default_sandbox_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: u64,

    /// Extra environment for the interpreter (with ${VAR} expansion)
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            python: default_python(),
            preload: default_preload(),
            timeout_secs: default_sandbox_timeout(),
            max_output_bytes: default_max_output_bytes(),
            env: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShellConfig {
    #[serde(default = "default_shell_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: u64,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_shell_timeout(),
            max_output_bytes: default_max_output_bytes(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ArtifactsConfig {
    /// Root of the artifact store. Defaults to `<workspace>/.sd-agent/artifacts`.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}
