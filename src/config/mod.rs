mod api;
mod defaults;
mod reasoning;
mod tools;
mod validation;

use crate::cli::Args;
use crate::error::{Result, SdAgentError};
use crate::models::Reasoning;
use crate::tools::paths::absolutize;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub use api::{normalize_endpoint, ApiConfig};
pub use defaults::{DEFAULT_API_ENDPOINT, DEFAULT_MODEL};
pub use reasoning::ReasoningConfig;
pub use tools::{ArtifactsConfig, SandboxConfig, ShellConfig, ToolsConfig};
pub use validation::{expand_env_var_in_string, expand_env_vars, parse_bool_flag};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub verbose: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub default_model: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub default_agent: Option<String>,
    #[serde(default = "defaults::default_max_tool_rounds")]
    pub max_tool_rounds: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            default_agent: None,
            max_tool_rounds: defaults::default_max_tool_rounds(),
        }
    }
}

/// On-disk configuration. YAML is preferred; JSON is still read.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct JsonConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub reasoning: ReasoningConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub sandbox: SandboxConfig,
    #[serde(default)]
    pub shell: ShellConfig,
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub api_endpoint: String,
    pub model: String,
    pub agent: Option<String>,
    pub system_prompt: Option<String>,
    pub stream_timeout: u64,
    pub verbose: bool,
    pub reasoning: Option<Reasoning>,
    pub tools_enabled: bool,
    pub max_tool_rounds: usize,
    pub workspace: PathBuf,
    pub artifacts_dir: PathBuf,
    pub tools: ToolsConfig,
    pub sandbox: SandboxConfig,
    pub shell: ShellConfig,
}

impl Config {
    pub fn from_env_and_args(args: &Args) -> Result<Self> {
        let json_config = JsonConfig::load()?;

        let api_key = env::var("SD_AGENT_API_KEY")
            .or_else(|_| env::var("OPENROUTER_API_KEY"))
            .map_err(|_| {
                SdAgentError::ConfigError(
                    "SD_AGENT_API_KEY (or OPENROUTER_API_KEY) environment variable not set"
                        .to_string(),
                )
            })?;

        Self::resolve(args, json_config, api_key)
    }

    /// Merge CLI args > env vars > config file > defaults, given an API key.
    pub fn resolve(args: &Args, json_config: JsonConfig, api_key: String) -> Result<Self> {
        let api_endpoint = args
            .api_endpoint
            .clone()
            .or_else(|| env::var("SD_AGENT_API_ENDPOINT").ok())
            .or(json_config.api.endpoint.clone())
            .map(|endpoint| normalize_endpoint(&endpoint))
            .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string());

        let model = args
            .model
            .clone()
            .or_else(|| env::var("SD_AGENT_MODEL").ok())
            .or(json_config.model.default_model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let agent = args.agent.clone().or(json_config.agent.default_agent.clone());

        let system_prompt = env::var("SD_AGENT_SYSTEM_PROMPT")
            .ok()
            .or(json_config.model.system_prompt.clone());

        let stream_timeout = env::var("SD_AGENT_STREAM_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .or(json_config.api.stream_timeout)
            .unwrap_or(30);

        let verbose = args.verbose
            || env::var("SD_AGENT_VERBOSE")
                .ok()
                .and_then(|v| parse_bool_flag(&v))
                .or(json_config.session.verbose)
                .unwrap_or(false);

        // --no-tools wins over everything else
        let tools_enabled = if args.no_tools {
            false
        } else {
            env::var("SD_AGENT_TOOLS_ENABLED")
                .ok()
                .and_then(|v| parse_bool_flag(&v))
                .unwrap_or(json_config.tools.enabled)
        };

        let max_tool_rounds = args
            .max_tool_rounds
            .unwrap_or(json_config.agent.max_tool_rounds)
            .max(1);

        let workspace = args
            .workspace
            .clone()
            .or_else(|| env::var("SD_AGENT_WORKSPACE").ok())
            .or(json_config.tools.workspace.clone())
            .map(|s| expand_env_var_in_string(&s))
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .map(Ok::<PathBuf, std::io::Error>)
            .unwrap_or_else(env::current_dir)
            .context("Failed to determine the workspace directory")?;

        let artifacts_dir = json_config
            .artifacts
            .dir
            .as_deref()
            .map(expand_env_var_in_string)
            .filter(|s| !s.is_empty())
            .map(|s| absolutize(Path::new(&s), &workspace))
            .unwrap_or_else(|| workspace.join(".sd-agent").join("artifacts"));

        let mut sandbox = json_config.sandbox.clone();
        if let Ok(python) = env::var("SD_AGENT_PYTHON") {
            if !python.is_empty() {
                sandbox.python = python;
            }
        }

        let reasoning = Self::build_reasoning_config(args, &json_config.reasoning);

        Ok(Config {
            api_key,
            api_endpoint,
            model,
            agent,
            system_prompt,
            stream_timeout,
            verbose,
            reasoning,
            tools_enabled,
            max_tool_rounds,
            workspace,
            artifacts_dir,
            tools: json_config.tools,
            sandbox,
            shell: json_config.shell,
        })
    }

    fn build_reasoning_config(args: &Args, json_reasoning: &ReasoningConfig) -> Option<Reasoning> {
        let env_flag = |name: &str| env::var(name).ok().and_then(|v| parse_bool_flag(&v));

        let env_reasoning_effort = env::var("SD_AGENT_REASONING_EFFORT")
            .ok()
            .map(|e| e.to_lowercase())
            .filter(|e| is_valid_effort(e));

        let env_reasoning_max_tokens = env::var("SD_AGENT_REASONING_MAX_TOKENS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok());

        // CLI args > env vars > config file
        let enabled = args.reasoning_enabled
            || env_flag("SD_AGENT_REASONING_ENABLED").unwrap_or(false)
            || json_reasoning.enabled.unwrap_or(false);

        let effort = args
            .reasoning_effort
            .clone()
            .or(env_reasoning_effort)
            .or(json_reasoning.effort.clone());

        let max_tokens = args
            .reasoning_max_tokens
            .or(env_reasoning_max_tokens)
            .or(json_reasoning.max_tokens);

        let exclude = args.reasoning_exclude
            || env_flag("SD_AGENT_REASONING_EXCLUDE").unwrap_or(false)
            || json_reasoning.exclude.unwrap_or(false);

        if !(enabled || effort.is_some() || max_tokens.is_some() || exclude) {
            return None;
        }

        Some(Reasoning {
            effort: effort.filter(|e| is_valid_effort(e)),
            max_tokens,
            exclude: exclude.then_some(true),
            enabled: enabled.then_some(true),
        })
    }

    pub fn get_current_date() -> String {
        chrono::Local::now().format("%A, %B %d, %Y").to_string()
    }
}

fn is_valid_effort(effort: &str) -> bool {
    ["high", "medium", "low"].contains(&effort)
}

impl JsonConfig {
    pub fn load() -> Result<Self> {
        for path in Self::get_config_paths() {
            if path.exists() {
                return Ok(Self::load_from(&path)?);
            }
        }
        Ok(JsonConfig::default())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );

        let config = if is_yaml {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config file: {}", path.display()))?
        } else {
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config file: {}", path.display()))?
        };

        Ok(config)
    }

    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".sd-agent.yaml"),
            PathBuf::from(".sd-agent.yml"),
            PathBuf::from(".sd-agent.json"),
        ];

        if let Some(config_dir) = Self::global_config_dir() {
            paths.push(config_dir.join("sd-agent.yaml"));
            paths.push(config_dir.join("sd-agent.yml"));
            paths.push(config_dir.join("sd-agent.json"));
        }

        paths
    }

    pub fn global_config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("sd-agent"))
    }

    /// Write an example config to the global config directory. Refuses to overwrite.
    pub fn init_example() -> Result<PathBuf> {
        let config_dir = Self::global_config_dir()
            .ok_or_else(|| SdAgentError::ConfigError("Cannot determine home directory".into()))?;
        fs::create_dir_all(&config_dir)?;

        let path = config_dir.join("sd-agent.yaml");
        if path.exists() {
            return Err(SdAgentError::ConfigError(format!(
                "Config file already exists: {}",
                path.display()
            )));
        }

        fs::write(&path, EXAMPLE_CONFIG)?;
        Ok(path)
    }
}

pub const EXAMPLE_CONFIG: &str = r#"# sd-agent configuration
api:
  # endpoint: http://localhost:11434/v1
  stream_timeout: 30

model:
  default_model: google/gemini-2.5-flash
  # system_prompt: "Answer tersely."

agent:
  default_agent: system_dynamics_agent
  max_tool_rounds: 8

tools:
  enabled: true
  # workspace: ${HOME}/sd-projects
  models_dir: source/models
  model_extensions: [".mdl", ".xmile"]
  read_allowed: [source/models]
  write_allowed: [source/models]
  max_file_size_mb: 10
  disabled: []

sandbox:
  python: python3
  timeout_secs: 300
  preload:
    - import pysd
    - import pandas as pd
    - import numpy as np
    - "import matplotlib; matplotlib.use('Agg')"
    - import matplotlib.pyplot as plt

shell:
  timeout_secs: 120

# artifacts:
#   dir: .sd-agent/artifacts
"#;
