pub const DEFAULT_API_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";

pub fn default_true() -> bool {
    true
}

pub fn default_max_file_size_mb() -> u64 {
    10
}

pub fn default_models_dir() -> String {
    "source/models".to_string()
}

pub fn default_model_extensions() -> Vec<String> {
    vec![".mdl".to_string(), ".xmile".to_string()]
}

pub fn default_allowed_dirs() -> Vec<String> {
    vec![default_models_dir()]
}

pub fn default_python() -> String {
    "python3".to_string()
}

/// Statements run before every snippet. A line whose import fails is skipped.
pub fn default_preload() -> Vec<String> {
    vec![
        "import pysd".to_string(),
        "import pandas as pd".to_string(),
        "import numpy as np".to_string(),
        "import matplotlib; matplotlib.use('Agg')".to_string(),
        "import matplotlib.pyplot as plt".to_string(),
    ]
}

pub fn default_sandbox_timeout() -> u64 {
    300
}

pub fn default_shell_timeout() -> u64 {
    120
}

pub fn default_max_output_bytes() -> u64 {
    1_048_576
}

pub fn default_max_tool_rounds() -> usize {
    8
}
