use std::fmt;

use crate::tools::ToolError;

#[derive(Debug)]
pub enum SdAgentError {
    ApiError {
        status: u16,
        message: String,
    },
    ConfigError(String),
    ToolError(ToolError),
    SessionError(String),
    NetworkError(reqwest::Error),
    Timeout,
    IoError(std::io::Error),
    JsonError(serde_json::Error),
    YamlError(serde_yaml::Error),
    Other(String),
}

impl fmt::Display for SdAgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdAgentError::ApiError { status, message } => {
                write!(f, "API error (status {}): {}", status, message)
            }
            SdAgentError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            SdAgentError::ToolError(e) => write!(f, "Tool error: {}", e),
            SdAgentError::SessionError(msg) => write!(f, "Session error: {}", msg),
            SdAgentError::NetworkError(e) => write!(f, "Network error: {}", e),
            SdAgentError::Timeout => write!(f, "Request timeout"),
            SdAgentError::IoError(e) => write!(f, "IO error: {}", e),
            SdAgentError::JsonError(e) => write!(f, "JSON error: {}", e),
            SdAgentError::YamlError(e) => write!(f, "YAML error: {}", e),
            SdAgentError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for SdAgentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SdAgentError::ToolError(e) => Some(e),
            SdAgentError::NetworkError(e) => Some(e),
            SdAgentError::IoError(e) => Some(e),
            SdAgentError::JsonError(e) => Some(e),
            SdAgentError::YamlError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SdAgentError {
    fn from(err: reqwest::Error) -> Self {
        SdAgentError::NetworkError(err)
    }
}

impl From<std::io::Error> for SdAgentError {
    fn from(err: std::io::Error) -> Self {
        SdAgentError::IoError(err)
    }
}

impl From<serde_json::Error> for SdAgentError {
    fn from(err: serde_json::Error) -> Self {
        SdAgentError::JsonError(err)
    }
}

impl From<serde_yaml::Error> for SdAgentError {
    fn from(err: serde_yaml::Error) -> Self {
        SdAgentError::YamlError(err)
    }
}

impl From<ToolError> for SdAgentError {
    fn from(err: ToolError) -> Self {
        SdAgentError::ToolError(err)
    }
}

impl From<anyhow::Error> for SdAgentError {
    fn from(err: anyhow::Error) -> Self {
        SdAgentError::Other(format!("{:#}", err))
    }
}

impl From<String> for SdAgentError {
    fn from(msg: String) -> Self {
        SdAgentError::Other(msg)
    }
}

impl From<&str> for SdAgentError {
    fn from(msg: &str) -> Self {
        SdAgentError::Other(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SdAgentError>;
