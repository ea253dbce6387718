mod args;
pub mod artifacts;
mod error;
pub mod fs;
pub mod paths;
mod registry;
pub mod response;
pub mod sandbox;
mod settings;
pub mod shell;

pub use error::ToolError;
pub use registry::{Tool, ToolFuture, ToolHandler, ToolRegistry};
pub use response::Status;
pub use settings::{SandboxSettings, ShellSettings, ToolSettings};

use serde_json::{json, Value};
use std::time::Instant;

pub const LIST_MODELS: &str = "list_models";
pub const LIST_DIRECTORY: &str = "list_directory";
pub const READ_TEXT_FILE: &str = "read_text_file";
pub const WRITE_TEXT_FILE: &str = "write_text_file";
pub const READ_MODEL_FILE: &str = "read_model_file";
pub const WRITE_MODEL_FILE: &str = "write_model_file";
pub const EXECUTE_PYTHON_CODE_SNIPPET: &str = "execute_python_code_snippet";
pub const READ_PNG_FILE: &str = "read_png_file";
pub const EXECUTE_SHELL_COMMAND: &str = "execute_shell_command";
pub const LOAD_ARTIFACTS: &str = "load_artifacts";

/// Function declarations in the chat-completions `tools` format.
pub fn format_tools_for_llm(tools: &[&Tool]) -> Vec<Value> {
    tools
        .iter()
        .map(|tool| {
            json!({
                "type": "function",
                "function": {
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": tool.input_schema,
                }
            })
        })
        .collect()
}

/// Validate `arguments` and run the named tool.
pub async fn call_tool(
    registry: &ToolRegistry,
    tool_name: &str,
    arguments: &Value,
) -> Result<Value, ToolError> {
    let start_time = Instant::now();

    registry.validate_arguments(tool_name, arguments)?;
    let tool = registry
        .get(tool_name)
        .ok_or_else(|| ToolError::UnknownTool(tool_name.to_string()))?;

    let handler = &tool.handler;
    let result = handler(arguments, registry.settings()).await;

    let duration_ms = start_time.elapsed().as_millis() as u64;
    match &result {
        Ok(value) => tracing::info!(
            tool = tool_name,
            duration_ms,
            status = value.get("status").and_then(|s| s.as_str()).unwrap_or("unknown"),
            "tool finished"
        ),
        Err(e) => tracing::info!(tool = tool_name, duration_ms, error = %e, "tool failed"),
    }

    result
}

/// Text sent back to the model for a tool outcome.
pub fn render_tool_result(result: &Result<Value, ToolError>) -> String {
    match result {
        Ok(value) => serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
        Err(e) => format!("Error: {}", e),
    }
}
