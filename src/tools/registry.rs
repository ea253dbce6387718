use jsonschema::{Draft, JSONSchema};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::pin::Pin;

use super::{artifacts, fs, sandbox, shell};
use super::{ToolError, ToolSettings};

pub type ToolFuture<'a> = Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + 'a>>;

pub type ToolHandler =
    Box<dyn for<'a> Fn(&'a Value, &'a ToolSettings) -> ToolFuture<'a> + Send + Sync>;

pub struct Tool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub handler: ToolHandler,
}

pub struct ToolRegistry {
    tools: BTreeMap<String, Tool>,
    settings: ToolSettings,
}

impl ToolRegistry {
    /// Registry with every built-in tool except those named in `disabled`.
    pub fn new(settings: ToolSettings, disabled: &[String]) -> Self {
        let mut registry = Self {
            tools: BTreeMap::new(),
            settings,
        };
        registry.register_builtin_tools();
        for name in disabled {
            if registry.tools.remove(name).is_none() {
                tracing::warn!(tool = %name, "cannot disable unknown tool");
            }
        }
        registry
    }

    fn register(&mut self, name: &str, description: &str, input_schema: Value, handler: ToolHandler) {
        self.tools.insert(
            name.to_string(),
            Tool {
                name: name.to_string(),
                description: description.to_string(),
                input_schema,
                handler,
            },
        );
    }

    fn register_builtin_tools(&mut self) {
        self.register(
            super::LIST_MODELS,
            "List the system dynamics model files (.mdl, .xmile) available for a topic. \
             Use an empty topic to list every model.",
            json!({
                "type": "object",
                "properties": {
                    "topic": {
                        "type": "string",
                        "description": "Sub-directory of the models directory, e.g. \"Epidemic\""
                    }
                },
                "required": ["topic"],
                "additionalProperties": false
            }),
            Box::new(list_models),
        );

        self.register(
            super::LIST_DIRECTORY,
            "List files and directories under a path, optionally recursively.",
            json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Directory to list (relative to the workspace)"
                    },
                    "recursive": {
                        "type": "boolean",
                        "description": "Include every descendant, not only direct children",
                        "default": false
                    }
                },
                "required": ["path"],
                "additionalProperties": false
            }),
            Box::new(list_directory),
        );

        self.register(
            super::READ_TEXT_FILE,
            "Read a text file. Only paths inside the allowed model directories can be read.",
            path_schema("Path of the file to read (relative to the workspace)"),
            Box::new(read_text_file),
        );

        self.register(
            super::WRITE_TEXT_FILE,
            "Create or overwrite a text file. Only paths inside the allowed model directories \
             can be written; missing parent directories are created.",
            json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Path of the file to write (relative to the workspace)"
                    },
                    "content": {
                        "type": "string",
                        "description": "Full text content of the file"
                    }
                },
                "required": ["path", "content"],
                "additionalProperties": false
            }),
            Box::new(write_text_file),
        );

        self.register(
            super::READ_MODEL_FILE,
            "Read a model file. Same rules as read_text_file.",
            json!({
                "type": "object",
                "properties": {
                    "model_path": {
                        "type": "string",
                        "description": "Path of the model file to read"
                    }
                },
                "required": ["model_path"],
                "additionalProperties": false
            }),
            Box::new(read_model_file),
        );

        self.register(
            super::WRITE_MODEL_FILE,
            "Write a model file. Same rules as write_text_file.",
            json!({
                "type": "object",
                "properties": {
                    "model_path": {
                        "type": "string",
                        "description": "Path of the model file to write"
                    },
                    "model": {
                        "type": "string",
                        "description": "Full model source"
                    }
                },
                "required": ["model_path", "model"],
                "additionalProperties": false
            }),
            Box::new(write_model_file),
        );

        self.register(
            super::EXECUTE_PYTHON_CODE_SNIPPET,
            "Run a Python snippet in a fresh interpreter with pysd, pandas (pd), numpy (np) \
             and matplotlib.pyplot (plt) already imported. Assign the result to `output` and \
             append progress notes to `logs`; both are returned as text.",
            json!({
                "type": "object",
                "properties": {
                    "code": {
                        "type": "string",
                        "description": "Python source to execute"
                    }
                },
                "required": ["code"],
                "additionalProperties": false
            }),
            Box::new(execute_python_code_snippet),
        );

        self.register(
            super::READ_PNG_FILE,
            "Load a PNG image from disk and store it as a session artifact so it can be shown \
             to the user. Call this after a snippet saved a plot.",
            json!({
                "type": "object",
                "properties": {
                    "image_path": {
                        "type": "string",
                        "description": "Path of the PNG file (relative to the workspace)"
                    },
                    "artifact_name": {
                        "type": "string",
                        "description": "Name to store the image under, e.g. \"sir_plot.png\""
                    }
                },
                "required": ["image_path", "artifact_name"],
                "additionalProperties": false
            }),
            Box::new(read_png_file),
        );

        self.register(
            super::EXECUTE_SHELL_COMMAND,
            "Run a shell command and return its stdout, stderr and exit code.",
            json!({
                "type": "object",
                "properties": {
                    "command": {
                        "type": "string",
                        "description": "Command line passed to the shell"
                    },
                    "current_working_directory": {
                        "type": "string",
                        "description": "Directory to run in (defaults to the workspace)"
                    }
                },
                "required": ["command"],
                "additionalProperties": false
            }),
            Box::new(execute_shell_command),
        );

        self.register(
            super::LOAD_ARTIFACTS,
            "List the artifacts stored in this session and describe the requested ones.",
            json!({
                "type": "object",
                "properties": {
                    "artifact_names": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Artifacts to describe; omit to only list names"
                    }
                },
                "additionalProperties": false
            }),
            Box::new(load_artifacts),
        );
    }

    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    /// All registered tools, sorted by name.
    pub fn list(&self) -> Vec<&Tool> {
        self.tools.values().collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// The registered tools among `names`, in registry order.
    pub fn offered(&self, names: &[&str]) -> Vec<&Tool> {
        let wanted: HashSet<&str> = names.iter().copied().collect();
        self.tools
            .values()
            .filter(|tool| wanted.contains(tool.name.as_str()))
            .collect()
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn validate_arguments(&self, tool_name: &str, arguments: &Value) -> Result<(), ToolError> {
        let tool = self
            .tools
            .get(tool_name)
            .ok_or_else(|| ToolError::UnknownTool(tool_name.to_string()))?;

        let schema = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&tool.input_schema)
            .map_err(|e| ToolError::InvalidArguments(format!("invalid tool schema: {}", e)))?;

        if let Err(errors) = schema.validate(arguments) {
            let messages: Vec<String> = errors
                .map(|e| {
                    let path = e.instance_path.to_string();
                    if path.is_empty() {
                        e.to_string()
                    } else {
                        format!("{}: {}", path, e)
                    }
                })
                .collect();
            return Err(ToolError::InvalidArguments(messages.join("; ")));
        }

        Ok(())
    }
}

fn path_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "path": {
                "type": "string",
                "description": description
            }
        },
        "required": ["path"],
        "additionalProperties": false
    })
}

// Handler adapters

fn list_models<'a>(args: &'a Value, settings: &'a ToolSettings) -> ToolFuture<'a> {
    Box::pin(async move { fs::handle_list_models(args, settings) })
}

fn list_directory<'a>(args: &'a Value, settings: &'a ToolSettings) -> ToolFuture<'a> {
    Box::pin(async move { fs::handle_list_directory(args, settings) })
}

fn read_text_file<'a>(args: &'a Value, settings: &'a ToolSettings) -> ToolFuture<'a> {
    Box::pin(async move { fs::handle_read_text_file(args, settings) })
}

fn write_text_file<'a>(args: &'a Value, settings: &'a ToolSettings) -> ToolFuture<'a> {
    Box::pin(async move { fs::handle_write_text_file(args, settings) })
}

fn read_model_file<'a>(args: &'a Value, settings: &'a ToolSettings) -> ToolFuture<'a> {
    Box::pin(async move { fs::handle_read_model_file(args, settings) })
}

fn write_model_file<'a>(args: &'a Value, settings: &'a ToolSettings) -> ToolFuture<'a> {
    Box::pin(async move { fs::handle_write_model_file(args, settings) })
}

fn execute_python_code_snippet<'a>(args: &'a Value, settings: &'a ToolSettings) -> ToolFuture<'a> {
    Box::pin(sandbox::handle_execute_python(args, settings))
}

fn read_png_file<'a>(args: &'a Value, settings: &'a ToolSettings) -> ToolFuture<'a> {
    Box::pin(artifacts::handle_read_png_file(args, settings))
}

fn execute_shell_command<'a>(args: &'a Value, settings: &'a ToolSettings) -> ToolFuture<'a> {
    Box::pin(shell::handle_execute_shell_command(args, settings))
}

fn load_artifacts<'a>(args: &'a Value, settings: &'a ToolSettings) -> ToolFuture<'a> {
    Box::pin(async move { artifacts::handle_load_artifacts(args, settings) })
}
