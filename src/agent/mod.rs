pub mod prompt;

use crate::error::{Result, SdAgentError};
use crate::models::Message;
use crate::tools::{
    EXECUTE_PYTHON_CODE_SNIPPET, EXECUTE_SHELL_COMMAND, LIST_DIRECTORY, LIST_MODELS,
    LOAD_ARTIFACTS, READ_PNG_FILE, READ_TEXT_FILE, WRITE_TEXT_FILE,
};

pub const SYSTEM_DYNAMICS_AGENT: &str = "system_dynamics_agent";
pub const PYSD_MODEL_EXPERT: &str = "pysd_model_expert";

/// Profiles selectable with `--agent`.
pub const AGENT_NAMES: &[&str] = &[SYSTEM_DYNAMICS_AGENT, PYSD_MODEL_EXPERT];

/// Tools every profile offers to the model.
pub const AGENT_TOOLS: &[&str] = &[
    LIST_MODELS,
    LIST_DIRECTORY,
    READ_TEXT_FILE,
    WRITE_TEXT_FILE,
    EXECUTE_PYTHON_CODE_SNIPPET,
    READ_PNG_FILE,
    EXECUTE_SHELL_COMMAND,
    LOAD_ARTIFACTS,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDefinition {
    pub name: String,
    pub model: String,
    pub description: String,
    pub instruction: String,
    pub tools: Vec<&'static str>,
}

impl AgentDefinition {
    /// Look up a profile by name; `None` selects the default agent.
    pub fn named(name: Option<&str>, model: &str) -> Result<Self> {
        match name.unwrap_or(SYSTEM_DYNAMICS_AGENT) {
            SYSTEM_DYNAMICS_AGENT => Ok(Self::system_dynamics_agent(model)),
            PYSD_MODEL_EXPERT => Ok(Self::pysd_model_expert(model)),
            other => Err(SdAgentError::ConfigError(format!(
                "Unknown agent '{}'. Available agents: {}",
                other,
                AGENT_NAMES.join(", ")
            ))),
        }
    }

    pub fn system_dynamics_agent(model: &str) -> Self {
        Self {
            name: SYSTEM_DYNAMICS_AGENT.to_string(),
            model: model.to_string(),
            description: "Runs and analyses system dynamics models with pysd".to_string(),
            instruction: format!("{}\n{}", prompt::SYSTEM_DYNAMICS_PERSONA, prompt::PYSD_GUIDE),
            tools: AGENT_TOOLS.to_vec(),
        }
    }

    pub fn pysd_model_expert(model: &str) -> Self {
        Self {
            name: PYSD_MODEL_EXPERT.to_string(),
            model: model.to_string(),
            description: "Expert persona for building and analysing pysd models".to_string(),
            instruction: format!("{}\n{}", prompt::PYSD_EXPERT_PERSONA, prompt::PYSD_GUIDE),
            tools: AGENT_TOOLS.to_vec(),
        }
    }

    /// System message: date line, instruction, then the configured extra prompt.
    pub fn system_message(&self, date: &str, extra_prompt: Option<&str>) -> Message {
        let mut content = format!("Today's date is {}.\n\n{}", date, self.instruction.trim_end());
        if let Some(extra) = extra_prompt.map(str::trim).filter(|p| !p.is_empty()) {
            content.push_str("\n\n");
            content.push_str(extra);
        }
        Message::system(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_agent() {
        let agent = AgentDefinition::named(None, "google/gemini-2.5-flash").unwrap();
        assert_eq!(agent.name, SYSTEM_DYNAMICS_AGENT);
        assert_eq!(agent.model, "google/gemini-2.5-flash");
        assert_eq!(agent.tools.len(), 8);
        assert!(agent.instruction.contains("read_png_file"));
    }

    #[test]
    fn test_expert_persona() {
        let agent = AgentDefinition::named(Some(PYSD_MODEL_EXPERT), "m").unwrap();
        assert!(agent.instruction.contains("pysd-model-expert-01"));
        assert_eq!(agent.tools, AGENT_TOOLS.to_vec());
    }

    #[test]
    fn test_unknown_agent() {
        assert!(AgentDefinition::named(Some("nope"), "m").is_err());
    }

    #[test]
    fn test_system_message_layout() {
        let agent = AgentDefinition::system_dynamics_agent("m");
        let msg = agent.system_message("Friday, October 16, 2026", Some("Answer in French."));
        let content = msg.content.unwrap();
        assert!(content.starts_with("Today's date is Friday, October 16, 2026."));
        assert!(content.ends_with("Answer in French."));
        assert_eq!(msg.role, "system");
    }
}
