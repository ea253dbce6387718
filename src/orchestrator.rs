use crate::agent::AgentDefinition;
use crate::api::response::{extract_content, extract_error, extract_reasoning, parse_tool_calls};
use crate::api::{check_status, make_api_request, process_streaming_response, RequestBody};
use crate::config::Config;
use crate::error::{Result, SdAgentError};
use crate::models::{FunctionCall, Message, ToolCall};
use crate::tools::{call_tool, format_tools_for_llm, render_tool_result, ToolRegistry};
use crate::ui::{display_content, display_reasoning, display_tool_error, display_tool_result};
use colored::*;
use serde_json::Value;
use uuid::Uuid;

pub struct OrchestratorContext {
    pub config: Config,
    pub agent: AgentDefinition,
    /// `None` when tools are disabled.
    pub registry: Option<ToolRegistry>,
    pub reasoning_exclude: bool,
}

impl OrchestratorContext {
    fn request(&self, messages: &[Message], tools: Option<Vec<Value>>) -> RequestBody {
        RequestBody {
            model: self.agent.model.clone(),
            messages: messages.to_vec(),
            stream: tools.is_none(),
            reasoning: self.config.reasoning.clone(),
            tools,
        }
    }

    fn log(&self, message: impl AsRef<str>) {
        if self.config.verbose {
            eprintln!("{}", message.as_ref().dimmed());
        }
    }

    fn offered_tools(&self) -> Option<Vec<Value>> {
        let registry = self.registry.as_ref()?;
        let offered = registry.offered(&self.agent.tools);
        if offered.is_empty() {
            return None;
        }
        let names: Vec<&str> = offered.iter().map(|t| t.name.as_str()).collect();
        self.log(format!(
            "[tools] Available tools: {} (workspace={})",
            names.join(", "),
            registry.settings().workspace.display()
        ));
        Some(format_tools_for_llm(&offered))
    }
}

/// Run one user request to completion.
///
/// Intermediate assistant/tool messages are appended to `messages`; the final
/// assistant text is returned and left for the caller to record.
pub async fn run(context: &OrchestratorContext, messages: &mut Vec<Message>) -> Result<String> {
    context.log(format!("[AI] Using model: {} (agent: {})", context.agent.model, context.agent.name));

    let Some(tools) = context.offered_tools() else {
        return stream_answer(context, messages).await;
    };

    let max_rounds = context.config.max_tool_rounds;
    for round in 1..=max_rounds {
        context.log(format!("[AI] Tool round {}/{}: making API request...", round, max_rounds));

        let request_body = context.request(messages, Some(tools.clone()));
        let response = make_api_request(
            &context.config.api_key,
            &context.config.api_endpoint,
            &request_body,
        )
        .await?;
        context.log(format!("[AI] Response status: {}", response.status()));
        let response = check_status(response).await?;

        let response_text = response.text().await?;
        context.log(format!("[AI] Raw response: {}", response_text));
        let response_json: Value = serde_json::from_str(&response_text)?;

        if let Some(message) = extract_error(&response_json) {
            return Err(SdAgentError::ApiError {
                status: 200,
                message,
            });
        }

        if let Some(reasoning) = extract_reasoning(&response_json)? {
            if !context.reasoning_exclude && !reasoning.trim().is_empty() {
                display_reasoning(&reasoning);
            }
        }

        let content = extract_content(&response_json)?;
        let Some(raw_calls) = parse_tool_calls(&response_json)? else {
            let content = content.unwrap_or_default();
            if content.is_empty() {
                context.log("[AI] No tool calls and no content in response.");
            }
            display_content(&content);
            return Ok(content);
        };

        let calls: Vec<(ToolCall, Option<String>)> = raw_calls.iter().map(normalize_tool_call).collect();
        messages.push(Message {
            role: "assistant".to_string(),
            content: content.filter(|c| !c.is_empty()),
            tool_calls: Some(calls.iter().map(|(call, _)| call.clone()).collect()),
            tool_call_id: None,
        });

        for (call, problem) in &calls {
            let result = execute_tool_call(context, call, problem.as_deref()).await;
            messages.push(result);
        }
    }

    // Out of rounds: ask for an answer without offering tools again.
    println!(
        "{}",
        format!("Tool round limit ({}) reached; requesting a final answer.", max_rounds).yellow()
    );
    stream_answer(context, messages).await
}

async fn stream_answer(context: &OrchestratorContext, messages: &[Message]) -> Result<String> {
    context.log("[AI] Making streaming request...");
    let request_body = context.request(messages, None);
    let response = make_api_request(
        &context.config.api_key,
        &context.config.api_endpoint,
        &request_body,
    )
    .await?;
    let response = check_status(response).await?;

    let result = process_streaming_response(
        response,
        context.config.stream_timeout,
        context.reasoning_exclude,
        context.config.verbose,
    )
    .await?;
    Ok(result.content)
}

/// Typed form of a raw tool call, plus the reason it cannot be executed.
///
/// Malformed calls still get an id so the error reply can be paired with them.
pub fn normalize_tool_call(raw: &Value) -> (ToolCall, Option<String>) {
    let id = raw.get("id").and_then(|i| i.as_str()).filter(|i| !i.is_empty());
    let function = raw.get("function");
    let name = function.and_then(|f| f.get("name")).and_then(|n| n.as_str());
    let arguments = function.and_then(|f| f.get("arguments")).and_then(|a| match a {
        Value::String(s) => Some(s.clone()),
        Value::Object(_) => Some(a.to_string()),
        _ => None,
    });

    let problem = if id.is_none() {
        Some("Tool call missing required 'id' field".to_string())
    } else if function.is_none() {
        Some("Tool call missing required 'function' field".to_string())
    } else if name.is_none() {
        Some("Tool call missing required 'function.name' field".to_string())
    } else if arguments.is_none() {
        Some("Tool call missing required 'function.arguments' field".to_string())
    } else {
        None
    };

    let call = ToolCall {
        id: id
            .map(str::to_string)
            .unwrap_or_else(|| format!("call_{}", Uuid::new_v4().simple())),
        tool_type: "function".to_string(),
        function: FunctionCall {
            name: name.unwrap_or("unknown").to_string(),
            arguments: arguments.unwrap_or_else(|| "{}".to_string()),
        },
    };
    (call, problem)
}

async fn execute_tool_call(
    context: &OrchestratorContext,
    call: &ToolCall,
    problem: Option<&str>,
) -> Message {
    let name = call.function.name.as_str();

    if let Some(problem) = problem {
        eprintln!("{}", format!("Warning: {}, skipping", problem).yellow());
        return Message::tool_result(&call.id, format!("Error: {}", problem));
    }

    let preview: String = call.function.arguments.chars().take(100).collect();
    context.log(format!("[tools] Selected tool: '{}' with args: {}", name, preview));
    println!("{}", format!("Calling tool: {}...", name).cyan());

    let raw_arguments = call.function.arguments.trim();
    let arguments = if raw_arguments.is_empty() {
        Ok(Value::Object(Default::default()))
    } else {
        serde_json::from_str::<Value>(raw_arguments)
    };

    let content = match (arguments, context.registry.as_ref()) {
        (Err(err), _) => {
            let error_text = format!("Error: failed to parse arguments for tool '{}': {}", name, err);
            display_tool_error(name, &error_text);
            error_text
        }
        (Ok(_), None) => {
            let error_text = format!("Error: Tool '{}' not found (tools disabled)", name);
            display_tool_error(name, &error_text);
            error_text
        }
        (Ok(arguments), Some(registry)) => {
            let result = call_tool(registry, name, &arguments).await;
            let text = render_tool_result(&result);
            match result {
                Ok(_) => display_tool_result(name, &text),
                Err(_) => display_tool_error(name, &text),
            }
            text
        }
    };

    Message::tool_result(&call.id, content)
}
