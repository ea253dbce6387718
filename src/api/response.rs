use crate::error::{Result, SdAgentError};
use serde_json::Value;

fn first_choice(response_json: &Value) -> Result<&Value> {
    let choices = response_json
        .get("choices")
        .and_then(|c| c.as_array())
        .ok_or_else(|| SdAgentError::Other("No choices in response".to_string()))?;

    choices
        .first()
        .ok_or_else(|| SdAgentError::Other("Empty choices array".to_string()))
}

/// The assistant message of the first choice.
pub fn first_message(response_json: &Value) -> Result<&Value> {
    first_choice(response_json)?
        .get("message")
        .ok_or_else(|| SdAgentError::Other("No message in response".to_string()))
}

/// Parse a non-streaming API response and extract tool calls if present
pub fn parse_tool_calls(response_json: &Value) -> Result<Option<Vec<Value>>> {
    let message = first_message(response_json)?;

    match message.get("tool_calls").and_then(|tc| tc.as_array()) {
        Some(tool_calls) if !tool_calls.is_empty() => Ok(Some(tool_calls.clone())),
        _ => Ok(None),
    }
}

/// Extract content from a non-streaming response
pub fn extract_content(response_json: &Value) -> Result<Option<String>> {
    Ok(first_message(response_json)?
        .get("content")
        .and_then(|c| c.as_str())
        .map(|s| s.to_string()))
}

/// Extract reasoning from a non-streaming response.
///
/// OpenRouter uses `reasoning`; some OpenAI-compatible servers use `reasoning_content`.
pub fn extract_reasoning(response_json: &Value) -> Result<Option<String>> {
    let message = first_message(response_json)?;
    Ok(message
        .get("reasoning")
        .or_else(|| message.get("reasoning_content"))
        .and_then(|r| r.as_str())
        .map(|s| s.to_string()))
}

/// `error.message` of an error body returned with a 200 status, if any.
pub fn extract_error(response_json: &Value) -> Option<String> {
    let error = response_json.get("error")?;
    Some(
        error
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
    )
}
