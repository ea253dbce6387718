use sd_agent::api::response::{extract_content, extract_error, extract_reasoning, parse_tool_calls};
use serde_json::json;

#[test]
fn test_extract_content_with_content() {
    let response = json!({
        "choices": [{
            "message": {
                "content": "The SIR model peaks on day 42.",
                "role": "assistant"
            }
        }]
    });

    let content = extract_content(&response).unwrap();
    assert_eq!(content, Some("The SIR model peaks on day 42.".to_string()));
}

#[test]
fn test_extract_content_without_content() {
    let response = json!({
        "choices": [{
            "message": {
                "role": "assistant"
            }
        }]
    });

    assert_eq!(extract_content(&response).unwrap(), None);
}

#[test]
fn test_extract_content_empty_choices() {
    let response = json!({ "choices": [] });
    assert!(extract_content(&response).is_err());
}

#[test]
fn test_parse_tool_calls_with_tools() {
    let response = json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "tool_calls": [
                    {
                        "id": "call_123",
                        "type": "function",
                        "function": {
                            "name": "list_models",
                            "arguments": "{\"topic\": \"Epidemic\"}"
                        }
                    },
                    {
                        "id": "call_124",
                        "type": "function",
                        "function": {
                            "name": "read_text_file",
                            "arguments": "{\"path\": \"source/models/Epidemic/SIR.mdl\"}"
                        }
                    }
                ]
            }
        }]
    });

    let calls = parse_tool_calls(&response).unwrap().unwrap();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0]["id"], "call_123");
    assert_eq!(calls[1]["function"]["name"], "read_text_file");
}

#[test]
fn test_parse_tool_calls_without_tools() {
    let response = json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": "Here is the code I would run. Shall I go ahead?"
            }
        }]
    });

    assert!(parse_tool_calls(&response).unwrap().is_none());
}

#[test]
fn test_parse_tool_calls_empty_array() {
    let response = json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "tool_calls": []
            }
        }]
    });

    assert!(parse_tool_calls(&response).unwrap().is_none());
}

#[test]
fn test_extract_reasoning_field_variants() {
    let openrouter = json!({
        "choices": [{ "message": { "role": "assistant", "reasoning": "Check the stocks first." } }]
    });
    let compatible = json!({
        "choices": [{ "message": { "role": "assistant", "reasoning_content": "Let me think." } }]
    });

    assert_eq!(
        extract_reasoning(&openrouter).unwrap(),
        Some("Check the stocks first.".to_string())
    );
    assert_eq!(extract_reasoning(&compatible).unwrap(), Some("Let me think.".to_string()));
}

#[test]
fn test_extract_reasoning_without_reasoning() {
    let response = json!({
        "choices": [{ "message": { "role": "assistant", "content": "No reasoning" } }]
    });

    assert_eq!(extract_reasoning(&response).unwrap(), None);
}

#[test]
fn test_extract_error_body() {
    let response = json!({ "error": { "message": "No endpoints found", "code": 404 } });
    assert_eq!(extract_error(&response), Some("No endpoints found".to_string()));

    let ok = json!({ "choices": [] });
    assert_eq!(extract_error(&ok), None);
}
