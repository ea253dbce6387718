use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize)]
pub struct RequestBody {
    pub model: String,
    pub messages: Vec<crate::models::Message>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<crate::models::Reasoning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
}

#[derive(Deserialize)]
pub struct Delta {
    pub content: Option<String>,
    pub reasoning: Option<String>,
}

#[derive(Deserialize)]
pub struct Choice {
    pub delta: Option<Delta>,
}

/// One `data:` payload of a streamed completion.
#[derive(Deserialize)]
pub struct StreamResponse {
    pub choices: Option<Vec<Choice>>,
}
