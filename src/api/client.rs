use crate::api::RequestBody;
use crate::error::{Result, SdAgentError};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

const APP_TITLE: &str = "sd-agent";

pub async fn make_api_request(
    api_key: &str,
    api_endpoint: &str,
    request_body: &RequestBody,
) -> Result<reqwest::Response> {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| SdAgentError::ConfigError(format!("Invalid API key header: {}", e)))?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    // OpenRouter attribution; ignored by other endpoints.
    headers.insert("X-Title", HeaderValue::from_static(APP_TITLE));

    let client = reqwest::Client::builder()
        .default_headers(headers)
        .build()?;

    tracing::debug!(
        endpoint = api_endpoint,
        model = %request_body.model,
        messages = request_body.messages.len(),
        tools = request_body.tools.as_ref().map_or(0, Vec::len),
        stream = request_body.stream,
        "sending chat completion request"
    );

    let response = client.post(api_endpoint).json(&request_body).send().await?;
    Ok(response)
}

/// Turn a non-2xx response into an `ApiError`, passing successful ones through.
pub async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(SdAgentError::ApiError { status, message })
}
