// Anthropic Messages API adapter
// API Reference: https://docs.anthropic.com/en/api/messages
//
// Error payloads ({"error": {"message": ...}}) are surfaced with the upstream
// message unchanged, whatever the HTTP status.

use crate::llm::provider::LLMAdapter;
use crate::types::{AppError, AppResult, LLMMessage, LLMRequest, LLMResponse, TokenUsage, ToolSpec};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicAdapter {
    client: Client,
    api_key: String,
    api_url: String,
    api_version: String,
}

// Request types for the Messages API
#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [LLMMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolSpec]>,
}

// Response types for the Messages API
#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<TokenUsage>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(rename = "type", default)]
    error_type: Option<String>,
}

impl AnthropicAdapter {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            api_url: ANTHROPIC_API_URL.to_string(),
            api_version: ANTHROPIC_VERSION.to_string(),
        }
    }

    /// Point the adapter at a different Messages endpoint
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.to_string();
        self
    }

    pub fn with_api_version(mut self, api_version: &str) -> Self {
        self.api_version = api_version.to_string();
        self
    }

    /// Decode a Messages API body, turning error payloads into `AppError::Upstream`.
    fn parse_body(status: reqwest::StatusCode, body: &str) -> AppResult<LLMResponse> {
        let parsed: MessagesResponse = serde_json::from_str(body)
            .map_err(|e| AppError::LLMApi(format!("Failed to parse Anthropic response: {}", e)))?;

        if let Some(error) = parsed.error {
            debug!(error_type = ?error.error_type, "Anthropic returned an error payload");
            return Err(AppError::Upstream(error.message));
        }

        if !status.is_success() {
            return Err(AppError::LLMApi(format!("Anthropic API error ({}): {}", status, body)));
        }

        let content = parsed
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text.as_deref())
            .collect::<String>();

        Ok(LLMResponse {
            content,
            stop_reason: parsed.stop_reason,
            usage: parsed.usage,
        })
    }
}

#[async_trait]
impl LLMAdapter for AnthropicAdapter {
    async fn create_message(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        let body = MessagesRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            messages: &request.messages,
            tools: request.tools.as_deref(),
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::LLMApi(format!("Anthropic request failed: {}", e)))?;

        let status = response.status();
        let text = response.text().await?;

        Self::parse_body(status, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn request() -> LLMRequest {
        LLMRequest {
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 100,
            messages: vec![LLMMessage::user("腰痛対策について")],
            tools: None,
        }
    }

    #[test]
    fn test_text_blocks_are_concatenated() {
        let body = json!({
            "content": [
                {"type": "text", "text": "■現状\n"},
                {"type": "server_tool_use", "id": "srvtoolu_1", "name": "web_search"},
                {"type": "text", "text": "・対策"}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        })
        .to_string();

        let response = AnthropicAdapter::parse_body(reqwest::StatusCode::OK, &body).unwrap();
        assert_eq!(response.content, "■現状\n・対策");
        assert_eq!(response.stop_reason.as_deref(), Some("end_turn"));
        assert_eq!(response.usage.unwrap().output_tokens, 5);
    }

    #[test]
    fn test_error_payload_is_upstream_error() {
        let body = json!({"type": "error", "error": {"type": "overloaded_error", "message": "x"}}).to_string();
        let err = AnthropicAdapter::parse_body(reqwest::StatusCode::OK, &body).unwrap_err();
        assert!(matches!(err, AppError::Upstream(ref m) if m == "x"));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let err = AnthropicAdapter::parse_body(reqwest::StatusCode::OK, "<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, AppError::LLMApi(_)));
    }

    #[tokio::test]
    async fn test_create_message_sends_headers_and_tools() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "test-key")
            .match_header("anthropic-version", "2023-06-01")
            .match_body(Matcher::PartialJson(json!({
                "model": "claude-sonnet-4-20250514",
                "max_tokens": 100,
                "tools": [{
                    "type": "web_search_20250305",
                    "name": "web_search",
                    "max_uses": 1,
                    "allowed_domains": ["mhlw.go.jp"]
                }]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"content": [{"type": "text", "text": "回答"}]}).to_string())
            .expect(1)
            .create_async()
            .await;

        let adapter = AnthropicAdapter::new("test-key")
            .with_api_url(&format!("{}/v1/messages", server.url()));
        let mut req = request();
        req.tools = Some(vec![ToolSpec::web_search(1, &["mhlw.go.jp"])]);

        let response = adapter.create_message(&req).await.unwrap();
        assert_eq!(response.content, "回答");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_with_payload_keeps_message() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(401)
            .with_body(json!({"error": {"type": "authentication_error", "message": "invalid x-api-key"}}).to_string())
            .create_async()
            .await;

        let adapter = AnthropicAdapter::new("bad-key")
            .with_api_url(&format!("{}/v1/messages", server.url()));
        let err = adapter.create_message(&request()).await.unwrap_err();
        assert_eq!(err.to_string(), "invalid x-api-key");
    }
}
