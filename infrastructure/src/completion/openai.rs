//! OpenAI-compatible completion gateway
//!
//! Posts a system and user message to `<base_url>/chat/completions` and
//! returns the text of the first choice. Works with any backend exposing
//! the chat completions API.

use crate::config::FileCompletionConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use toolguard_application::{CompletionGateway, CompletionRequest, GatewayError};
use tracing::debug;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiCompletionGateway {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
}

impl OpenAiCompletionGateway {
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Other(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            model: model.into(),
            api_key: api_key.into(),
            temperature: 0.2,
        })
    }

    /// Build from configuration, reading the key from the configured variable.
    pub fn from_config(config: &FileCompletionConfig) -> Result<Self, GatewayError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            GatewayError::Authentication(format!(
                "environment variable {} is not set",
                config.api_key_env
            ))
        })?;
        Ok(Self::new(
            &config.base_url,
            &config.model,
            api_key,
            Duration::from_secs(config.timeout_secs),
        )?
        .with_temperature(config.temperature))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn body<'a>(&'a self, request: &'a CompletionRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: self.temperature,
        }
    }
}

/// Extract `choices[0].message.content` from a response body.
fn parse_response(text: &str) -> Result<String, GatewayError> {
    let parsed: ChatResponse = serde_json::from_str(text)
        .map_err(|e| GatewayError::InvalidResponse(format!("parse failed: {e}")))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| GatewayError::InvalidResponse("missing choices[0].message.content".to_string()))
}

#[async_trait]
impl CompletionGateway for OpenAiCompletionGateway {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
        debug!(
            "Requesting {} completion for {} (attempt {}) from {}",
            request.kind.as_str(),
            request.tool_name,
            request.attempt,
            self.model
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.body(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout
                } else if e.is_connect() {
                    GatewayError::ConnectionError(e.to_string())
                } else {
                    GatewayError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;
        debug!("Completion response: status={}, {} bytes", status, text.len());

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(GatewayError::Authentication(format!("{status}")));
        }
        if !status.is_success() {
            return Err(GatewayError::RequestFailed(format!("{status}: {text}")));
        }
        parse_response(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolguard_application::CompletionKind;

    fn request() -> CompletionRequest {
        CompletionRequest {
            kind: CompletionKind::Guard,
            tool_name: "transfer".to_string(),
            attempt: 1,
            system_prompt: "You write guards.".to_string(),
            prompt: "Implement guard_transfer.".to_string(),
            diagnostics: Vec::new(),
        }
    }

    #[test]
    fn test_request_body() {
        let gateway =
            OpenAiCompletionGateway::new("http://localhost:8000/v1/", "local-model", "key", Duration::from_secs(5))
                .unwrap()
                .with_temperature(0.0);
        assert_eq!(gateway.endpoint(), "http://localhost:8000/v1/chat/completions");

        let request = request();
        let body = serde_json::to_value(gateway.body(&request)).unwrap();
        assert_eq!(body["model"], "local-model");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "You write guards.");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Implement guard_transfer.");
        assert_eq!(body["temperature"], 0.0);
    }

    #[test]
    fn test_parse_response() {
        let text = r#"{"id": "x", "choices": [{"index": 0, "message": {"role": "assistant", "content": "```python\npass\n```"}}]}"#;
        assert_eq!(parse_response(text).unwrap(), "```python\npass\n```");
    }

    #[test]
    fn test_parse_response_without_choices() {
        let err = parse_response(r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidResponse(_)));

        let err = parse_response("<html>").unwrap_err();
        assert!(matches!(err, GatewayError::InvalidResponse(_)));
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = FileCompletionConfig {
            api_key_env: "TOOLGUARD_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..Default::default()
        };
        let err = OpenAiCompletionGateway::from_config(&config).err().unwrap();
        assert!(matches!(err, GatewayError::Authentication(_)));
    }
}
