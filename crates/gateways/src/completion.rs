//! OpenAI-compatible completion gateway.
//!
//! Works with OpenRouter (the default), OpenAI, and any endpoint exposing an
//! OpenAI-compatible `/chat/completions` route with function calling.
//!
//! Only non-streaming completions are supported.

use async_trait::async_trait;
use bugstash_config::CompletionConfig;
use bugstash_core::error::GatewayError;
use bugstash_core::message::{Message, MessageToolCall, Role};
use bugstash_core::provider::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// A completion gateway speaking the OpenAI chat-completions protocol.
pub struct OpenRouterGateway {
    name: String,
    base_url: String,
    api_key: String,
    app_url: Option<String>,
    app_title: Option<String>,
    client: reqwest::Client,
}

impl OpenRouterGateway {
    /// Create a new gateway. An empty `api_key` leaves it unconfigured;
    /// every call then fails with [`GatewayError::NotConfigured`].
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let client = crate::http_client(DEFAULT_TIMEOUT);

        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            app_url: None,
            app_title: None,
            client,
        }
    }

    /// Create an OpenRouter gateway (convenience constructor).
    pub fn openrouter(api_key: impl Into<String>) -> Self {
        Self::new("openrouter", "https://openrouter.ai/api/v1", api_key)
    }

    /// Build from the `[completion]` config section.
    pub fn from_config(config: &CompletionConfig) -> Self {
        Self::new(
            "openrouter",
            &config.base_url,
            config.api_key.clone().unwrap_or_default(),
        )
        .with_app_identity(&config.app_url, &config.app_title)
    }

    /// Identify the calling application via `HTTP-Referer` and `X-Title`.
    pub fn with_app_identity(mut self, url: impl Into<String>, title: impl Into<String>) -> Self {
        self.app_url = Some(url.into()).filter(|s| !s.is_empty());
        self.app_title = Some(title.into()).filter(|s| !s.is_empty());
        self
    }

    /// Replace the default 120s request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = crate::http_client(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Convert our Message types to OpenAI API format.
    fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: m.role.as_str().into(),
                content: if m.content.is_empty() && m.has_tool_calls() {
                    None
                } else {
                    Some(m.content.clone())
                },
                tool_calls: if m.tool_calls.is_empty() {
                    None
                } else {
                    Some(
                        m.tool_calls
                            .iter()
                            .map(|tc| ApiToolCall {
                                id: tc.id.clone(),
                                r#type: "function".into(),
                                function: ApiFunction {
                                    name: tc.name.clone(),
                                    arguments: tc.arguments.clone(),
                                },
                            })
                            .collect(),
                    )
                },
                tool_call_id: m.tool_call_id.clone(),
            })
            .collect()
    }

    /// Convert tool definitions to OpenAI API format.
    fn to_api_tools(tools: &[ToolDefinition]) -> Vec<ApiToolDefinition> {
        tools
            .iter()
            .map(|t| ApiToolDefinition {
                r#type: "function".into(),
                function: ApiToolFunction {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                },
            })
            .collect()
    }

    fn to_api_tool_choice(choice: ToolChoice) -> serde_json::Value {
        match choice {
            ToolChoice::Auto => serde_json::json!("auto"),
            ToolChoice::None => serde_json::json!("none"),
            ToolChoice::Force(tool) => serde_json::json!({
                "type": "function",
                "function": { "name": tool.name() }
            }),
        }
    }

    fn request_body(request: &CompletionRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.messages),
            "temperature": request.temperature,
            "stream": false,
        });

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if !request.tools.is_empty() {
            body["tools"] = serde_json::json!(Self::to_api_tools(&request.tools));
            body["tool_choice"] = Self::to_api_tool_choice(request.tool_choice);
        }

        body
    }
}

#[async_trait]
impl CompletionGateway for OpenRouterGateway {
    fn name(&self) -> &str {
        &self.name
    }

    fn ensure_configured(&self) -> std::result::Result<(), GatewayError> {
        if self.api_key.trim().is_empty() {
            return Err(GatewayError::NotConfigured(format!(
                "no API key for completion gateway '{}'",
                self.name
            )));
        }
        Ok(())
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, GatewayError> {
        self.ensure_configured()?;

        let url = format!("{}/chat/completions", self.base_url);
        let body = Self::request_body(&request);

        debug!(
            gateway = %self.name,
            model = %request.model,
            messages = request.messages.len(),
            tool_choice = ?request.tool_choice,
            "Sending completion request"
        );

        let mut http = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");

        if let Some(app_url) = &self.app_url {
            http = http.header("HTTP-Referer", app_url);
        }
        if let Some(app_title) = &self.app_title {
            http = http.header("X-Title", app_title);
        }

        let response = http
            .json(&body)
            .send()
            .await
            .map_err(crate::transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %error_body, "Completion gateway returned error");
            return Err(GatewayError::from_status(status.as_u16(), error_body));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::InvalidResponse("No choices in response".into()))?;

        let tool_calls: Vec<MessageToolCall> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| MessageToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments: tc.function.arguments,
            })
            .collect();

        let message = Message {
            id: uuid::Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
            tool_call_id: None,
            timestamp: chrono::Utc::now(),
        };

        let usage = api_response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(CompletionResponse {
            message,
            usage,
            model: api_response.model.unwrap_or(request.model),
        })
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ApiToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolCall {
    id: String,
    #[serde(default = "function_type")]
    r#type: String,
    function: ApiFunction,
}

fn function_type() -> String {
    "function".into()
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolDefinition {
    r#type: String,
    function: ApiToolFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
