//! Completion gateway trait: the abstraction over the language-model service.
//!
//! A completion gateway takes a transcript plus a tool directive and returns
//! the model's next message, which is either free text or a request to
//! invoke one or more tools.
//!
//! Implementations: OpenAI-compatible endpoints (OpenRouter by default).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::message::Message;
use crate::tool::AssistantTool;

/// Whether, and which, tool the model may call on this request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoice {
    /// The model decides on its own
    Auto,
    /// No tool calls permitted
    None,
    /// The model must call this tool
    Force(AssistantTool),
}

/// A tool definition sent to the model so it knows what it can call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// A single completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The model to use (e.g., "openai/gpt-4o-mini")
    pub model: String,

    /// The ordered transcript
    pub messages: Vec<Message>,

    /// Tools the model may call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,

    /// Tool-invocation directive
    pub tool_choice: ToolChoice,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.2
}

/// The first choice of a completion response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The generated assistant message. `content` is empty when the model
    /// produced no text.
    pub message: Message,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The completion gateway trait.
///
/// The orchestrator calls `complete()` without knowing which backend sits
/// behind it.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// A human-readable name for this gateway (e.g., "openrouter").
    fn name(&self) -> &str;

    /// Check that credentials are present. Must not perform I/O.
    fn ensure_configured(&self) -> std::result::Result<(), GatewayError> {
        Ok(())
    }

    /// Send a request and get the model's next message.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, GatewayError>;
}
