//! Shared test helpers: scripted gateways that record what they were sent.

use bugstash_core::auth::AuthContext;
use bugstash_core::error::GatewayError;
use bugstash_core::message::{Message, MessageToolCall};
use bugstash_core::provider::{CompletionGateway, CompletionRequest, CompletionResponse, Usage};
use bugstash_core::search::{SearchGateway, SearchRequest, SearchResponse, SearchResult};
use chrono::{TimeZone, Utc};
use std::sync::Mutex;

/// A completion gateway that returns a sequence of scripted outcomes.
///
/// Each call to `complete` returns the next outcome in the queue.
/// Panics if more calls are made than outcomes provided.
pub struct ScriptedCompletion {
    outcomes: Mutex<Vec<Result<CompletionResponse, GatewayError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    configured: bool,
}

impl ScriptedCompletion {
    pub fn new(outcomes: Vec<Result<CompletionResponse, GatewayError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes),
            requests: Mutex::new(Vec::new()),
            configured: true,
        }
    }

    /// A single plain-text reply.
    pub fn text(text: &str) -> Self {
        Self::new(vec![Ok(text_response(text))])
    }

    /// Tool calls first, then a final answer.
    pub fn tool_then_answer(tool_calls: Vec<MessageToolCall>, answer: &str) -> Self {
        Self::new(vec![
            Ok(tool_call_response(tool_calls)),
            Ok(text_response(answer)),
        ])
    }

    /// A gateway whose credentials are missing.
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new(vec![])
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl CompletionGateway for ScriptedCompletion {
    fn name(&self) -> &str {
        "scripted"
    }

    fn ensure_configured(&self) -> Result<(), GatewayError> {
        if self.configured {
            Ok(())
        } else {
            Err(GatewayError::NotConfigured("no API key".into()))
        }
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, GatewayError> {
        let mut requests = self.requests.lock().unwrap();
        let mut outcomes = self.outcomes.lock().unwrap();
        if outcomes.is_empty() {
            panic!(
                "ScriptedCompletion: no more outcomes (call #{})",
                requests.len()
            );
        }
        requests.push(request);
        outcomes.remove(0)
    }
}

/// A completion gateway whose calls never finish.
pub struct HangingCompletion {
    started: Mutex<usize>,
}

impl HangingCompletion {
    pub fn new() -> Self {
        Self {
            started: Mutex::new(0),
        }
    }

    /// Calls that reached the gateway.
    pub fn started(&self) -> usize {
        *self.started.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl CompletionGateway for HangingCompletion {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, GatewayError> {
        *self.started.lock().unwrap() += 1;
        std::future::pending().await
    }
}

/// A search gateway that returns scripted outcomes in order, repeating the
/// last one once the queue runs dry.
pub struct RecordingSearch {
    outcomes: Mutex<Vec<Result<SearchResponse, GatewayError>>>,
    calls: Mutex<Vec<(SearchRequest, AuthContext)>>,
}

impl RecordingSearch {
    pub fn new(outcomes: Vec<Result<SearchResponse, GatewayError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always returns `count` results.
    pub fn returning(count: usize) -> Self {
        Self::new(vec![Ok(search_response(count))])
    }

    /// Always fails with a server error.
    pub fn failing() -> Self {
        Self::new(vec![Err(GatewayError::ApiError {
            status_code: 500,
            message: "search backend down".into(),
        })])
    }

    pub fn calls(&self) -> Vec<(SearchRequest, AuthContext)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SearchGateway for RecordingSearch {
    async fn search(
        &self,
        request: &SearchRequest,
        auth: &AuthContext,
    ) -> Result<SearchResponse, GatewayError> {
        self.calls
            .lock()
            .unwrap()
            .push((request.clone(), auth.clone()));
        let mut outcomes = self.outcomes.lock().unwrap();
        if outcomes.len() > 1 {
            outcomes.remove(0)
        } else {
            outcomes
                .first()
                .cloned()
                .unwrap_or_else(|| Ok(search_response(0)))
        }
    }
}

/// Create a simple text response (no tool calls).
pub fn text_response(text: &str) -> CompletionResponse {
    CompletionResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Create a response carrying tool calls and no text.
pub fn tool_call_response(tool_calls: Vec<MessageToolCall>) -> CompletionResponse {
    let mut message = Message::assistant("");
    message.tool_calls = tool_calls;
    CompletionResponse {
        message,
        usage: None,
        model: "mock-model".into(),
    }
}

/// Helper to create a tool call with JSON arguments.
pub fn tool_call(id: &str, name: &str, args: serde_json::Value) -> MessageToolCall {
    raw_tool_call(id, name, &serde_json::to_string(&args).unwrap())
}

/// Helper to create a tool call with a raw argument string.
pub fn raw_tool_call(id: &str, name: &str, arguments: &str) -> MessageToolCall {
    MessageToolCall {
        id: id.into(),
        name: name.into(),
        arguments: arguments.into(),
    }
}

/// A search response holding `count` results.
pub fn search_response(count: usize) -> SearchResponse {
    SearchResponse {
        total: count as u64,
        results: (0..count).map(solution).collect(),
    }
}

pub fn solution(i: usize) -> SearchResult {
    SearchResult {
        id: format!("sol_{i}"),
        title: format!("Solution {i}"),
        error_type: Some("TypeError".into()),
        tags: vec!["javascript".into()],
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        preview: format!("Preview of solution {i}"),
    }
}
