//! The assistant turn: gate, complete, search, complete again.

use std::sync::Arc;

use bugstash_config::AppConfig;
use bugstash_core::auth::AuthContext;
use bugstash_core::error::{Error, GatewayError};
use bugstash_core::message::{Message, MessageToolCall, Transcript};
use bugstash_core::provider::{CompletionGateway, CompletionRequest, ToolChoice};
use bugstash_core::search::{SearchGateway, SearchRequest, SearchResult};
use bugstash_core::tool::{AssistantTool, ParsedArgs, SearchArgs, parse_or_default};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::heuristic::needs_search;
use crate::prompt::SYSTEM_PROMPT;
use crate::trace;

/// Results requested per search when the caller gives no limit.
pub const DEFAULT_RESULT_LIMIT: u32 = 5;

/// Reply used when the model produces no text.
pub const FALLBACK_REPLY: &str = "I could not generate a response.";

/// What one assistant turn produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantResult {
    /// Final reply text
    pub reply: String,
    /// Every solution retrieved this turn, in call order
    pub hits: Vec<SearchResult>,
    /// One line per search performed
    #[serde(rename = "toolTrace")]
    pub tool_trace: Vec<String>,
}

/// Hits and trace accumulated while executing searches.
#[derive(Default)]
struct Retrieval {
    hits: Vec<SearchResult>,
    trace: Vec<String>,
}

/// Runs assistant turns against a completion gateway and a search gateway.
///
/// Holds no per-turn state, so one instance can serve concurrent callers.
pub struct Assistant {
    completion: Arc<dyn CompletionGateway>,
    search: Arc<dyn SearchGateway>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    system_prompt: String,
    result_limit: u32,
}

impl Assistant {
    pub fn new(
        completion: Arc<dyn CompletionGateway>,
        search: Arc<dyn SearchGateway>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            completion,
            search,
            model: model.into(),
            temperature: 0.2,
            max_tokens: None,
            system_prompt: SYSTEM_PROMPT.to_string(),
            result_limit: DEFAULT_RESULT_LIMIT,
        }
    }

    /// Build an assistant with the model and behaviour from `config`.
    pub fn from_config(
        config: &AppConfig,
        completion: Arc<dyn CompletionGateway>,
        search: Arc<dyn SearchGateway>,
    ) -> Self {
        let mut assistant = Self::new(completion, search, &config.completion.model)
            .with_temperature(config.completion.temperature)
            .with_result_limit(config.assistant.result_limit);
        if let Some(max) = config.completion.max_tokens {
            assistant = assistant.with_max_tokens(max);
        }
        if let Some(prompt) = &config.assistant.system_prompt_override {
            assistant = assistant.with_system_prompt(prompt);
        }
        assistant
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Replace the built-in system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Default results per search. Zero is ignored.
    pub fn with_result_limit(mut self, limit: u32) -> Self {
        if limit > 0 {
            self.result_limit = limit;
        }
        self
    }

    /// Answer `prompt`, grounding the reply in saved solutions when it looks
    /// like a bug report.
    ///
    /// Fails before any I/O when the completion gateway has no credentials
    /// or the prompt is blank. Either completion call failing fails the turn;
    /// search failures only show up in the trace.
    pub async fn run(
        &self,
        prompt: &str,
        auth: &AuthContext,
        result_limit: Option<u32>,
    ) -> Result<AssistantResult, Error> {
        self.completion
            .ensure_configured()
            .map_err(|e| Error::Config {
                message: e.to_string(),
            })?;

        if prompt.trim().is_empty() {
            return Err(Error::InvalidInput("prompt must not be empty".into()));
        }

        let limit = result_limit
            .filter(|l| *l > 0)
            .unwrap_or(self.result_limit);
        let wants_search = needs_search(prompt);
        let directive = if wants_search {
            ToolChoice::Force(AssistantTool::SearchSolutions)
        } else {
            ToolChoice::Auto
        };

        info!(
            model = %self.model,
            gateway = self.completion.name(),
            wants_search,
            auth = auth.kind(),
            "Assistant: starting turn"
        );

        let mut transcript = Transcript::new(&self.system_prompt, prompt);
        let first = self
            .completion
            .complete(self.request(&transcript, directive))
            .await?;

        let mut retrieval = Retrieval::default();

        if !first.message.has_tool_calls() {
            if wants_search {
                // Model ignored the forced directive; search for display only.
                debug!("Assistant: no tool call returned, running display search");
                self.run_search(&SearchRequest::new(prompt, limit), auth, &mut retrieval)
                    .await?;
            }
            return Ok(Self::finish(first.message.content, retrieval));
        }

        let calls = first.message.tool_calls.clone();
        let mut tool_messages = Vec::with_capacity(calls.len());
        for call in &calls {
            let output = match AssistantTool::from_name(&call.name) {
                Some(tool) => {
                    self.execute_tool(tool, call, prompt, limit, auth, &mut retrieval)
                        .await?
                }
                None => {
                    warn!(tool = %call.name, "Assistant: model requested unknown tool");
                    serde_json::json!({ "error": format!("unknown tool: {}", call.name) })
                        .to_string()
                }
            };
            tool_messages.push(Message::tool_result(&call.id, output));
        }

        transcript.push(first.message);
        for message in tool_messages {
            transcript.push(message);
        }

        let second = self
            .completion
            .complete(self.request(&transcript, ToolChoice::None))
            .await?;

        info!(
            tool_calls = calls.len(),
            hits = retrieval.hits.len(),
            "Assistant: turn complete"
        );

        Ok(Self::finish(second.message.content, retrieval))
    }

    /// [`run`](Self::run), abandoned as soon as `cancel` fires.
    ///
    /// Cancellation drops the in-flight request and yields
    /// [`Error::Cancelled`], never a partial result.
    pub async fn run_with_cancel(
        &self,
        prompt: &str,
        auth: &AuthContext,
        result_limit: Option<u32>,
        cancel: &CancellationToken,
    ) -> Result<AssistantResult, Error> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Assistant: turn cancelled");
                Err(Error::Cancelled)
            }
            result = self.run(prompt, auth, result_limit) => result,
        }
    }

    fn request(&self, transcript: &Transcript, tool_choice: ToolChoice) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            messages: transcript.to_vec(),
            tools: AssistantTool::definitions(),
            tool_choice,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    /// Execute one tool call and return the tool message content.
    async fn execute_tool(
        &self,
        tool: AssistantTool,
        call: &MessageToolCall,
        prompt: &str,
        limit: u32,
        auth: &AuthContext,
        retrieval: &mut Retrieval,
    ) -> Result<String, Error> {
        match tool {
            AssistantTool::SearchSolutions => {
                let args = parse_or_default::<SearchArgs>(&call.arguments);
                if let ParsedArgs::Defaulted { reason, .. } = &args {
                    debug!(call_id = %call.id, %reason, "Assistant: using default search arguments");
                }
                let args = args.into_inner();
                let request = SearchRequest::new(args.query_or(prompt), args.limit_or(limit));
                self.run_search(&request, auth, retrieval).await
            }
        }
    }

    /// Search, recording trace and hits. A gateway failure becomes an error
    /// trace line and an error-shaped tool message.
    async fn run_search(
        &self,
        request: &SearchRequest,
        auth: &AuthContext,
        retrieval: &mut Retrieval,
    ) -> Result<String, Error> {
        match self.search.search(request, auth).await {
            Ok(response) => {
                retrieval
                    .trace
                    .push(trace::search_ok(&request.query, response.total));
                let output = serde_json::to_string(&response)?;
                retrieval.hits.extend(response.results);
                Ok(output)
            }
            Err(e) => {
                warn!(query = %request.query, error = %e, "Assistant: search failed");
                retrieval.trace.push(trace::search_failed(&request.query));
                Ok(search_error_payload(&e))
            }
        }
    }

    fn finish(reply: String, retrieval: Retrieval) -> AssistantResult {
        let reply = if reply.trim().is_empty() {
            FALLBACK_REPLY.to_string()
        } else {
            reply
        };
        AssistantResult {
            reply,
            hits: retrieval.hits,
            tool_trace: retrieval.trace,
        }
    }
}

fn search_error_payload(error: &GatewayError) -> String {
    serde_json::json!({ "error": error.to_string() }).to_string()
}
