//! Follow-up question suggestions.
//!
//! Independent of [`Assistant::run`](crate::Assistant::run): callers that
//! want suggestions ask for them explicitly after a turn.

use std::collections::HashSet;
use std::sync::Arc;

use bugstash_core::error::Error;
use bugstash_core::message::Transcript;
use bugstash_core::provider::{CompletionGateway, CompletionRequest, ToolChoice};
use bugstash_core::tool::{ParsedArgs, parse_or_default};
use serde::Deserialize;
use tracing::debug;

use crate::prompt::suggestion_prompt;

/// Sampling temperature for suggestion calls.
const SUGGESTION_TEMPERATURE: f32 = 0.7;

/// Accepted reply shapes: a bare array or `{"suggestions": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum SuggestionPayload {
    List(Vec<String>),
    Wrapped { suggestions: Vec<String> },
}

impl Default for SuggestionPayload {
    fn default() -> Self {
        SuggestionPayload::List(Vec::new())
    }
}

impl SuggestionPayload {
    fn into_vec(self) -> Vec<String> {
        match self {
            SuggestionPayload::List(v) | SuggestionPayload::Wrapped { suggestions: v } => v,
        }
    }
}

/// Generates follow-up questions with one completion call.
pub struct SuggestionGenerator {
    completion: Arc<dyn CompletionGateway>,
    model: String,
}

impl SuggestionGenerator {
    pub fn new(completion: Arc<dyn CompletionGateway>, model: impl Into<String>) -> Self {
        Self {
            completion,
            model: model.into(),
        }
    }

    /// Suggest up to `count` follow-up questions for a prompt and its reply.
    pub async fn suggest(&self, prompt: &str, reply: &str, count: usize) -> Result<Vec<String>, Error> {
        self.completion
            .ensure_configured()
            .map_err(|e| Error::Config {
                message: e.to_string(),
            })?;

        if count == 0 {
            return Ok(Vec::new());
        }

        let transcript = Transcript::new(
            suggestion_prompt(count),
            format!("Question:\n{prompt}\n\nAnswer:\n{reply}"),
        );
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: transcript.to_vec(),
            tools: Vec::new(),
            tool_choice: ToolChoice::None,
            temperature: SUGGESTION_TEMPERATURE,
            max_tokens: Some(256),
        };

        let response = self.completion.complete(request).await?;
        let suggestions = parse_suggestions(&response.message.content, count);
        debug!(count = suggestions.len(), "Generated follow-up suggestions");
        Ok(suggestions)
    }
}

/// Parse a model reply into at most `count` distinct suggestions.
pub fn parse_suggestions(raw: &str, count: usize) -> Vec<String> {
    let body = strip_code_fence(raw);
    let candidates = match parse_or_default::<SuggestionPayload>(body) {
        ParsedArgs::Parsed(payload) => payload.into_vec(),
        ParsedArgs::Defaulted { .. } => body.lines().map(strip_list_marker).map(String::from).collect(),
    };

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .take(count)
        .collect()
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    // Drop a language tag such as ```json
    match inner.split_once('\n') {
        Some((tag, rest)) if !tag.trim().contains(' ') => rest.trim(),
        _ => inner.trim(),
    }
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    let line = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix("• "))
        .unwrap_or_else(|| {
            let digits = line.chars().take_while(char::is_ascii_digit).count();
            if digits > 0 {
                let rest = &line[digits..];
                rest.strip_prefix('.')
                    .or_else(|| rest.strip_prefix(')'))
                    .unwrap_or(line)
            } else {
                line
            }
        });
    line.trim().trim_matches('"')
}
