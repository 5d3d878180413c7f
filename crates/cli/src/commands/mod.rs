//! Subcommand implementations and the wiring they share.

pub mod ask;
pub mod config_cmd;
pub mod doctor;
pub mod onboard;
pub mod search;
pub mod suggest;

use std::sync::Arc;

use bugstash_assistant::AssistantResult;
use bugstash_config::AppConfig;
use bugstash_core::provider::CompletionGateway;
use bugstash_core::search::{SearchGateway, SearchResult};
use bugstash_gateways::{OpenRouterGateway, SolutionsApiClient};

/// Load config or fail with a readable message.
pub(crate) fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

/// Exit early with setup instructions when no completion key is set.
pub(crate) fn require_completion_key(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.has_completion_key() {
        return Ok(());
    }
    eprintln!();
    eprintln!("  ERROR: No completion API key configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    OPENROUTER_API_KEY      = 'sk-or-v1-...'   (recommended)");
    eprintln!("    BUGSTASH_COMPLETION_KEY = 'sk-...'         (any OpenAI-compatible service)");
    eprintln!();
    eprintln!("  Or add it to your config file under [completion]:");
    eprintln!("    {}", AppConfig::config_path().display());
    eprintln!();
    Err("missing completion API key".into())
}

pub(crate) fn completion_gateway(config: &AppConfig) -> Arc<dyn CompletionGateway> {
    Arc::new(OpenRouterGateway::from_config(&config.completion))
}

pub(crate) fn search_gateway(config: &AppConfig) -> Arc<dyn SearchGateway> {
    Arc::new(SolutionsApiClient::new(&config.api_url))
}

/// Cancellation token that fires on Ctrl+C.
pub(crate) fn ctrl_c_token() -> tokio_util::sync::CancellationToken {
    let token = tokio_util::sync::CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });
    token
}

/// One line per hit: title, error type, tags.
pub(crate) fn render_hits(hits: &[SearchResult]) -> String {
    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            let mut line = format!("  {}. {}", i + 1, hit.title);
            if let Some(kind) = &hit.error_type {
                line.push_str(&format!(" [{kind}]"));
            }
            if !hit.tags.is_empty() {
                line.push_str(&format!(" #{}", hit.tags.join(" #")));
            }
            if !hit.preview.is_empty() {
                line.push_str(&format!("\n     {}", hit.preview));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Human-readable rendering of an assistant turn.
pub(crate) fn render_result(result: &AssistantResult, show_trace: bool) -> String {
    let mut out = result.reply.clone();
    if !result.hits.is_empty() {
        out.push_str("\n\nRelated solutions:\n");
        out.push_str(&render_hits(&result.hits));
    }
    if show_trace && !result.tool_trace.is_empty() {
        out.push_str("\n\nTrace:\n");
        for line in &result.tool_trace {
            out.push_str(&format!("  {line}\n"));
        }
        out.truncate(out.trim_end().len());
    }
    out
}
