//! HTTP gateway implementations for BugStash.
//!
//! - [`OpenRouterGateway`] implements `bugstash_core::CompletionGateway`
//!   against any OpenAI-compatible `/chat/completions` endpoint.
//! - [`SolutionsApiClient`] implements `bugstash_core::SearchGateway`
//!   against the BugStash REST API.

pub mod completion;
pub mod solutions;

#[cfg(test)]
pub(crate) mod test_server;

pub use completion::OpenRouterGateway;
pub use solutions::SolutionsApiClient;

use std::time::Duration;

use bugstash_core::error::GatewayError;

/// HTTP client with a whole-request timeout.
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Classify a failed send: timeouts stay distinct from other transport errors.
pub(crate) fn transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout(e.to_string())
    } else {
        GatewayError::Network(e.to_string())
    }
}
