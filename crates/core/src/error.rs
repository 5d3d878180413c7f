//! Error types for the BugStash domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Both gateways report failures through [`GatewayError`]; the orchestrator
//! decides per call site whether a gateway failure is fatal or recovered.

use thiserror::Error;

/// The top-level error type for all BugStash operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Gateway errors ---
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Caller errors ---
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Operation cancelled")]
    Cancelled,

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether this failure stems from missing or invalid configuration.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::Config { .. } | Error::Gateway(GatewayError::NotConfigured(_))
        )
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures reported by the completion and search gateways.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Gateway not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request timed out: {0}")]
    Timeout(String),
}

impl GatewayError {
    /// Map a non-success HTTP status and body to the matching variant.
    pub fn from_status(status_code: u16, body: String) -> Self {
        match status_code {
            429 => GatewayError::RateLimited {
                retry_after_secs: 5,
            },
            401 | 403 => GatewayError::AuthenticationFailed(
                "Invalid credentials or insufficient permissions".into(),
            ),
            _ => GatewayError::ApiError {
                status_code,
                message: body,
            },
        }
    }
}
