//! # BugStash Core
//!
//! Domain types, gateway traits, and error definitions for the BugStash
//! assistant. This crate does no I/O of its own: it defines the model that
//! the gateway clients and the orchestrator are written against.
//!
//! ## Layout
//!
//! - [`message`]: transcript messages and tool-call payloads
//! - [`provider`]: the completion gateway trait and its request/response types
//! - [`search`]: the solutions search gateway trait and result types
//! - [`tool`]: the closed set of assistant tools and argument parsing
//! - [`auth`]: the explicit per-call credential bundle

pub mod auth;
pub mod error;
pub mod message;
pub mod provider;
pub mod search;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use auth::AuthContext;
pub use error::{Error, GatewayError, Result};
pub use message::{Message, MessageToolCall, Role, Transcript};
pub use provider::{CompletionGateway, CompletionRequest, CompletionResponse, ToolChoice};
pub use search::{SearchGateway, SearchRequest, SearchResponse, SearchResult};
pub use tool::{AssistantTool, ParsedArgs, SearchArgs, parse_or_default};
