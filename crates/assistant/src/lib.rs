//! The BugStash assistant: a grounded reply to a bug report in two
//! completion calls.
//!
//! 1. **Gate** the prompt with a bug-keyword heuristic
//! 2. **Complete** once, forcing the search tool when the gate matched
//! 3. **If tool calls**: run each search in order, append results, and
//!    complete a second time with tools disabled
//! 4. **If text**: return it, running one display-only search when the
//!    gate matched
//!
//! There is no loop: the second completion always ends the turn.
//! Follow-up suggestions are a separate operation in [`suggestions`].

pub mod heuristic;
pub mod orchestrator;
pub mod prompt;
pub mod suggestions;
pub mod trace;

pub use heuristic::needs_search;
pub use orchestrator::{Assistant, AssistantResult, DEFAULT_RESULT_LIMIT, FALLBACK_REPLY};
pub use suggestions::SuggestionGenerator;

#[cfg(test)]
pub(crate) mod test_helpers;
