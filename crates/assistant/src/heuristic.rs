//! Keyword gate deciding whether a prompt describes a bug.
//!
//! This is a substring heuristic, not a classifier. A bug report that uses
//! none of the words slips through, and "issue" in unrelated text matches.

/// Terms that mark a prompt as a bug report. Matched case-insensitively.
pub const BUG_KEYWORDS: [&str; 9] = [
    "error",
    "bug",
    "crash",
    "exception",
    "traceback",
    "stack trace",
    "failed",
    "failure",
    "issue",
];

/// Whether the prompt should be grounded with a solutions search.
pub fn needs_search(prompt: &str) -> bool {
    let lower = prompt.to_lowercase();
    BUG_KEYWORDS.iter().any(|k| lower.contains(k))
}
