//! The assistant's tools and their argument parsing.
//!
//! The set of tools is closed. The model names a tool by string on the
//! wire; [`AssistantTool::from_name`] resolves that string once, and all
//! dispatch after that is an exhaustive `match` on the enum.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::provider::ToolDefinition;

/// Every tool the assistant can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssistantTool {
    /// Full-text search over saved solutions
    SearchSolutions,
}

impl AssistantTool {
    pub const ALL: [AssistantTool; 1] = [AssistantTool::SearchSolutions];

    /// Wire name sent to and received from the model.
    pub fn name(&self) -> &'static str {
        match self {
            AssistantTool::SearchSolutions => "search_solutions",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    pub fn description(&self) -> &'static str {
        match self {
            AssistantTool::SearchSolutions => {
                "Search saved bug and error solutions. Returns matching solutions with title, \
                 error type, tags, and a short preview."
            }
        }
    }

    /// JSON Schema describing this tool's parameters.
    pub fn parameters_schema(&self) -> serde_json::Value {
        match self {
            AssistantTool::SearchSolutions => serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Error message, stack trace excerpt, or keywords to search for"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of solutions to return",
                        "minimum": 1
                    }
                },
                "required": ["query"]
            }),
        }
    }

    /// Convert this tool into a ToolDefinition for sending to the model.
    pub fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }

    /// Definitions for every tool.
    pub fn definitions() -> Vec<ToolDefinition> {
        Self::ALL.iter().map(AssistantTool::to_definition).collect()
    }
}

impl std::fmt::Display for AssistantTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of [`parse_or_default`].
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedArgs<T> {
    /// The payload parsed cleanly
    Parsed(T),
    /// The payload was empty or malformed and `T::default()` was used
    Defaulted { value: T, reason: String },
}

impl<T> ParsedArgs<T> {
    pub fn into_inner(self) -> T {
        match self {
            ParsedArgs::Parsed(value) | ParsedArgs::Defaulted { value, .. } => value,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, ParsedArgs::Defaulted { .. })
    }
}

/// Parse a JSON payload, falling back to `T::default()`. Never fails.
pub fn parse_or_default<T>(raw: &str) -> ParsedArgs<T>
where
    T: DeserializeOwned + Default,
{
    if raw.trim().is_empty() {
        return ParsedArgs::Defaulted {
            value: T::default(),
            reason: "empty payload".into(),
        };
    }
    match serde_json::from_str(raw) {
        Ok(value) => ParsedArgs::Parsed(value),
        Err(e) => ParsedArgs::Defaulted {
            value: T::default(),
            reason: e.to_string(),
        },
    }
}

/// Arguments of [`AssistantTool::SearchSolutions`].
///
/// Each field is read leniently: a value of the wrong shape becomes `None`
/// instead of failing the whole payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchArgs {
    #[serde(default, deserialize_with = "lenient_text")]
    pub query: Option<String>,
    #[serde(default, deserialize_with = "lenient_limit")]
    pub limit: Option<u32>,
}

impl SearchArgs {
    /// The query to run, or `fallback` when none was given.
    pub fn query_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.query.as_deref().unwrap_or(fallback)
    }

    pub fn limit_or(&self, fallback: u32) -> u32 {
        self.limit.unwrap_or(fallback)
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from))
}

fn lenient_limit<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let n = match &value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64)),
        serde_json::Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    Ok(n.filter(|n| *n > 0).and_then(|n| u32::try_from(n).ok()))
}
