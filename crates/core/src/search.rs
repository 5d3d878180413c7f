//! Solutions search gateway: the read side of the BugStash REST API that the
//! assistant uses for grounding.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::auth::AuthContext;
use crate::error::GatewayError;

/// Request body for `POST /search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, limit: u32) -> Self {
        Self {
            query: query.into(),
            limit,
            offset: 0,
        }
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }
}

/// A saved solution summary as returned by search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    /// Error classification tag (e.g. "TypeError")
    #[serde(default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// RFC 3339, or an offset-less timestamp read as UTC
    #[serde(deserialize_with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
    /// Short preview of the solution body
    #[serde(default)]
    pub preview: String,
}

/// Response body for `POST /search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub total: u64,
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

/// Anything that can search the solutions corpus.
#[async_trait]
pub trait SearchGateway: Send + Sync {
    async fn search(
        &self,
        request: &SearchRequest,
        auth: &AuthContext,
    ) -> std::result::Result<SearchResponse, GatewayError>;
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}
