//! Explicit per-call credentials.

use serde::{Deserialize, Serialize};

/// Credentials for the solutions API. Holds at most one credential.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AuthContext {
    #[default]
    Anonymous,
    /// Session bearer token
    Bearer(String),
    /// Long-lived API key
    ApiKey(String),
}

impl AuthContext {
    /// Build from optional parts. An API key wins over a bearer token; blank
    /// values count as absent.
    pub fn from_parts(token: Option<&str>, api_key: Option<&str>) -> Self {
        let present = |v: Option<&str>| v.map(str::trim).filter(|s| !s.is_empty()).map(String::from);
        match (present(token), present(api_key)) {
            (_, Some(key)) => AuthContext::ApiKey(key),
            (Some(token), None) => AuthContext::Bearer(token),
            (None, None) => AuthContext::Anonymous,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, AuthContext::Anonymous)
    }

    /// Short label for logs. Never includes the secret.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthContext::Anonymous => "anonymous",
            AuthContext::Bearer(_) => "bearer",
            AuthContext::ApiKey(_) => "api_key",
        }
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthContext::Anonymous => write!(f, "Anonymous"),
            AuthContext::Bearer(_) => write!(f, "Bearer([REDACTED])"),
            AuthContext::ApiKey(_) => write!(f, "ApiKey([REDACTED])"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_wins_over_token() {
        let auth = AuthContext::from_parts(Some("tok"), Some("key"));
        assert_eq!(auth, AuthContext::ApiKey("key".into()));
    }

    #[test]
    fn token_only() {
        let auth = AuthContext::from_parts(Some("tok"), None);
        assert_eq!(auth, AuthContext::Bearer("tok".into()));
    }

    #[test]
    fn blank_values_are_absent() {
        let auth = AuthContext::from_parts(Some("  "), Some(""));
        assert!(auth.is_anonymous());
        assert_eq!(AuthContext::from_parts(Some(" "), Some("k")).kind(), "api_key");
    }

    #[test]
    fn debug_redacts_secret() {
        let dbg = format!("{:?}", AuthContext::ApiKey("sk-secret".into()));
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("REDACTED"));
    }
}
