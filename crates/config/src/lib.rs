//! Configuration loading, validation, and management for BugStash.
//!
//! Loads configuration from `~/.bugstash/config.toml` with environment
//! variable overrides. Validates all settings at load time.

use bugstash_core::AuthContext;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.bugstash/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the BugStash REST API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Language-model completion service
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Assistant behaviour
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Solutions API credentials
    #[serde(default)]
    pub auth: AuthConfig,
}

fn default_api_url() -> String {
    "http://localhost:8000".into()
}
fn default_completion_url() -> String {
    "https://openrouter.ai/api/v1".into()
}
fn default_model() -> String {
    "openai/gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.2
}
fn default_app_url() -> String {
    "https://bugstash.dev".into()
}
fn default_app_title() -> String {
    "BugStash".into()
}
fn default_result_limit() -> u32 {
    5
}
/// Follow-up questions offered after a turn.
pub const DEFAULT_SUGGESTION_COUNT: usize = 3;

fn default_suggestion_count() -> usize {
    DEFAULT_SUGGESTION_COUNT
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_completion_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Sent as `HTTP-Referer` to identify the calling application
    #[serde(default = "default_app_url")]
    pub app_url: String,

    /// Sent as `X-Title`
    #[serde(default = "default_app_title")]
    pub app_title: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_completion_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: None,
            app_url: default_app_url(),
            app_title: default_app_title(),
        }
    }
}

impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("app_url", &self.app_url)
            .field("app_title", &self.app_title)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Default number of search results requested per search
    #[serde(default = "default_result_limit")]
    pub result_limit: u32,

    /// Replace the built-in system prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_override: Option<String>,

    /// How many follow-up suggestions to generate
    #[serde(default = "default_suggestion_count")]
    pub suggestion_count: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            result_limit: default_result_limit(),
            system_prompt_override: None,
            suggestion_count: default_suggestion_count(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Session bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// API key (preferred over the token when both are set)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &redact(&self.token))
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.bugstash/config.toml).
    ///
    /// Environment variables override the file:
    /// - `BUGSTASH_COMPLETION_KEY` (highest priority), then `OPENROUTER_API_KEY`
    /// - `BUGSTASH_MODEL`
    /// - `BUGSTASH_API_URL`
    /// - `BUGSTASH_TOKEN`, `BUGSTASH_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = var("BUGSTASH_COMPLETION_KEY").or_else(|| var("OPENROUTER_API_KEY")) {
            self.completion.api_key = Some(key);
        }
        if let Some(model) = var("BUGSTASH_MODEL") {
            self.completion.model = model;
        }
        if let Some(url) = var("BUGSTASH_API_URL") {
            self.api_url = url;
        }
        if let Some(token) = var("BUGSTASH_TOKEN") {
            self.auth.token = Some(token);
        }
        if let Some(key) = var("BUGSTASH_API_KEY") {
            self.auth.api_key = Some(key);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".bugstash")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.completion.temperature) {
            return Err(ConfigError::ValidationError(
                "completion.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.assistant.result_limit == 0 {
            return Err(ConfigError::ValidationError(
                "assistant.result_limit must be at least 1".into(),
            ));
        }

        if self.api_url.trim().is_empty() {
            return Err(ConfigError::ValidationError("api_url must not be empty".into()));
        }

        if self.completion.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "completion.base_url must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Check if a completion key is available (from config or environment).
    pub fn has_completion_key(&self) -> bool {
        self.completion
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    /// Credentials for the solutions API. The API key wins over the token.
    pub fn auth_context(&self) -> AuthContext {
        AuthContext::from_parts(self.auth.token.as_deref(), self.auth.api_key.as_deref())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            completion: CompletionConfig::default(),
            assistant: AssistantConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.assistant.result_limit, 5);
        assert!(config.completion.base_url.contains("openrouter.ai"));
        assert!(!config.has_completion_key());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.api_url, config.api_url);
        assert_eq!(parsed.completion.model, config.completion.model);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let mut config = AppConfig::default();
        config.completion.temperature = 5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_result_limit_rejected() {
        let mut config = AppConfig::default();
        config.assistant.result_limit = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.api_url, "http://localhost:8000");
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
api_url = "https://api.bugstash.dev"

[completion]
api_key = "sk-or-test"
model = "anthropic/claude-3.5-haiku"

[assistant]
result_limit = 8

[auth]
token = "session-token"
"#
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.api_url, "https://api.bugstash.dev");
        assert_eq!(config.completion.model, "anthropic/claude-3.5-haiku");
        assert_eq!(config.assistant.result_limit, 8);
        assert_eq!(config.assistant.suggestion_count, DEFAULT_SUGGESTION_COUNT);
        assert!(config.has_completion_key());
        assert_eq!(config.auth_context(), AuthContext::Bearer("session-token".into()));
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_url = [unterminated").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("OPENROUTER_API_KEY", "sk-or-env"),
            ("BUGSTASH_MODEL", "openai/gpt-4o"),
            ("BUGSTASH_API_URL", "http://127.0.0.1:9000"),
            ("BUGSTASH_TOKEN", "tok"),
            ("BUGSTASH_API_KEY", "key"),
        ]);
        let mut config = AppConfig::default();
        config.apply_env(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.completion.api_key.as_deref(), Some("sk-or-env"));
        assert_eq!(config.completion.model, "openai/gpt-4o");
        assert_eq!(config.api_url, "http://127.0.0.1:9000");
        assert_eq!(config.auth_context(), AuthContext::ApiKey("key".into()));
    }

    #[test]
    fn bugstash_completion_key_beats_openrouter_key() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("OPENROUTER_API_KEY", "sk-or-env"),
            ("BUGSTASH_COMPLETION_KEY", "sk-bugstash"),
        ]);
        let mut config = AppConfig::default();
        config.apply_env(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(config.completion.api_key.as_deref(), Some("sk-bugstash"));
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut config = AppConfig::default();
        config.completion.api_key = Some("sk-or-very-secret".into());
        config.auth.api_key = Some("bs-key-secret".into());
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("very-secret"));
        assert!(!dbg.contains("bs-key-secret"));
        assert!(dbg.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("openrouter.ai"));
        assert!(toml_str.contains("result_limit"));
    }
}
