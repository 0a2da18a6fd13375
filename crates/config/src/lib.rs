//! Configuration loading, validation, and management for Threadline.
//!
//! Loads configuration from `~/.threadline/config.toml` (or an explicit
//! path) with environment variable overrides. Validates all settings at
//! startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.threadline/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Language model settings
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Vector store settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// System prompt settings
    #[serde(default)]
    pub prompt: PromptConfig,

    /// Audit channel settings
    #[serde(default)]
    pub audit: AuditConfig,

    /// HTTP gateway settings
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// State token settings
    #[serde(default)]
    pub state: StateConfig,

    /// Per-query settings
    #[serde(default)]
    pub query: QueryConfig,
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Backend name: "openai", "openrouter", "ollama", "anthropic", or any
    /// OpenAI-compatible endpoint name paired with `api_url`
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens per answer
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4o".into()
}
fn default_temperature() -> f32 {
    0.0
}
fn default_max_tokens() -> u32 {
    1024
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            api_key: None,
            api_url: None,
        }
    }
}

impl std::fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// "postgres" or "memory"
    #[serde(default = "default_retrieval_backend")]
    pub backend: String,

    /// Connection string for the postgres backend (may carry a password)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,

    /// Embedding table; the exploded layout also reads `{table}_content`
    #[serde(default = "default_table")]
    pub table: String,

    /// "exploded" (one row per dimension) or "pgvector"
    #[serde(default = "default_layout")]
    pub layout: String,

    /// Passages returned per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Must match the model the corpus was embedded with
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// OpenAI-compatible backend used for query embeddings
    #[serde(default = "default_embedding_provider")]
    pub embedding_provider: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_api_url: Option<String>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// JSON file of pre-embedded passages for the memory backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passages_path: Option<PathBuf>,
}

fn default_retrieval_backend() -> String {
    "postgres".into()
}
fn default_table() -> String {
    "doc_vectors".into()
}
fn default_layout() -> String {
    "exploded".into()
}
fn default_top_k() -> usize {
    5
}
fn default_embedding_model() -> String {
    "text-embedding-ada-002".into()
}
fn default_embedding_provider() -> String {
    "openai".into()
}
fn default_max_connections() -> u32 {
    5
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            backend: default_retrieval_backend(),
            database_url: None,
            table: default_table(),
            layout: default_layout(),
            top_k: default_top_k(),
            embedding_model: default_embedding_model(),
            embedding_provider: default_embedding_provider(),
            embedding_api_url: None,
            max_connections: default_max_connections(),
            passages_path: None,
        }
    }
}

impl std::fmt::Debug for RetrievalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalConfig")
            .field("backend", &self.backend)
            .field("database_url", &redact(&self.database_url))
            .field("table", &self.table)
            .field("layout", &self.layout)
            .field("top_k", &self.top_k)
            .field("embedding_model", &self.embedding_model)
            .field("embedding_provider", &self.embedding_provider)
            .field("embedding_api_url", &self.embedding_api_url)
            .field("max_connections", &self.max_connections)
            .field("passages_path", &self.passages_path)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    /// What questions are assumed to be about
    #[serde(default = "default_subject")]
    pub subject: String,

    /// Replaces the built-in instructions entirely when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

fn default_subject() -> String {
    "the Yellowbrick Data Warehouse".into()
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            subject: default_subject(),
            instructions: None,
        }
    }
}

/// How the orchestrator runs audit publication relative to the response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditMode {
    /// Spawned after the response is ready; never delays the caller
    #[default]
    Detached,
    /// Awaited before responding; failures still swallowed
    Inline,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// "slack", "log", or "none"
    #[serde(default = "default_audit_backend")]
    pub backend: String,

    /// Slack bot token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Slack channel id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,

    #[serde(default = "default_slack_api_url")]
    pub api_url: String,

    #[serde(default)]
    pub mode: AuditMode,
}

fn default_true() -> bool {
    true
}
fn default_audit_backend() -> String {
    "log".into()
}
fn default_slack_api_url() -> String {
    "https://slack.com/api".into()
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: default_audit_backend(),
            token: None,
            channel: None,
            api_url: default_slack_api_url(),
            mode: AuditMode::default(),
        }
    }
}

impl std::fmt::Debug for AuditConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditConfig")
            .field("enabled", &self.enabled)
            .field("backend", &self.backend)
            .field("token", &redact(&self.token))
            .field("channel", &self.channel)
            .field("api_url", &self.api_url)
            .field("mode", &self.mode)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// CORS origins; `"*"` allows any
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_allowed_origins() -> Vec<String> {
    vec!["*".into()]
}
fn default_body_limit() -> usize {
    1024 * 1024
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            allowed_origins: default_allowed_origins(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct StateConfig {
    /// HMAC key for state tokens; unsigned tokens when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_key: Option<String>,
}

impl std::fmt::Debug for StateConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateConfig")
            .field("signing_key", &redact(&self.signing_key))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Deadline covering retrieval and generation together
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.threadline/config.toml).
    ///
    /// Environment variables fill in secrets and connection details:
    /// - `THREADLINE_API_KEY`, `OPENAI_API_KEY`, `OPEN_API_KEY` (first wins)
    /// - `THREADLINE_DATABASE_URL`, `YB_CONNECTION_STRING`
    /// - `SLACK_API_KEY`, `SLACK_CHANNEL_ID`
    /// - `THREADLINE_STATE_KEY`
    ///
    /// `THREADLINE_MODEL` and `THREADLINE_AUDIT_BACKEND` override the file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_path(&Self::config_path())
    }

    /// Like [`AppConfig::load`] but reading an explicit file.
    pub fn load_path(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::read(path)?;
        config.apply_env(|key| std::env::var(key).ok().filter(|v| !v.is_empty()));
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path, without environment
    /// overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Apply environment overrides using `lookup` to resolve variables.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let first = |keys: &[&str]| keys.iter().find_map(|k| lookup(*k));

        if self.generation.api_key.is_none() {
            self.generation.api_key =
                first(&["THREADLINE_API_KEY", "OPENAI_API_KEY", "OPEN_API_KEY"]);
        }
        if let Some(model) = lookup("THREADLINE_MODEL") {
            self.generation.model = model;
        }

        if self.retrieval.database_url.is_none() {
            self.retrieval.database_url =
                first(&["THREADLINE_DATABASE_URL", "YB_CONNECTION_STRING"]);
        }

        if let Some(backend) = lookup("THREADLINE_AUDIT_BACKEND") {
            self.audit.backend = backend;
        }
        if self.audit.token.is_none() {
            self.audit.token = lookup("SLACK_API_KEY");
        }
        if self.audit.channel.is_none() {
            self.audit.channel = lookup("SLACK_CHANNEL_ID");
        }

        if self.state.signing_key.is_none() {
            self.state.signing_key = lookup("THREADLINE_STATE_KEY");
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".threadline")
    }

    /// Get the default configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let gen_cfg = &self.generation;
        if !(0.0..=2.0).contains(&gen_cfg.temperature) {
            return Err(ConfigError::ValidationError(
                "generation.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if gen_cfg.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "generation.max_tokens must be > 0".into(),
            ));
        }
        if gen_cfg.provider.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "generation.provider must not be empty".into(),
            ));
        }

        let ret = &self.retrieval;
        if !matches!(ret.backend.as_str(), "postgres" | "memory") {
            return Err(ConfigError::ValidationError(format!(
                "retrieval.backend must be 'postgres' or 'memory', got '{}'",
                ret.backend
            )));
        }
        if !matches!(ret.layout.as_str(), "exploded" | "pgvector") {
            return Err(ConfigError::ValidationError(format!(
                "retrieval.layout must be 'exploded' or 'pgvector', got '{}'",
                ret.layout
            )));
        }
        if ret.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.top_k must be >= 1".into(),
            ));
        }
        if !is_sql_identifier(&ret.table) {
            return Err(ConfigError::ValidationError(format!(
                "retrieval.table '{}' is not a plain (optionally schema-qualified) identifier",
                ret.table
            )));
        }
        if ret.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.max_connections must be >= 1".into(),
            ));
        }

        let audit = &self.audit;
        if !matches!(audit.backend.as_str(), "slack" | "log" | "none") {
            return Err(ConfigError::ValidationError(format!(
                "audit.backend must be 'slack', 'log', or 'none', got '{}'",
                audit.backend
            )));
        }
        if audit.enabled
            && audit.backend == "slack"
            && (audit.token.is_none() || audit.channel.is_none())
        {
            return Err(ConfigError::ValidationError(
                "audit.backend 'slack' requires audit.token and audit.channel \
                 (or SLACK_API_KEY and SLACK_CHANNEL_ID)"
                    .into(),
            ));
        }

        if self.state.signing_key.as_deref() == Some("") {
            return Err(ConfigError::ValidationError(
                "state.signing_key must not be empty when set".into(),
            ));
        }

        if self.query.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "query.timeout_secs must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Check if a generation API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.generation.api_key.is_some()
    }

    /// Generate a default config TOML string (for the `config` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// `name` or `schema.name`, ASCII letters, digits, underscores.
fn is_sql_identifier(s: &str) -> bool {
    let parts: Vec<&str> = s.split('.').collect();
    parts.len() <= 2
        && parts.iter().all(|p| {
            let mut chars = p.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
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

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.generation.model, "gpt-4o");
        assert!(config.generation.temperature.abs() < f32::EPSILON);
        assert_eq!(config.generation.max_tokens, 1024);
        assert_eq!(config.retrieval.table, "doc_vectors");
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.query.timeout_secs, 120);
        assert_eq!(config.audit.mode, AuditMode::Detached);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.generation.provider, config.generation.provider);
        assert_eq!(parsed.gateway.port, config.gateway.port);
        assert_eq!(parsed.audit.mode, config.audit.mode);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let parsed: AppConfig = toml::from_str(
            r#"
            [retrieval]
            backend = "memory"
            top_k = 3

            [audit]
            mode = "inline"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.retrieval.backend, "memory");
        assert_eq!(parsed.retrieval.top_k, 3);
        assert_eq!(parsed.retrieval.table, "doc_vectors");
        assert_eq!(parsed.audit.mode, AuditMode::Inline);
        assert_eq!(parsed.generation.model, "gpt-4o");
    }

    #[test]
    fn invalid_temperature_rejected() {
        let mut config = AppConfig::default();
        config.generation.temperature = 5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_top_k_rejected() {
        let mut config = AppConfig::default();
        config.retrieval.top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_timeout_rejected() {
        let mut config = AppConfig::default();
        config.query.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unsafe_table_name_rejected() {
        let mut config = AppConfig::default();
        config.retrieval.table = "doc_vectors; DROP TABLE x".into();
        assert!(config.validate().is_err());

        config.retrieval.table = "public.doc_vectors".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_backends_rejected() {
        let mut config = AppConfig::default();
        config.retrieval.backend = "sqlite".into();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.audit.backend = "email".into();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.retrieval.layout = "faiss".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn slack_audit_requires_credentials() {
        let mut config = AppConfig::default();
        config.audit.backend = "slack".into();
        assert!(config.validate().is_err());

        config.audit.enabled = false;
        assert!(config.validate().is_ok());

        config.audit.enabled = true;
        config.audit.token = Some("xoxb-test".into());
        config.audit.channel = Some("C0123".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn env_fills_missing_secrets() {
        let mut config = AppConfig::default();
        config.apply_env(env_of(&[
            ("OPEN_API_KEY", "sk-legacy"),
            ("YB_CONNECTION_STRING", "postgres://u:p@host/db"),
            ("SLACK_API_KEY", "xoxb-1"),
            ("SLACK_CHANNEL_ID", "C1"),
            ("THREADLINE_STATE_KEY", "state-key"),
        ]));
        assert_eq!(config.generation.api_key.as_deref(), Some("sk-legacy"));
        assert_eq!(
            config.retrieval.database_url.as_deref(),
            Some("postgres://u:p@host/db")
        );
        assert_eq!(config.audit.token.as_deref(), Some("xoxb-1"));
        assert_eq!(config.audit.channel.as_deref(), Some("C1"));
        assert_eq!(config.state.signing_key.as_deref(), Some("state-key"));
    }

    #[test]
    fn env_key_precedence() {
        let mut config = AppConfig::default();
        config.apply_env(env_of(&[
            ("OPEN_API_KEY", "sk-legacy"),
            ("OPENAI_API_KEY", "sk-openai"),
            ("THREADLINE_API_KEY", "sk-threadline"),
        ]));
        assert_eq!(config.generation.api_key.as_deref(), Some("sk-threadline"));
    }

    #[test]
    fn file_secrets_win_over_env() {
        let mut config = AppConfig::default();
        config.generation.api_key = Some("from-file".into());
        config.apply_env(env_of(&[("OPENAI_API_KEY", "from-env")]));
        assert_eq!(config.generation.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn env_overrides_model_and_audit_backend() {
        let mut config = AppConfig::default();
        config.apply_env(env_of(&[
            ("THREADLINE_MODEL", "gpt-4o-mini"),
            ("THREADLINE_AUDIT_BACKEND", "none"),
        ]));
        assert_eq!(config.generation.model, "gpt-4o-mini");
        assert_eq!(config.audit.backend, "none");
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut config = AppConfig::default();
        config.generation.api_key = Some("sk-secret".into());
        config.retrieval.database_url = Some("postgres://user:hunter2@db/x".into());
        config.audit.token = Some("xoxb-secret".into());
        config.state.signing_key = Some("k-secret".into());
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("sk-secret"));
        assert!(!dbg.contains("hunter2"));
        assert!(!dbg.contains("xoxb-secret"));
        assert!(!dbg.contains("k-secret"));
        assert!(dbg.contains("[REDACTED]"));
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().generation.provider, "openai");
    }

    #[test]
    fn load_from_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[generation]\nprovider = \"anthropic\"\nmodel = \"claude-sonnet-4\"\n\n[gateway]\nport = 9090"
        )
        .unwrap();
        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.generation.provider, "anthropic");
        assert_eq!(config.gateway.port, 9090);
    }

    #[test]
    fn load_from_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[generation\nprovider = ").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn load_from_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[query]\ntimeout_secs = 0").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("gpt-4o"));
        assert!(toml_str.contains("doc_vectors"));
        assert!(toml_str.contains("8080"));
    }

    #[test]
    fn config_path_under_home() {
        assert!(AppConfig::config_path().ends_with(".threadline/config.toml"));
    }
}
