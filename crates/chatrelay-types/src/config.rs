//! Configuration types for chatrelay.
//!
//! `RelayConfig` represents the top-level `config.toml`. Every field has a
//! default, so an empty file (or no file at all) yields a working relay.

use serde::{Deserialize, Serialize};

use crate::message::Friend;

/// Top-level relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Line prepended to every formatted reply. Empty means no prefix line.
    #[serde(default)]
    pub reply_prefix: String,

    /// Display name allowed to issue the cache-clear admin command.
    #[serde(default = "default_admin_name")]
    pub admin_name: String,

    /// Seconds between background sweeps of expired cache entries.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    #[serde(default)]
    pub quota: QuotaConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub prompt: PromptConfig,

    #[serde(default)]
    pub completion: CompletionConfig,

    #[serde(default)]
    pub server: ServerConfig,

    /// Contacts known to the webhook and console transports.
    #[serde(default)]
    pub roster: Vec<Friend>,
}

fn default_admin_name() -> String {
    "锐".to_string()
}

fn default_sweep_interval_secs() -> u64 {
    60
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            reply_prefix: String::new(),
            admin_name: default_admin_name(),
            sweep_interval_secs: default_sweep_interval_secs(),
            quota: QuotaConfig::default(),
            session: SessionConfig::default(),
            prompt: PromptConfig::default(),
            completion: CompletionConfig::default(),
            server: ServerConfig::default(),
            roster: Vec::new(),
        }
    }
}

/// Per-user usage limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Successful completions allowed per window.
    #[serde(default = "default_quota_limit")]
    pub limit: u32,
    /// Window length in seconds, restarted on every successful use.
    #[serde(default = "default_quota_window_secs")]
    pub window_secs: u64,
}

fn default_quota_limit() -> u32 {
    3
}

fn default_quota_window_secs() -> u64 {
    3600
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            limit: default_quota_limit(),
            window_secs: default_quota_window_secs(),
        }
    }
}

/// Rolling conversation context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_ttl_secs")]
    pub ttl_secs: u64,
    /// Upper bound on cached sessions. `None` means unbounded.
    #[serde(default)]
    pub max_entries: Option<usize>,
}

fn default_session_ttl_secs() -> u64 {
    3600
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_session_ttl_secs(),
            max_entries: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Hard cap, in characters, on the prompt sent upstream.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

fn default_max_chars() -> usize {
    4000
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
        }
    }
}

/// OpenAI-compatible completion endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: None,
            timeout_secs: default_timeout_secs(),
            api_key_env: default_api_key_env(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3030
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}
