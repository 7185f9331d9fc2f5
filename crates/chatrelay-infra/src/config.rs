//! Configuration loader for chatrelay.
//!
//! Reads a TOML file into [`RelayConfig`]. Falls back to defaults when the
//! file is missing or malformed, so the relay always starts with the stock
//! quota and session behavior. The completion API key never lives in the
//! file; it is read from the environment variable the file names.

use std::path::Path;

use secrecy::SecretString;

use chatrelay_types::config::{CompletionConfig, RelayConfig};
use chatrelay_types::error::ConfigError;

/// Load configuration from `path`.
///
/// - If the file does not exist, returns [`RelayConfig::default()`].
/// - If the file exists but cannot be read or parsed, logs a warning and
///   returns the default.
/// - Otherwise returns the parsed config.
pub async fn load_config(path: &Path) -> RelayConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return RelayConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return RelayConfig::default();
        }
    };

    match parse_config(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            RelayConfig::default()
        }
    }
}

/// Parse and validate a TOML document.
pub fn parse_config(content: &str) -> Result<RelayConfig, ConfigError> {
    let config: RelayConfig =
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    validate(&config)?;
    Ok(config)
}

/// Reject values that would make the relay unusable.
pub fn validate(config: &RelayConfig) -> Result<(), ConfigError> {
    if config.quota.limit == 0 {
        return Err(ConfigError::Invalid("quota.limit must be at least 1".into()));
    }
    if config.quota.window_secs == 0 {
        return Err(ConfigError::Invalid("quota.window_secs must be positive".into()));
    }
    if config.session.ttl_secs == 0 {
        return Err(ConfigError::Invalid("session.ttl_secs must be positive".into()));
    }
    if config.session.max_entries == Some(0) {
        return Err(ConfigError::Invalid("session.max_entries must be at least 1".into()));
    }
    if config.prompt.max_chars == 0 {
        return Err(ConfigError::Invalid("prompt.max_chars must be positive".into()));
    }
    if config.sweep_interval_secs == 0 {
        return Err(ConfigError::Invalid("sweep_interval_secs must be positive".into()));
    }
    Ok(())
}

/// Read the completion API key from the process environment.
pub fn resolve_api_key(config: &CompletionConfig) -> Result<SecretString, ConfigError> {
    resolve_api_key_with(config, |name| std::env::var(name).ok())
}

/// Read the completion API key through `lookup`.
///
/// An unset or blank variable is an error.
pub fn resolve_api_key_with(
    config: &CompletionConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    match lookup(&config.api_key_env) {
        Some(key) if !key.trim().is_empty() => Ok(SecretString::from(key.trim().to_string())),
        _ => Err(ConfigError::MissingApiKey(config.api_key_env.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("config.toml")).await;
        assert_eq!(config.quota.limit, 3);
        assert_eq!(config.session.ttl_secs, 3600);
        assert!(config.roster.is_empty());
    }

    #[tokio::test]
    async fn test_load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        tokio::fs::write(
            &path,
            r#"
reply_prefix = "[relay]"
admin_name = "ops"

[quota]
limit = 5
window_secs = 600

[completion]
model = "gpt-4o"
api_key_env = "RELAY_KEY"

[[roster]]
user_id = "@alice"
display_name = "Alice"
"#,
        )
        .await
        .unwrap();

        let config = load_config(&path).await;
        assert_eq!(config.reply_prefix, "[relay]");
        assert_eq!(config.admin_name, "ops");
        assert_eq!(config.quota.limit, 5);
        assert_eq!(config.quota.window_secs, 600);
        assert_eq!(config.completion.model, "gpt-4o");
        assert_eq!(config.completion.api_key_env, "RELAY_KEY");
        assert_eq!(config.roster.len(), 1);
        assert_eq!(config.roster[0].display_name, "Alice");
        // Untouched sections keep their defaults.
        assert_eq!(config.prompt.max_chars, 4000);
    }

    #[tokio::test]
    async fn test_load_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        tokio::fs::write(&path, "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_config(&path).await;
        assert_eq!(config.quota.limit, 3);
    }

    #[tokio::test]
    async fn test_load_config_invalid_values_return_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        tokio::fs::write(&path, "[quota]\nlimit = 0\n").await.unwrap();

        let config = load_config(&path).await;
        assert_eq!(config.quota.limit, 3);
    }

    #[test]
    fn test_parse_config_rejects_zero_values() {
        let err = parse_config("[session]\nttl_secs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = parse_config("[prompt]\nmax_chars = 0\n").unwrap_err();
        assert!(err.to_string().contains("prompt.max_chars"));
    }

    #[test]
    fn test_parse_config_reports_syntax_errors() {
        let err = parse_config("[quota\nlimit = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_resolve_api_key_reads_named_variable() {
        let config = CompletionConfig {
            api_key_env: "RELAY_KEY".to_string(),
            ..CompletionConfig::default()
        };
        let key = resolve_api_key_with(&config, |name| {
            (name == "RELAY_KEY").then(|| " sk-test \n".to_string())
        })
        .unwrap();
        assert_eq!(key.expose_secret(), "sk-test");
    }

    #[test]
    fn test_resolve_api_key_missing_or_blank_is_error() {
        let config = CompletionConfig::default();

        let err = resolve_api_key_with(&config, |_| None).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("environment variable '{}' is not set", config.api_key_env)
        );

        let err = resolve_api_key_with(&config, |_| Some("   ".to_string())).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey(_)));
    }
}
