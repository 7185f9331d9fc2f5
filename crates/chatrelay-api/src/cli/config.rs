//! `chatrelay config`: print the effective configuration.

use anyhow::Result;
use console::style;

use chatrelay_types::config::RelayConfig;

/// Print `config` as TOML (or JSON with `--json`), followed by whether the
/// completion API key variable is set. The key itself is never printed.
pub fn show_config(config: &RelayConfig, source: &std::path::Path, json: bool) -> Result<()> {
    let key_present = std::env::var_os(&config.completion.api_key_env).is_some();

    if json {
        let value = serde_json::json!({
            "source": source.display().to_string(),
            "config": config,
            "api_key_present": key_present,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("# effective configuration ({})", source.display());
    println!("{}", render_toml(config)?);

    let key_line = if key_present {
        format!("{} {} is set", style("✓").green(), config.completion.api_key_env)
    } else {
        format!("{} {} is not set", style("✗").red(), config.completion.api_key_env)
    };
    eprintln!("{key_line}");
    Ok(())
}

fn render_toml(config: &RelayConfig) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}
