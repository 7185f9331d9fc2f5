//! CLI command definitions for the `chatrelay` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod config;
pub mod console;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Relay chat messages to a text-completion service under per-user quota.
#[derive(Parser)]
#[command(name = "chatrelay", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON (config dump and log lines).
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans to stdout through OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    /// Path to the TOML configuration file.
    #[arg(
        long,
        global = true,
        env = "CHATRELAY_CONFIG",
        default_value = "config.toml"
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP webhook server.
    Serve {
        /// Port to listen on (overrides `server.port`).
        #[arg(long)]
        port: Option<u16>,

        /// Host to bind to (overrides `server.host`).
        #[arg(long)]
        host: Option<String>,
    },

    /// Chat with the relay from the terminal, one message per line.
    Console {
        /// Display name to send as. Use the admin name to try admin commands.
        #[arg(long = "as", default_value = "console")]
        sender_name: String,

        /// User id to send as (defaults to the display name).
        #[arg(long)]
        sender_id: Option<String>,
    },

    /// Print the effective configuration.
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_serve_overrides_parse() {
        let cli = Cli::parse_from(["chatrelay", "-v", "serve", "--port", "8080"]);
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Serve { port, host } => {
                assert_eq!(port, Some(8080));
                assert!(host.is_none());
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_console_sender_flags_parse() {
        let cli = Cli::parse_from([
            "chatrelay",
            "console",
            "--as",
            "锐",
            "--sender-id",
            "@root",
            "--config",
            "relay.toml",
        ]);
        assert_eq!(cli.config, PathBuf::from("relay.toml"));
        match cli.command {
            Commands::Console {
                sender_name,
                sender_id,
            } => {
                assert_eq!(sender_name, "锐");
                assert_eq!(sender_id.as_deref(), Some("@root"));
            }
            _ => panic!("expected console"),
        }
    }
}
