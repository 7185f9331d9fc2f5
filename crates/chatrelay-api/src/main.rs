//! chatrelay CLI and webhook server entry point.
//!
//! Binary name: `chatrelay`
//!
//! Parses CLI arguments, loads configuration, wires the relay, then runs the
//! requested transport (HTTP webhook or terminal console).

mod cli;
mod http;
mod state;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use chatrelay_infra::config::load_config;
use chatrelay_infra::transport::ConsoleSink;
use chatrelay_observe::tracing_setup::{
    LogOptions, filter_for_verbosity, init_tracing, shutdown_tracing,
};

use cli::console::{ConsoleSender, print_banner, run_console};
use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&LogOptions {
        default_filter: filter_for_verbosity(cli.verbose, cli.quiet).to_string(),
        json: cli.json,
        enable_otel: cli.otel,
    })
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = load_config(&cli.config).await;

    match cli.command {
        Commands::Config => {
            cli::config::show_config(&config, &cli.config, cli.json)?;
        }

        Commands::Serve { port, host } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }
            let addr = format!("{}:{}", config.server.host, config.server.port);

            let state = AppState::init(config)?;
            let cancel = CancellationToken::new();
            let sweeper = state.spawn_sweeper(cancel.clone());

            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!(%addr, "chatrelay webhook listening");
            if !cli.quiet {
                eprintln!(
                    "  {} chatrelay listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                eprintln!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            let router = http::router::build_router(state);
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            cancel.cancel();
            sweeper.await?;
            tracing::info!("server stopped");
        }

        Commands::Console {
            sender_name,
            sender_id,
        } => {
            let sender = ConsoleSender {
                id: sender_id.unwrap_or_else(|| sender_name.clone()),
                name: sender_name,
            };

            let state = AppState::init(config)?;
            let cancel = CancellationToken::new();
            let sweeper = state.spawn_sweeper(cancel.clone());

            if !cli.quiet {
                print_banner(&sender, state.pipeline.quota().limit());
            }

            let sink = ConsoleSink::stdout("chatrelay");
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            tokio::select! {
                result = run_console(&state, &sender, stdin, &sink) => {
                    let replied = result?;
                    tracing::debug!(replied, "console input closed");
                }
                _ = shutdown_signal() => {}
            }

            cancel.cancel();
            sweeper.await?;
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
