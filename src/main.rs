//! Murmur CLI entry point.

use anyhow::Result;
use clap::Parser;
use murmur::cli::{commands, Cli, Commands};
use murmur::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials may live in a .env file next to the invocation.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("murmur={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config_path = match &cli.config {
        Some(path) => Settings::expand_path(path),
        None => Settings::default_config_path(),
    };
    let settings = Settings::load_from(Some(&config_path))?;

    match cli.command {
        Commands::Report {
            query,
            output,
            since,
            sources,
            per_discussion,
        } => {
            commands::run_report(&query, output, since, sources, per_discussion, settings).await?;
        }

        Commands::Fetch {
            source,
            query,
            since,
            output,
        } => {
            commands::run_fetch(source, &query, since, output, settings).await?;
        }

        Commands::Agent {
            query,
            output,
            since,
            model,
        } => {
            commands::run_agent(&query, output, since, model, settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings, &config_path)?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, settings, &config_path)?;
        }
    }

    Ok(())
}
