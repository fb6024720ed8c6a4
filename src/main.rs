//! Vaidya - Ayurvedic wellness chat assistant
//!
#![doc = "Main entry point for the Vaidya command-line application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vaidya::cli::{Cli, Commands};
use vaidya::commands;
use vaidya::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse first so --verbose can shape the log filter
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    tracing::debug!(
        owner_id = %config.identity.owner_id,
        backend = %config.storage.backend,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Chat {
            resume,
            provider,
            condition,
        } => {
            if let Some(p) = &provider {
                tracing::debug!("Using provider override: {}", p);
            }
            if let Some(r) = &resume {
                tracing::debug!("Resuming conversation: {}", r);
            }
            commands::chat::run_chat(config, resume, provider, condition).await
        }
        Commands::Ask {
            prompt,
            session,
            provider,
            condition,
        } => commands::ask::run_ask(config, prompt, session, provider, condition).await,
        Commands::History { command } => {
            tracing::info!("Starting history command");
            commands::history::handle_history(&config, command).await
        }
        Commands::New { title } => commands::create_session(&config, title).await,
        Commands::Suggest { condition } => commands::suggest(condition),
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "vaidya=debug" } else { "vaidya=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
