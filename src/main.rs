mod cli;
mod config;
mod error;
mod form;
mod handlers;
mod logging;
mod mailer;
mod models;
mod templates;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::error::AppError;
use crate::mailer::Mailer;
use crate::templates::Templates;

pub struct AppState {
    pub config: Config,
    pub templates: Templates,
    pub mailer: Mailer,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Preview(args)) => cli::run_preview_to_stdout(args),
        Some(Commands::Serve(args)) => serve(args.into_config()).await,
        None => serve(Config::default()).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn serve(config: Config) -> Result<(), AppError> {
    // Held until shutdown so buffered log lines get flushed
    let _log_guard = logging::init(&config)?;
    tracing::info!("Brundle start");

    let templates = Templates::load(&config.views_dir)?;
    let mailer = Mailer::new(&config)?;

    tracing::info!("Views directory: {}", config.views_dir.display());
    tracing::info!("Log file: {}", config.log_path().display());
    tracing::info!(
        "Forwarding reports to {} via {}:{}",
        mailer.recipient(),
        config.relay_host,
        config.relay_port
    );

    let addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState { config, templates, mailer });
    let app = handlers::app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
