mod bootstrap;
mod health;
mod negotiate;

use anyhow::Result;
use haggle_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use haggle_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config)?;

    health::spawn(
        &app.config.server.bind_address,
        app.config.server.health_check_port,
        app.service.clone(),
        app.formatter_mode,
    )
    .await?;

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        formatter_mode = app.formatter_mode,
        "haggle-server started"
    );

    axum::serve(listener, negotiate::router(app.service.clone()))
        .with_graceful_shutdown(wait_for_shutdown(app.config.server.graceful_shutdown_secs))
        .await?;

    tracing::info!(
        event_name = "system.server.stopped",
        correlation_id = "shutdown",
        "haggle-server stopped"
    );

    Ok(())
}

async fn wait_for_shutdown(graceful_shutdown_secs: u64) {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(
            event_name = "system.server.signal_error",
            correlation_id = "shutdown",
            error = %error,
            "failed to listen for shutdown signal"
        );
        return;
    }
    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        graceful_shutdown_secs,
        "shutdown signal received, draining connections"
    );
}
