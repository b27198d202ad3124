use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use crate::app::app;
use crate::config::AppConfig;
use crate::database::{DatabaseManager, PgStore};
use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "bookmarker-api")]
#[command(about = "Bookmark management API server")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Override the listen host")]
    pub host: Option<String>,

    #[arg(long, global = true, help = "Override the listen port")]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Apply the schema and serve HTTP (default)")]
    Serve,

    #[command(about = "Apply the schema and exit")]
    Migrate,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env();
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config.validate().context("invalid configuration")?;

    tracing::info!("Starting bookmarker API in {:?} mode", config.environment);

    let manager = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    manager.health_check().await.context("database is not reachable")?;
    manager.migrate().await.context("failed to apply schema")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Migrate => {
            tracing::info!("schema is up to date");
            manager.close().await;
            Ok(())
        }
        Commands::Serve => serve(config, manager).await,
    }
}

async fn serve(config: AppConfig, manager: DatabaseManager) -> anyhow::Result<()> {
    let bind_addr = config.server.bind_addr();
    let store = Arc::new(PgStore::new(&manager));
    let router = app(AppState::new(store, config));

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    manager.close().await;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {}", e);
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
                tracing::error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
