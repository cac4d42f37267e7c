//! Jester - Discord reply scrambler
//!
//! Watches registered users inside a guild and re-broadcasts a scrambled
//! copy of everything they say, either back into the originating channel
//! or into a configured destination channel.

mod common;
mod config;
mod discord;
mod engine;
mod store;

use std::sync::Arc;

use anyhow::Result;
use serenity::prelude::*;
use tokio::signal;
use tracing::{error, info, warn};

use config::Config;
use discord::Bot;
use engine::Substituter;
use store::{NoopPersistence, Persistence, PostgresPersistence, WatchStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Jester v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    // Pick the persistence backend. A missing or unreachable database is
    // not fatal: the bot keeps running on in-memory state only.
    let persistence: Arc<dyn Persistence> = match config.database_url.as_deref() {
        Some(url) => match PostgresPersistence::connect(url).await {
            Ok(pg) => {
                info!("Connected to database");
                Arc::new(pg)
            }
            Err(e) => {
                warn!("Database connection failed, continuing in-memory only: {}", e);
                Arc::new(NoopPersistence)
            }
        },
        None => {
            info!("No DATABASE_URL provided; watch entries will not survive restarts");
            Arc::new(NoopPersistence)
        }
    };

    let store = Arc::new(WatchStore::new(persistence));

    let intents =
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(Bot::new(store, Substituter::new()))
        .await?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received - disconnecting...");
        shard_manager.shutdown_all().await;
    });

    client.start().await?;

    info!("Exiting...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
