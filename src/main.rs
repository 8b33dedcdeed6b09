mod commands;
mod config;
mod error;
mod platform;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::CommandRegistry;
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,topicbot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("Configuration loaded successfully");
    info!("  Group: {}", config.telegram.group_id);
    info!("  Managed topic thread: {}", config.telegram.managed_thread_id);
    info!("  Emails: {}", config.emails.len());

    let registry =
        CommandRegistry::with_default_commands().context("Failed to build command registry")?;
    info!("  Commands: {}", registry.len());

    info!("Bot is starting...");
    platform::telegram::run(Arc::new(config), registry).await?;

    Ok(())
}
