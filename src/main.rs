// Standard library
use std::process;

// 3rd party crates
use tokio::signal::ctrl_c;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

// Project modules
mod providers;
mod service;
mod settings;
mod utility;
mod webhook;

// Project imports
use crate::service::DdnsService;
use crate::settings::types::ConfigManager;

/// Entry point for the Cloudflare DDNS agent.
///
/// Loads and validates the configuration (exit code 1 on failure),
/// then runs the reconciliation loop until Ctrl+C. The loop keeps a
/// set of DNS records pointed at the host's current public IP and
/// reports outcomes through an optional webhook.
#[tokio::main]
async fn main() {
    let config = match ConfigManager::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load configuration: {e}");
            process::exit(1);
        }
    };

    // Verbosity comes from the configuration; noisy HTTP internals
    // stay capped at error.
    let filter: EnvFilter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(&config.settings.log.level)
        .add_directive("hyper_util=error".parse().unwrap())
        .add_directive("hyper=error".parse().unwrap())
        .add_directive("reqwest=error".parse().unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_level(true)
        .init();

    info!("⚙️ settings loaded from {}", config.config_path().display());

    // Fan the Ctrl+C signal out to the reconciliation loop.
    let (shutdown_tx, _) = broadcast::channel(1);
    let shutdown_tx_clone = shutdown_tx.clone();

    tokio::spawn(async move {
        if let Err(e) = ctrl_c().await {
            error!("failed to listen for Ctrl+C: {}", e);
            return;
        }
        info!("received shutdown signal, initiating graceful shutdown...");
        let _ = shutdown_tx_clone.send(());
    });

    let mut service = match DdnsService::new(config) {
        Ok(service) => service,
        Err(e) => {
            error!("failed to initialize service: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = service.start(shutdown_tx.subscribe()).await {
        error!("service failed: {}", e);
        process::exit(1);
    }

    info!("shutdown complete");
}
