//! kasa-deck - Stream Deck plugin for Kasa smart plugs
//!
//! Toggles Kasa smart plugs through the TP-Link cloud, lists the devices of
//! an account, and provides a simple counter action for keys and dials.

mod actions;
mod config;
mod error;
mod host;
mod inspector;
mod kasa;
mod launch;
mod runtime;
mod settings;
mod state;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::kasa::KasaClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kasa_deck=info".into()),
        )
        .init();

    // Parse host launch arguments
    let args = launch::parse_from(std::env::args())?;
    tracing::info!(
        "Starting kasa-deck {}...",
        args.plugin_version()
            .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string())
    );

    // Load configuration
    let config = config::Config::load()?;
    tracing::info!("Configuration loaded (gateway {})", config.gateway.base_url);

    let gateway = Arc::new(KasaClient::new(&config.gateway)?);

    // Connect and register with the host
    let host = host::connect(
        &args.websocket_url(),
        &args.register_event,
        &args.plugin_uuid,
    )
    .await?;

    runtime::run(gateway, &config.plugin, host).await;

    tracing::info!("kasa-deck stopped");
    Ok(())
}
