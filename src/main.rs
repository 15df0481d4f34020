//! Strictly Battleship - coordinator binary

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use strictly_battleship::{GameServer, ServerConfig};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    initialize_tracing();

    let config = ServerConfig::resolve(cli.config.as_deref(), cli.addr)?;
    info!(addr = %config.socket_addr(), "Starting battleship coordinator");

    GameServer::new(config).run().await?;
    Ok(())
}

fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,strictly_battleship=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
