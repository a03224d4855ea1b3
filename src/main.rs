use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod auth;
mod cli;
mod config;
mod error;
mod geometry;
mod handlers;
mod ledger;
mod lifecycle;
mod pagination;
mod policy;
mod router;
mod schemas;
#[cfg(test)]
mod test_utils;

use cli::Cli;

/// Main entry point for the Rentals application.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rentals=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Rentals application starting");

    let cli = Cli::parse();
    cli.run().await?;

    Ok(())
}
