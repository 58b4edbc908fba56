// ABOUTME: Foodgram API server binary
// ABOUTME: Loads configuration, connects the database, and serves the REST API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Foodgram API Server Binary
//!
//! Usage:
//! ```bash
//! cargo run --bin foodgram-server
//! cargo run --bin foodgram-server -- --http-port 9000 --database-url sqlite:./data/dev.db
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use foodgram_server::{
    config::environment::{DatabaseUrl, ServerConfig},
    database::Database,
    logging,
    resources::ServerResources,
    server,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "foodgram-server")]
#[command(about = "Foodgram - recipe sharing REST API")]
struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(url) = args.database_url {
        config.database_url = DatabaseUrl::parse_url(&url)?;
    }

    info!("Starting Foodgram API");
    info!("{}", config.summary());

    let database = Database::new(&config.database_url, config.database_max_connections)
        .await
        .context("Failed to initialize database")?;
    info!("Database ready: {}", config.database_url);

    let resources = Arc::new(ServerResources::new(database, config));
    server::run(resources).await
}
