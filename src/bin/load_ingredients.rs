// ABOUTME: Bulk loader for the ingredient catalog
// ABOUTME: Reads a JSON array of {name, measurement_unit} and inserts entries not yet present
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Ingredient catalog loader.
//!
//! Usage:
//! ```bash
//! # Load into the database named by DATABASE_URL
//! cargo run --bin load-ingredients -- data/ingredients.json
//!
//! # Override database URL
//! cargo run --bin load-ingredients -- data/ingredients.json --database-url sqlite:./data/dev.db
//! ```

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use foodgram_server::{
    config::environment::DatabaseUrl,
    constants::{defaults, env_config},
    database::Database,
    logging::{LogFormat, LoggingConfig},
    models::NewIngredient,
};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "load-ingredients",
    about = "Foodgram ingredient catalog loader",
    long_about = "Insert ingredients from a JSON array of {name, measurement_unit} objects, skipping ones already present"
)]
struct LoadArgs {
    /// JSON file to load
    path: PathBuf,

    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = LoadArgs::parse();

    let mut log_config = LoggingConfig::from_env();
    log_config.format = LogFormat::Compact;
    if args.verbose {
        log_config.level = "debug".into();
    }
    log_config.init()?;

    let raw = tokio::fs::read_to_string(&args.path)
        .await
        .with_context(|| format!("Failed to read {}", args.path.display()))?;
    let ingredients: Vec<NewIngredient> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of ingredients", args.path.display()))?;

    let url = args
        .database_url
        .or_else(|| env::var(env_config::DATABASE_URL).ok())
        .unwrap_or_else(|| defaults::DATABASE_URL.to_owned());
    let database_url = DatabaseUrl::parse_url(&url)?;
    let database = Database::new(&database_url, defaults::DATABASE_MAX_CONNECTIONS)
        .await
        .context("Failed to initialize database")?;

    let created = database
        .ingredients()
        .load(&ingredients)
        .await
        .context("Failed to load ingredients")?;

    info!(
        read = ingredients.len(),
        created,
        skipped = (ingredients.len() as u64).saturating_sub(created),
        "Ingredient catalog loaded from {}",
        args.path.display()
    );
    println!("Loaded {created} new ingredients ({} in file)", ingredients.len());
    Ok(())
}
