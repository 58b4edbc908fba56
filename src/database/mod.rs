// ABOUTME: SQLite connection management and schema bootstrap
// ABOUTME: Exposes one manager per domain over the shared connection pool
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Database Management
//!
//! `Database` owns the `SqlitePool`, creates the schema on startup, and hands
//! out lightweight per-domain managers that borrow a clone of the pool.

mod follows;
mod ingredients;
mod recipes;
mod relations;
mod tokens;
mod users;

pub use follows::FollowsManager;
pub use ingredients::IngredientsManager;
pub use recipes::RecipesManager;
pub use relations::RelationsManager;
pub use tokens::TokensManager;
pub use users::UsersManager;

use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::config::environment::DatabaseUrl;
use crate::errors::{AppError, AppResult};

/// Database handle shared by all request handlers
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect and run migrations
    ///
    /// In-memory databases are pinned to a single connection that is never
    /// recycled, otherwise the schema would vanish with the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or schema creation fails
    pub async fn new(url: &DatabaseUrl, max_connections: u32) -> Result<Self> {
        if let DatabaseUrl::SQLite { path } = url {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        let options = SqliteConnectOptions::from_str(&url.to_connection_string())
            .context("Invalid SQLite connection string")?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if url.is_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to {url}"))?;

        let db = Self { pool };
        db.migrate().await?;
        info!(database = %url, "Database ready");

        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// User accounts
    #[must_use]
    pub fn users(&self) -> UsersManager {
        UsersManager::new(self.pool.clone())
    }

    /// Ingredient catalog
    #[must_use]
    pub fn ingredients(&self) -> IngredientsManager {
        IngredientsManager::new(self.pool.clone())
    }

    /// Recipes and their ingredient rows
    #[must_use]
    pub fn recipes(&self) -> RecipesManager {
        RecipesManager::new(self.pool.clone())
    }

    /// Favorites and shopping carts
    #[must_use]
    pub fn relations(&self) -> RelationsManager {
        RelationsManager::new(self.pool.clone())
    }

    /// Author subscriptions
    #[must_use]
    pub fn follows(&self) -> FollowsManager {
        FollowsManager::new(self.pool.clone())
    }

    /// Revoked token registry
    #[must_use]
    pub fn tokens(&self) -> TokensManager {
        TokensManager::new(self.pool.clone())
    }

    /// Create every table and index that does not exist yet
    ///
    /// # Errors
    ///
    /// Returns an error if any DDL statement fails
    pub async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Migration failed: {}", first_line(statement)))?;
        }
        Ok(())
    }
}

fn first_line(statement: &str) -> &str {
    statement.trim().lines().next().unwrap_or_default()
}

const SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE COLLATE NOCASE,
        username TEXT NOT NULL UNIQUE,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        avatar TEXT,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS ingredients (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        name_lower TEXT NOT NULL,
        measurement_unit TEXT NOT NULL,
        UNIQUE (name, measurement_unit)
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_ingredients_name_lower ON ingredients(name_lower)",
    r"
    CREATE TABLE IF NOT EXISTS recipes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        author_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        image TEXT NOT NULL,
        text TEXT NOT NULL,
        cooking_time INTEGER NOT NULL CHECK (cooking_time BETWEEN 1 AND 32000),
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_recipes_author ON recipes(author_id)",
    "CREATE INDEX IF NOT EXISTS idx_recipes_created_at ON recipes(created_at)",
    r"
    CREATE TABLE IF NOT EXISTS recipe_ingredients (
        recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
        ingredient_id INTEGER NOT NULL REFERENCES ingredients(id) ON DELETE CASCADE,
        amount INTEGER NOT NULL CHECK (amount BETWEEN 1 AND 32000),
        PRIMARY KEY (recipe_id, ingredient_id)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS favorites (
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
        created_at TEXT NOT NULL,
        PRIMARY KEY (user_id, recipe_id)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS shopping_cart (
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
        created_at TEXT NOT NULL,
        PRIMARY KEY (user_id, recipe_id)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS follows (
        follower_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        author_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at TEXT NOT NULL,
        PRIMARY KEY (follower_id, author_id),
        CHECK (follower_id <> author_id)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS revoked_tokens (
        jti TEXT PRIMARY KEY,
        expires_at TEXT NOT NULL
    )
    ",
];

/// Fixed-width RFC 3339 so that text ordering matches time ordering
pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::database(format!("Invalid timestamp '{value}': {e}")))
}

/// Escape `%`, `_` and `\` for use in a `LIKE ... ESCAPE '\'` pattern
pub(crate) fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
