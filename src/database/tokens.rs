// ABOUTME: Registry of revoked JWT ids written on logout
// ABOUTME: Rows are purged once the token they block would have expired anyway
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::format_timestamp;
use crate::errors::{AppError, AppResult};

/// Revoked token database operations manager
pub struct TokensManager {
    pool: SqlitePool,
}

impl TokensManager {
    /// Create a new tokens manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record `jti` as revoked until `expires_at`, purging stale rows
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO revoked_tokens (jti, expires_at) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(jti)
        .bind(format_timestamp(expires_at))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to revoke token: {e}")))?;

        self.purge_expired(Utc::now()).await?;
        Ok(())
    }

    /// Whether `jti` has been revoked
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn is_revoked(&self, jti: &str) -> AppResult<bool> {
        let exists: i64 =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM revoked_tokens WHERE jti = $1)")
                .bind(jti)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to check token: {e}")))?;
        Ok(exists != 0)
    }

    /// Drop revocations for tokens that expired before `now`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < $1")
            .bind(format_timestamp(now))
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to purge revoked tokens: {e}")))?;
        Ok(result.rows_affected())
    }
}
