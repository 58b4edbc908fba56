// ABOUTME: Author subscription persistence (follower -> author)
// ABOUTME: Self-follows are rejected by a CHECK constraint as well as by the routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashSet;

use chrono::Utc;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use super::format_timestamp;
use super::users::row_to_user;
use crate::errors::{AppError, AppResult};
use crate::models::User;
use crate::pagination::PageParams;

/// Subscription database operations manager
pub struct FollowsManager {
    pool: SqlitePool,
}

impl FollowsManager {
    /// Create a new follows manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Subscribe `follower_id` to `author_id`; `false` if already subscribed
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn follow(&self, follower_id: i64, author_id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            INSERT INTO follows (follower_id, author_id, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            ",
        )
        .bind(follower_id)
        .bind(author_id)
        .bind(format_timestamp(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create subscription: {e}")))?;

        Ok(result.rows_affected() == 1)
    }

    /// Remove a subscription; `false` if there was none
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn unfollow(&self, follower_id: i64, author_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND author_id = $2")
            .bind(follower_id)
            .bind(author_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete subscription: {e}")))?;

        Ok(result.rows_affected() == 1)
    }

    /// Whether `follower_id` is subscribed to `author_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn is_following(&self, follower_id: i64, author_id: i64) -> AppResult<bool> {
        Ok(self
            .following_among(follower_id, &[author_id])
            .await?
            .contains(&author_id))
    }

    /// The subset of `author_ids` that `follower_id` is subscribed to
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn following_among(
        &self,
        follower_id: i64,
        author_ids: &[i64],
    ) -> AppResult<HashSet<i64>> {
        if author_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT author_id FROM follows WHERE follower_id = ");
        builder.push_bind(follower_id).push(" AND author_id IN (");
        let mut separated = builder.separated(", ");
        for id in author_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let ids = builder
            .build_query_scalar::<i64>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to check subscriptions: {e}")))?;

        Ok(ids.into_iter().collect())
    }

    /// One page of authors `follower_id` follows, with each author's recipe count
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_following(
        &self,
        follower_id: i64,
        params: &PageParams,
    ) -> AppResult<(Vec<(User, i64)>, i64)> {
        let rows = sqlx::query(
            r"
            SELECT u.id, u.email, u.username, u.first_name, u.last_name, u.password_hash,
                   u.avatar, u.is_active, u.created_at,
                   (SELECT COUNT(*) FROM recipes r WHERE r.author_id = u.id) AS recipes_count
            FROM follows f
            JOIN users u ON u.id = f.author_id
            WHERE f.follower_id = $1
            ORDER BY u.username, u.id
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(follower_id)
        .bind(i64::from(params.limit()))
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list subscriptions: {e}")))?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE follower_id = $1")
            .bind(follower_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count subscriptions: {e}")))?;

        let authors = rows
            .iter()
            .map(|row| {
                let recipes_count: i64 = row.try_get("recipes_count").map_err(|e| {
                    AppError::database(format!("Failed to decode recipe count: {e}"))
                })?;
                Ok((row_to_user(row, "")?, recipes_count))
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok((authors, count))
    }
}
