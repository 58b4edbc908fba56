// ABOUTME: User account persistence: registration, lookup, password and avatar updates
// ABOUTME: Unique email/username violations surface as field-level validation errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::{format_timestamp, parse_timestamp};
use crate::errors::{AppError, AppResult};
use crate::models::{NewUser, User};
use crate::pagination::PageParams;

pub(super) const USER_COLUMNS: &str =
    "id, email, username, first_name, last_name, password_hash, avatar, is_active, created_at";

/// User account database operations manager
pub struct UsersManager {
    pool: SqlitePool,
}

impl UsersManager {
    /// Create a new users manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new account
    ///
    /// # Errors
    ///
    /// Returns a validation error if the email or username is taken, or a
    /// database error if the insert fails otherwise
    pub async fn create(&self, user: &NewUser) -> AppResult<User> {
        let created_at = Utc::now();

        let result = sqlx::query(
            r"
            INSERT INTO users (email, username, first_name, last_name, password_hash, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, 1, $6)
            ",
        )
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(format_timestamp(created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                if db.message().contains("users.email") {
                    AppError::invalid_field("email", "A user with that email already exists.")
                } else {
                    AppError::invalid_field("username", "A user with that username already exists.")
                }
            }
            _ => AppError::database(format!("Failed to create user: {e}")),
        })?;

        self.get_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| AppError::database("Created user could not be read back"))
    }

    /// Get a user by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get user: {e}")))?;

        row.map(|r| row_to_user(&r, "")).transpose()
    }

    /// Get a user by email, case-insensitively
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 COLLATE NOCASE"
        ))
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get user by email: {e}")))?;

        row.map(|r| row_to_user(&r, "")).transpose()
    }

    /// One page of users in registration order, plus the total count
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list(&self, params: &PageParams) -> AppResult<(Vec<User>, i64)> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(params.limit()))
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list users: {e}")))?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count users: {e}")))?;

        let users = rows
            .iter()
            .map(|r| row_to_user(r, ""))
            .collect::<AppResult<Vec<_>>>()?;

        Ok((users, count))
    }

    /// Replace the stored password hash
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn update_password(&self, id: i64, password_hash: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update password: {e}")))?;
        Ok(())
    }

    /// Set or clear the avatar path, returning the previous one
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn set_avatar(&self, id: i64, avatar: Option<&str>) -> AppResult<Option<String>> {
        let previous: Option<Option<String>> =
            sqlx::query_scalar("SELECT avatar FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to read avatar: {e}")))?;

        sqlx::query("UPDATE users SET avatar = $1 WHERE id = $2")
            .bind(avatar)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update avatar: {e}")))?;

        Ok(previous.flatten())
    }
}

/// Decode a user from columns named `{prefix}id`, `{prefix}email`, ...
pub(super) fn row_to_user(row: &SqliteRow, prefix: &str) -> AppResult<User> {
    let column = |name: &str| format!("{prefix}{name}");
    let decode = |e: sqlx::Error| AppError::database(format!("Failed to decode user row: {e}"));

    let created_at: String = row.try_get(column("created_at").as_str()).map_err(decode)?;
    let is_active: i64 = row.try_get(column("is_active").as_str()).map_err(decode)?;

    Ok(User {
        id: row.try_get(column("id").as_str()).map_err(decode)?,
        email: row.try_get(column("email").as_str()).map_err(decode)?,
        username: row.try_get(column("username").as_str()).map_err(decode)?,
        first_name: row.try_get(column("first_name").as_str()).map_err(decode)?,
        last_name: row.try_get(column("last_name").as_str()).map_err(decode)?,
        password_hash: row
            .try_get(column("password_hash").as_str())
            .map_err(decode)?,
        avatar: row.try_get(column("avatar").as_str()).map_err(decode)?,
        is_active: is_active != 0,
        created_at: parse_timestamp(&created_at)?,
    })
}
