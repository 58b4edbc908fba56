// ABOUTME: Request authentication from the Authorization header
// ABOUTME: Accepts "Token <jwt>" and "Bearer <jwt>", checks revocation and account status
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::{DateTime, Utc};

use crate::auth::AuthManager;
use crate::database::Database;
use crate::errors::{AppError, AppResult};

/// Authenticated caller
#[derive(Debug, Clone)]
pub struct AuthResult {
    /// Authenticated user id
    pub user_id: i64,
    /// Id of the presented token
    pub jti: String,
    /// When the presented token expires
    pub expires_at: DateTime<Utc>,
}

/// Resolves `Authorization` headers into an [`AuthResult`]
#[derive(Clone)]
pub struct AuthMiddleware {
    auth_manager: AuthManager,
    database: Database,
}

impl AuthMiddleware {
    /// Create new auth middleware
    #[must_use]
    pub const fn new(auth_manager: AuthManager, database: Database) -> Self {
        Self {
            auth_manager,
            database,
        }
    }

    /// Require an authenticated caller
    ///
    /// # Errors
    ///
    /// Returns 401 when the header is missing, malformed, expired, revoked,
    /// or names an unknown or inactive user
    #[tracing::instrument(skip(self, headers), fields(user_id = tracing::field::Empty))]
    pub async fn authenticate(&self, headers: &HeaderMap) -> AppResult<AuthResult> {
        self.authenticate_optional(headers)
            .await?
            .ok_or_else(AppError::auth_required)
    }

    /// Resolve the caller if a token is present
    ///
    /// An absent header yields `None`; a present but bad token is an error
    /// even on endpoints that allow anonymous access.
    ///
    /// # Errors
    ///
    /// Returns 401 when a presented token fails validation
    pub async fn authenticate_optional(&self, headers: &HeaderMap) -> AppResult<Option<AuthResult>> {
        let Some(header) = headers.get(AUTHORIZATION) else {
            return Ok(None);
        };

        let header = header
            .to_str()
            .map_err(|_| AppError::auth_invalid("Authorization header is not valid ASCII"))?;
        let token = extract_token(header).ok_or_else(|| {
            tracing::debug!("Rejected authorization header with unknown scheme");
            AppError::auth_invalid(
                "Invalid authorization header format - must be 'Token <token>' or 'Bearer <token>'",
            )
        })?;

        let result = self.authenticate_token(token).await;
        match &result {
            Ok(auth) => {
                tracing::Span::current().record("user_id", auth.user_id);
            }
            Err(e) => tracing::warn!("Token authentication failed: {}", e.message),
        }
        result.map(Some)
    }

    async fn authenticate_token(&self, token: &str) -> AppResult<AuthResult> {
        let claims = self.auth_manager.validate_token(token)?;

        if self.database.tokens().is_revoked(&claims.jti).await? {
            return Err(AppError::auth_expired("Token has been revoked"));
        }

        let user_id = claims.user_id()?;
        let user = self
            .database
            .users()
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::auth_invalid("Token user no longer exists"))?;

        if !user.is_active {
            return Err(AppError::auth_invalid("User account is disabled"));
        }

        Ok(AuthResult {
            user_id,
            expires_at: claims.expires_at(),
            jti: claims.jti,
        })
    }
}

/// Strip the `Token` or `Bearer` scheme (case-insensitive) from a header value
fn extract_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    (scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer")).then_some(token)
}
