// ABOUTME: Token login and logout routes
// ABOUTME: Exchanges email/password for a JWT and revokes the presented token on logout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::resources::ServerResources;

/// Body for `POST /api/auth/token/login`
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Account email
    pub email: Option<String>,
    /// Account password
    pub password: Option<String>,
}

/// Successful login
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Token for the `Authorization: Token <auth_token>` header
    pub auth_token: String,
}

/// Authentication routes handler
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all auth routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/token/login", post(Self::handle_login))
            .route("/api/auth/token/logout", post(Self::handle_logout))
            .with_state(resources)
    }

    fn bad_credentials() -> AppError {
        AppError::invalid_field(
            "non_field_errors",
            "Unable to log in with provided credentials.",
        )
    }

    /// Handle POST /api/auth/token/login
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        let email = body
            .email
            .map(|e| e.trim().to_owned())
            .filter(|e| !e.is_empty())
            .ok_or_else(|| AppError::missing_field("email"))?;
        let password = body
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::missing_field("password"))?;

        let Some(user) = resources.database.users().get_by_email(&email).await? else {
            warn!(email = %email, "Login attempt for unknown email");
            return Err(Self::bad_credentials());
        };

        if !resources
            .auth_manager
            .verify_password(&password, &user.password_hash)
            .await?
        {
            warn!(user.id = user.id, "Login attempt with wrong password");
            return Err(Self::bad_credentials());
        }
        if !user.is_active {
            warn!(user.id = user.id, "Login attempt for disabled account");
            return Err(Self::bad_credentials());
        }

        let auth_token = resources.auth_manager.generate_token(&user)?;
        info!(user.id = user.id, "User logged in");

        Ok((StatusCode::OK, Json(LoginResponse { auth_token })).into_response())
    }

    /// Handle POST /api/auth/token/logout
    async fn handle_logout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate(&headers).await?;

        resources
            .database
            .tokens()
            .revoke(&auth.jti, auth.expires_at)
            .await?;

        info!(user.id = auth.user_id, "User logged out");
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
