// ABOUTME: Route handlers for accounts, avatars, and author subscriptions
// ABOUTME: Registration, profile lookup, password change, follow/unfollow, subscription list
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! User routes
//!
//! Registration and profile reads allow anonymous callers; everything that
//! changes state requires a token.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::recipes::RecipeMinifiedResponse;
use super::{paginate, parse_path_id, PageQuery};
use crate::constants::media::AVATARS_DIR;
use crate::errors::{AppError, AppResult};
use crate::media::MediaStore;
use crate::middleware::auth::AuthResult;
use crate::models::{NewUser, User};
use crate::resources::ServerResources;
use crate::services::accounts::{validate_password, RegistrationInput};

// ============================================================================
// Response Types
// ============================================================================

/// Public user representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    /// Email
    pub email: String,
    /// Id
    pub id: i64,
    /// Username
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Whether the caller follows this user
    pub is_subscribed: bool,
    /// Absolute avatar URL
    pub avatar: Option<String>,
}

impl UserResponse {
    /// Render `user` as seen by a caller whose subscription state is known
    #[must_use]
    pub fn new(user: &User, is_subscribed: bool, media: &MediaStore) -> Self {
        Self {
            email: user.email.clone(),
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_subscribed,
            avatar: user.avatar.as_deref().map(|path| media.url_for(path)),
        }
    }
}

/// Body returned by registration
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisteredUserResponse {
    /// Email
    pub email: String,
    /// Id
    pub id: i64,
    /// Username
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
}

impl From<User> for RegisteredUserResponse {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// A followed author with their recipes
#[derive(Debug, Serialize, Deserialize)]
pub struct SubscriptionResponse {
    /// Author fields
    #[serde(flatten)]
    pub user: UserResponse,
    /// Newest recipes, truncated to `recipes_limit`
    pub recipes: Vec<RecipeMinifiedResponse>,
    /// Total number of recipes by the author
    pub recipes_count: i64,
}

/// Body returned by avatar upload
#[derive(Debug, Serialize, Deserialize)]
pub struct AvatarResponse {
    /// Absolute avatar URL
    pub avatar: String,
}

// ============================================================================
// Request Types
// ============================================================================

/// Body for `POST /api/users/set_password`
#[derive(Debug, Deserialize)]
pub struct SetPasswordRequest {
    /// Replacement password
    pub new_password: Option<String>,
    /// Password currently on the account
    pub current_password: Option<String>,
}

/// Body for `PUT /api/users/me/avatar`
#[derive(Debug, Deserialize)]
pub struct AvatarRequest {
    /// Base64 data URI
    pub avatar: Option<String>,
}

/// `recipes_limit` query parameter for subscription responses
#[derive(Debug, Default, Deserialize)]
pub struct RecipesLimitQuery {
    /// Maximum recipes embedded per author
    pub recipes_limit: Option<String>,
}

impl RecipesLimitQuery {
    fn limit(&self) -> AppResult<Option<u32>> {
        match self.recipes_limit.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(|_| {
                AppError::invalid_field("recipes_limit", "A valid non-negative integer is required.")
            }),
        }
    }
}

// ============================================================================
// Routes
// ============================================================================

/// User routes handler
pub struct UserRoutes;

impl UserRoutes {
    /// Create all user routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/users",
                get(Self::handle_list_users).post(Self::handle_register),
            )
            .route("/api/users/me", get(Self::handle_me))
            .route("/api/users/set_password", post(Self::handle_set_password))
            .route(
                "/api/users/me/avatar",
                put(Self::handle_set_avatar).delete(Self::handle_delete_avatar),
            )
            .route("/api/users/subscriptions", get(Self::handle_subscriptions))
            .route("/api/users/:id", get(Self::handle_get_user))
            .route(
                "/api/users/:id/subscribe",
                post(Self::handle_subscribe).delete(Self::handle_unsubscribe),
            )
            .with_state(resources)
    }

    async fn authenticate(
        headers: &HeaderMap,
        resources: &Arc<ServerResources>,
    ) -> AppResult<AuthResult> {
        resources.auth_middleware.authenticate(headers).await
    }

    async fn current_user(resources: &ServerResources, auth: &AuthResult) -> AppResult<User> {
        resources
            .database
            .users()
            .get_by_id(auth.user_id)
            .await?
            .ok_or_else(|| AppError::auth_invalid("Token user no longer exists"))
    }

    async fn find_user(resources: &ServerResources, raw_id: &str) -> AppResult<User> {
        let id = parse_path_id(raw_id, "User")?;
        resources
            .database
            .users()
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {id}")))
    }

    /// Build the subscription view of `author`, who the caller follows
    async fn subscription_response(
        resources: &ServerResources,
        author: &User,
        recipes_count: i64,
        recipes_limit: Option<u32>,
    ) -> AppResult<SubscriptionResponse> {
        let recipes = resources
            .database
            .recipes()
            .summaries_by_author(author.id, recipes_limit)
            .await?;

        Ok(SubscriptionResponse {
            user: UserResponse::new(author, true, &resources.media),
            recipes: recipes
                .iter()
                .map(|r| RecipeMinifiedResponse::new(r, &resources.media))
                .collect(),
            recipes_count,
        })
    }

    /// Handle POST /api/users - Register
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<RegistrationInput>,
    ) -> Result<Response, AppError> {
        let registration = body.validate()?;
        let password_hash = resources
            .auth_manager
            .hash_password(&registration.password)
            .await?;

        let user = resources
            .database
            .users()
            .create(&NewUser {
                email: registration.email,
                username: registration.username,
                first_name: registration.first_name,
                last_name: registration.last_name,
                password_hash,
            })
            .await?;

        info!(user.id = user.id, user.username = %user.username, "User registered");
        Ok((StatusCode::CREATED, Json(RegisteredUserResponse::from(user))).into_response())
    }

    /// Handle GET /api/users - Paginated user list
    async fn handle_list_users(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        uri: Uri,
        Query(page): Query<PageQuery>,
    ) -> Result<Response, AppError> {
        let params = page.into_params()?;
        let viewer = resources
            .auth_middleware
            .authenticate_optional(&headers)
            .await?;

        let (users, count) = resources.database.users().list(&params).await?;

        let ids: Vec<i64> = users.iter().map(|u| u.id).collect();
        let followed = match &viewer {
            Some(auth) => {
                resources
                    .database
                    .follows()
                    .following_among(auth.user_id, &ids)
                    .await?
            }
            None => std::collections::HashSet::new(),
        };

        let results = users
            .iter()
            .map(|u| UserResponse::new(u, followed.contains(&u.id), &resources.media))
            .collect();

        Ok((
            StatusCode::OK,
            Json(paginate(&resources, &uri, &params, results, count)),
        )
            .into_response())
    }

    /// Handle GET /api/users/me - Current user profile
    async fn handle_me(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources).await?;
        let user = Self::current_user(&resources, &auth).await?;

        Ok((
            StatusCode::OK,
            Json(UserResponse::new(&user, false, &resources.media)),
        )
            .into_response())
    }

    /// Handle GET /api/users/:id - Public profile
    async fn handle_get_user(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let viewer = resources
            .auth_middleware
            .authenticate_optional(&headers)
            .await?;
        let user = Self::find_user(&resources, &id).await?;

        let is_subscribed = match &viewer {
            Some(auth) => {
                resources
                    .database
                    .follows()
                    .is_following(auth.user_id, user.id)
                    .await?
            }
            None => false,
        };

        Ok((
            StatusCode::OK,
            Json(UserResponse::new(&user, is_subscribed, &resources.media)),
        )
            .into_response())
    }

    /// Handle POST /api/users/set_password - Change password
    async fn handle_set_password(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<SetPasswordRequest>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources).await?;
        let user = Self::current_user(&resources, &auth).await?;

        let current = body
            .current_password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::missing_field("current_password"))?;
        let new_password = body.new_password.unwrap_or_default();
        validate_password("new_password", &new_password)?;

        if !resources
            .auth_manager
            .verify_password(&current, &user.password_hash)
            .await?
        {
            return Err(AppError::invalid_field("current_password", "Invalid password."));
        }

        let hash = resources.auth_manager.hash_password(&new_password).await?;
        resources
            .database
            .users()
            .update_password(user.id, &hash)
            .await?;

        info!(user.id = user.id, "Password changed");
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle PUT /api/users/me/avatar - Upload avatar
    async fn handle_set_avatar(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<AvatarRequest>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources).await?;

        let data_uri = body
            .avatar
            .filter(|a| !a.trim().is_empty())
            .ok_or_else(|| AppError::missing_field("avatar"))?;
        let path = resources
            .media
            .save_data_uri("avatar", AVATARS_DIR, &data_uri)
            .await?;

        let previous = match resources
            .database
            .users()
            .set_avatar(auth.user_id, Some(&path))
            .await
        {
            Ok(previous) => previous,
            Err(e) => {
                resources.media.delete(&path).await;
                return Err(e);
            }
        };
        if let Some(previous) = previous {
            resources.media.delete(&previous).await;
        }

        Ok((
            StatusCode::OK,
            Json(AvatarResponse {
                avatar: resources.media.url_for(&path),
            }),
        )
            .into_response())
    }

    /// Handle DELETE /api/users/me/avatar - Remove avatar
    async fn handle_delete_avatar(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources).await?;

        if let Some(previous) = resources
            .database
            .users()
            .set_avatar(auth.user_id, None)
            .await?
        {
            resources.media.delete(&previous).await;
        }

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle GET /api/users/subscriptions - Followed authors
    async fn handle_subscriptions(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        uri: Uri,
        Query(page): Query<PageQuery>,
        Query(limit): Query<RecipesLimitQuery>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources).await?;
        let params = page.into_params()?;
        let recipes_limit = limit.limit()?;

        let (authors, count) = resources
            .database
            .follows()
            .list_following(auth.user_id, &params)
            .await?;

        let mut results = Vec::with_capacity(authors.len());
        for (author, recipes_count) in &authors {
            results.push(
                Self::subscription_response(&resources, author, *recipes_count, recipes_limit)
                    .await?,
            );
        }

        Ok((
            StatusCode::OK,
            Json(paginate(&resources, &uri, &params, results, count)),
        )
            .into_response())
    }

    /// Handle POST /api/users/:id/subscribe - Follow an author
    async fn handle_subscribe(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Query(limit): Query<RecipesLimitQuery>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources).await?;
        let author = Self::find_user(&resources, &id).await?;
        let recipes_limit = limit.limit()?;

        if author.id == auth.user_id {
            return Err(AppError::invalid_input("You cannot subscribe to yourself"));
        }
        if !resources
            .database
            .follows()
            .follow(auth.user_id, author.id)
            .await?
        {
            return Err(AppError::invalid_input(format!(
                "You are already subscribed to {}",
                author.username
            )));
        }

        info!(follower.id = auth.user_id, author.id = author.id, "Subscribed");

        let recipes_count = resources
            .database
            .recipes()
            .count_by_author(author.id)
            .await?;
        let response =
            Self::subscription_response(&resources, &author, recipes_count, recipes_limit).await?;

        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle DELETE /api/users/:id/subscribe - Unfollow an author
    async fn handle_unsubscribe(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources).await?;
        let author = Self::find_user(&resources, &id).await?;

        if !resources
            .database
            .follows()
            .unfollow(auth.user_id, author.id)
            .await?
        {
            return Err(AppError::invalid_input(format!(
                "You are not subscribed to {}",
                author.username
            )));
        }

        info!(follower.id = auth.user_id, author.id = author.id, "Unsubscribed");
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
