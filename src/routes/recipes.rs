// ABOUTME: Recipe routes: CRUD, favorites, shopping cart, short links, shopping-list download
// ABOUTME: Handlers authenticate, validate through services, and delegate to the database managers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Recipe routes
//!
//! Reads are public; writes require a token and recipe mutation is limited
//! to the author. Favorites and the shopping cart share one pair of
//! handlers parameterized by [`RelationKind`].

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::users::UserResponse;
use super::{paginate, parse_flag, parse_path_id, PageQuery};
use crate::constants::media::RECIPE_IMAGES_DIR;
use crate::constants::shopping_list::FILE_NAME;
use crate::errors::{AppError, AppResult};
use crate::media::MediaStore;
use crate::models::{
    NewRecipe, Recipe, RecipeChanges, RecipeFilter, RecipeIngredient, RecipeSummary, RecipeView,
    RelationKind,
};
use crate::resources::ServerResources;
use crate::services::recipes::{DraftMode, RecipeDraft, RecipeInput};
use crate::services::shopping_list;

// ============================================================================
// Response Types
// ============================================================================

/// Ingredient line inside a recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeIngredientResponse {
    /// Ingredient id
    pub id: i64,
    /// Name
    pub name: String,
    /// Unit
    pub measurement_unit: String,
    /// Quantity
    pub amount: i64,
}

impl From<RecipeIngredient> for RecipeIngredientResponse {
    fn from(line: RecipeIngredient) -> Self {
        Self {
            id: line.id,
            name: line.name,
            measurement_unit: line.measurement_unit,
            amount: line.amount,
        }
    }
}

/// Full recipe representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeResponse {
    /// Id
    pub id: i64,
    /// Author as seen by the caller
    pub author: UserResponse,
    /// Ingredients with amounts
    pub ingredients: Vec<RecipeIngredientResponse>,
    /// Whether the caller favorited the recipe
    pub is_favorited: bool,
    /// Whether the recipe is in the caller's cart
    pub is_in_shopping_cart: bool,
    /// Title
    pub name: String,
    /// Absolute image URL
    pub image: String,
    /// Description
    pub text: String,
    /// Minutes
    pub cooking_time: i64,
}

impl RecipeResponse {
    /// Render a recipe view
    #[must_use]
    pub fn new(view: RecipeView, media: &MediaStore) -> Self {
        Self {
            id: view.recipe.id,
            author: UserResponse::new(&view.author, view.author_is_subscribed, media),
            ingredients: view
                .ingredients
                .into_iter()
                .map(RecipeIngredientResponse::from)
                .collect(),
            is_favorited: view.is_favorited,
            is_in_shopping_cart: view.is_in_shopping_cart,
            image: media.url_for(&view.recipe.image),
            name: view.recipe.name,
            text: view.recipe.text,
            cooking_time: view.recipe.cooking_time,
        }
    }
}

/// Minified recipe representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeMinifiedResponse {
    /// Id
    pub id: i64,
    /// Title
    pub name: String,
    /// Absolute image URL
    pub image: String,
    /// Minutes
    pub cooking_time: i64,
}

impl RecipeMinifiedResponse {
    /// Render a summary
    #[must_use]
    pub fn new(summary: &RecipeSummary, media: &MediaStore) -> Self {
        Self {
            id: summary.id,
            name: summary.name.clone(),
            image: media.url_for(&summary.image),
            cooking_time: summary.cooking_time,
        }
    }
}

/// Body of `GET /api/recipes/:id/get-link`
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortLinkResponse {
    /// Public URL of the recipe page
    #[serde(rename = "short-link")]
    pub short_link: String,
}

/// Filters for `GET /api/recipes`, kept as strings for field-level errors
#[derive(Debug, Default, Deserialize)]
pub struct RecipeListQuery {
    /// Author id
    pub author: Option<String>,
    /// `1`/`0` favorites filter
    pub is_favorited: Option<String>,
    /// `1`/`0` shopping cart filter
    pub is_in_shopping_cart: Option<String>,
}

impl RecipeListQuery {
    /// Parse into a filter; `0` and anonymous callers leave relation flags off
    fn into_filter(self, authenticated: bool) -> AppResult<RecipeFilter> {
        let author = match self.author.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse().map_err(|_| {
                AppError::invalid_field("author", "A valid integer is required.")
            })?),
        };
        let is_favorited = parse_flag("is_favorited", self.is_favorited.as_deref())?;
        let is_in_shopping_cart =
            parse_flag("is_in_shopping_cart", self.is_in_shopping_cart.as_deref())?;

        Ok(RecipeFilter {
            author,
            favorited_only: authenticated && is_favorited.unwrap_or(false),
            in_shopping_cart_only: authenticated && is_in_shopping_cart.unwrap_or(false),
        })
    }
}

// ============================================================================
// Routes
// ============================================================================

/// Recipe routes handler
pub struct RecipeRoutes;

impl RecipeRoutes {
    /// Create all recipe routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/recipes",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/recipes/download_shopping_cart",
                get(Self::handle_download_shopping_cart),
            )
            .route("/api/recipes/favorites", get(Self::handle_list_favorites))
            .route(
                "/api/recipes/shopping_cart",
                get(Self::handle_list_shopping_cart),
            )
            .route(
                "/api/recipes/:id",
                get(Self::handle_get)
                    .patch(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .route("/api/recipes/:id/get-link", get(Self::handle_get_link))
            .route(
                "/api/recipes/:id/favorite",
                post(Self::handle_add_favorite)
                    .delete(Self::handle_remove_favorite),
            )
            .route(
                "/api/recipes/:id/shopping_cart",
                post(Self::handle_add_to_cart).delete(Self::handle_remove_from_cart),
            )
            .with_state(resources)
    }

    async fn find_recipe(resources: &ServerResources, raw_id: &str) -> AppResult<Recipe> {
        let id = parse_path_id(raw_id, "Recipe")?;
        resources
            .database
            .recipes()
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Recipe {id}")))
    }

    async fn view_response(
        resources: &ServerResources,
        recipe_id: i64,
        viewer: Option<i64>,
    ) -> AppResult<RecipeResponse> {
        let view = resources
            .database
            .recipes()
            .get_view(recipe_id, viewer)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Recipe {recipe_id}")))?;
        Ok(RecipeResponse::new(view, &resources.media))
    }

    /// Reject drafts that reference ingredients missing from the catalog
    async fn ensure_ingredients_exist(
        resources: &ServerResources,
        draft: &RecipeDraft,
    ) -> AppResult<()> {
        let missing = resources
            .database
            .ingredients()
            .find_missing(&draft.ingredient_ids())
            .await?;
        if missing.is_empty() {
            return Ok(());
        }

        let ids: Vec<String> = missing.iter().map(ToString::to_string).collect();
        Err(AppError::invalid_field(
            "ingredients",
            format!("Ingredients do not exist: {}", ids.join(", ")),
        ))
    }

    /// Handle GET /api/recipes - Filtered, paginated list
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        uri: Uri,
        Query(page): Query<PageQuery>,
        Query(query): Query<RecipeListQuery>,
    ) -> Result<Response, AppError> {
        let params = page.into_params()?;
        let viewer = resources
            .auth_middleware
            .authenticate_optional(&headers)
            .await?
            .map(|auth| auth.user_id);
        let filter = query.into_filter(viewer.is_some())?;

        let (views, count) = resources
            .database
            .recipes()
            .list(viewer, &filter, &params)
            .await?;
        let results = views
            .into_iter()
            .map(|v| RecipeResponse::new(v, &resources.media))
            .collect();

        Ok((
            StatusCode::OK,
            Json(paginate(&resources, &uri, &params, results, count)),
        )
            .into_response())
    }

    /// Handle GET /api/recipes/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let viewer = resources
            .auth_middleware
            .authenticate_optional(&headers)
            .await?
            .map(|auth| auth.user_id);
        let id = parse_path_id(&id, "Recipe")?;

        let response = Self::view_response(&resources, id, viewer).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/recipes - Publish a recipe
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<RecipeInput>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate(&headers).await?;

        let draft = body.validate(DraftMode::Create)?;
        Self::ensure_ingredients_exist(&resources, &draft).await?;

        let (Some(name), Some(data_uri), Some(text), Some(cooking_time)) =
            (draft.name, draft.image, draft.text, draft.cooking_time)
        else {
            return Err(AppError::internal("Validated recipe draft is incomplete"));
        };

        let image = resources
            .media
            .save_data_uri("image", RECIPE_IMAGES_DIR, &data_uri)
            .await?;

        let new_recipe = NewRecipe {
            name,
            image,
            text,
            cooking_time,
            ingredients: draft.ingredients,
        };
        let recipe_id = match resources
            .database
            .recipes()
            .create(auth.user_id, &new_recipe)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                resources.media.delete(&new_recipe.image).await;
                return Err(e);
            }
        };

        info!(recipe.id = recipe_id, author.id = auth.user_id, "Recipe created");

        let response = Self::view_response(&resources, recipe_id, Some(auth.user_id)).await?;
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle PATCH /api/recipes/:id - Author-only update
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<RecipeInput>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate(&headers).await?;
        let recipe = Self::find_recipe(&resources, &id).await?;
        if recipe.author_id != auth.user_id {
            return Err(AppError::permission_denied(
                "Only the author can change this recipe",
            ));
        }

        let draft = body.validate(DraftMode::Update)?;
        Self::ensure_ingredients_exist(&resources, &draft).await?;

        let new_image = match draft.image.as_deref() {
            Some(data_uri) => Some(
                resources
                    .media
                    .save_data_uri("image", RECIPE_IMAGES_DIR, data_uri)
                    .await?,
            ),
            None => None,
        };

        let changes = RecipeChanges {
            name: draft.name,
            image: new_image.clone(),
            text: draft.text,
            cooking_time: draft.cooking_time,
            ingredients: draft.ingredients,
        };
        if let Err(e) = resources.database.recipes().update(recipe.id, &changes).await {
            if let Some(path) = &new_image {
                resources.media.delete(path).await;
            }
            return Err(e);
        }
        if new_image.is_some() {
            resources.media.delete(&recipe.image).await;
        }

        info!(recipe.id = recipe.id, author.id = auth.user_id, "Recipe updated");

        let response = Self::view_response(&resources, recipe.id, Some(auth.user_id)).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle DELETE /api/recipes/:id - Author-only delete
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate(&headers).await?;
        let recipe = Self::find_recipe(&resources, &id).await?;
        if recipe.author_id != auth.user_id {
            return Err(AppError::permission_denied(
                "Only the author can delete this recipe",
            ));
        }

        if let Some(deleted) = resources.database.recipes().delete(recipe.id).await? {
            resources.media.delete(&deleted.image).await;
        }

        info!(recipe.id = recipe.id, author.id = auth.user_id, "Recipe deleted");
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle GET /api/recipes/:id/get-link
    async fn handle_get_link(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        resources
            .auth_middleware
            .authenticate_optional(&headers)
            .await?;
        let recipe = Self::find_recipe(&resources, &id).await?;

        let base = resources.config.public_base_url.trim_end_matches('/');
        let body = ShortLinkResponse {
            short_link: format!("{base}/recipes/{}", recipe.id),
        };
        Ok((StatusCode::OK, Json(body)).into_response())
    }

    // ------------------------------------------------------------------------
    // Favorites and shopping cart
    // ------------------------------------------------------------------------

    async fn add_relation(
        resources: &ServerResources,
        headers: &HeaderMap,
        raw_id: &str,
        kind: RelationKind,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate(headers).await?;
        let recipe = Self::find_recipe(resources, raw_id).await?;

        if !resources
            .database
            .relations()
            .add(kind, auth.user_id, recipe.id)
            .await?
        {
            return Err(AppError::invalid_input(format!(
                "Recipe '{}' is already in {kind}",
                recipe.name
            )));
        }

        info!(user.id = auth.user_id, recipe.id = recipe.id, list = %kind, "Recipe added");
        let body = RecipeMinifiedResponse::new(&RecipeSummary::from(&recipe), &resources.media);
        Ok((StatusCode::CREATED, Json(body)).into_response())
    }

    async fn remove_relation(
        resources: &ServerResources,
        headers: &HeaderMap,
        raw_id: &str,
        kind: RelationKind,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate(headers).await?;
        let recipe = Self::find_recipe(resources, raw_id).await?;

        if !resources
            .database
            .relations()
            .remove(kind, auth.user_id, recipe.id)
            .await?
        {
            return Err(AppError::invalid_input(format!(
                "Recipe '{}' is not in {kind}",
                recipe.name
            )));
        }

        info!(user.id = auth.user_id, recipe.id = recipe.id, list = %kind, "Recipe removed");
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    async fn list_relation(
        resources: &ServerResources,
        headers: &HeaderMap,
        uri: &Uri,
        page: PageQuery,
        kind: RelationKind,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate(headers).await?;
        let params = page.into_params()?;

        let (summaries, count) = resources
            .database
            .relations()
            .list(kind, auth.user_id, &params)
            .await?;
        let results = summaries
            .iter()
            .map(|s| RecipeMinifiedResponse::new(s, &resources.media))
            .collect();

        Ok((
            StatusCode::OK,
            Json(paginate(resources, uri, &params, results, count)),
        )
            .into_response())
    }

    /// Handle POST /api/recipes/:id/favorite
    async fn handle_add_favorite(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::add_relation(&resources, &headers, &id, RelationKind::Favorite).await
    }

    /// Handle DELETE /api/recipes/:id/favorite
    async fn handle_remove_favorite(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::remove_relation(&resources, &headers, &id, RelationKind::Favorite).await
    }

    /// Handle POST /api/recipes/:id/shopping_cart
    async fn handle_add_to_cart(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::add_relation(&resources, &headers, &id, RelationKind::ShoppingCart).await
    }

    /// Handle DELETE /api/recipes/:id/shopping_cart
    async fn handle_remove_from_cart(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::remove_relation(&resources, &headers, &id, RelationKind::ShoppingCart).await
    }

    /// Handle GET /api/recipes/favorites
    async fn handle_list_favorites(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        uri: Uri,
        Query(page): Query<PageQuery>,
    ) -> Result<Response, AppError> {
        Self::list_relation(&resources, &headers, &uri, page, RelationKind::Favorite).await
    }

    /// Handle GET /api/recipes/shopping_cart
    async fn handle_list_shopping_cart(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        uri: Uri,
        Query(page): Query<PageQuery>,
    ) -> Result<Response, AppError> {
        Self::list_relation(&resources, &headers, &uri, page, RelationKind::ShoppingCart).await
    }

    /// Handle GET /api/recipes/download_shopping_cart - Plain-text report
    async fn handle_download_shopping_cart(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate(&headers).await?;

        let lines = resources
            .database
            .recipes()
            .cart_ingredients(auth.user_id)
            .await?;
        let report = shopping_list::build_report(lines)?;

        info!(user.id = auth.user_id, bytes = report.len(), "Shopping list downloaded");
        Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_owned()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{FILE_NAME}\""),
                ),
            ],
            report,
        )
            .into_response())
    }
}
