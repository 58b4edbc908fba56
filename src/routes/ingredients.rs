// ABOUTME: Read-only ingredient catalog routes
// ABOUTME: Case-insensitive prefix search and lookup by id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::parse_path_id;
use crate::errors::AppError;
use crate::models::Ingredient;
use crate::resources::ServerResources;

/// Ingredient representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientResponse {
    /// Id
    pub id: i64,
    /// Name
    pub name: String,
    /// Unit
    pub measurement_unit: String,
}

impl From<Ingredient> for IngredientResponse {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
        }
    }
}

/// Query for `GET /api/ingredients`
#[derive(Debug, Default, Deserialize)]
pub struct IngredientSearchQuery {
    /// Name prefix
    pub name: Option<String>,
}

/// Ingredient routes handler
pub struct IngredientRoutes;

impl IngredientRoutes {
    /// Create all ingredient routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/ingredients", get(Self::handle_search))
            .route("/api/ingredients/:id", get(Self::handle_get))
            .with_state(resources)
    }

    /// Handle GET /api/ingredients - Prefix search, unpaginated
    async fn handle_search(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<IngredientSearchQuery>,
    ) -> Result<Response, AppError> {
        resources
            .auth_middleware
            .authenticate_optional(&headers)
            .await?;

        let prefix = query.name.as_deref().map(str::trim).filter(|p| !p.is_empty());
        let ingredients = resources.database.ingredients().search(prefix).await?;

        let body: Vec<IngredientResponse> =
            ingredients.into_iter().map(IngredientResponse::from).collect();
        Ok((StatusCode::OK, Json(body)).into_response())
    }

    /// Handle GET /api/ingredients/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        resources
            .auth_middleware
            .authenticate_optional(&headers)
            .await?;

        let id = parse_path_id(&id, "Ingredient")?;
        let ingredient = resources
            .database
            .ingredients()
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Ingredient {id}")))?;

        Ok((StatusCode::OK, Json(IngredientResponse::from(ingredient))).into_response())
    }
}
