// ABOUTME: Route module organization for the Foodgram HTTP API
// ABOUTME: One Routes struct per domain plus helpers shared by the handlers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module for the Foodgram server
//!
//! Each domain module holds its response types and thin handlers that
//! authenticate, validate, and delegate to the database managers.

/// Token login and logout
pub mod auth;
/// Ingredient catalog
pub mod ingredients;
/// Recipes, favorites, shopping cart, and the shopping-list download
pub mod recipes;
/// Accounts, avatars, and subscriptions
pub mod users;

pub use auth::AuthRoutes;
pub use ingredients::IngredientRoutes;
pub use recipes::RecipeRoutes;
pub use users::UserRoutes;

use axum::http::Uri;
use serde::Deserialize;

use crate::errors::{AppError, AppResult};
use crate::pagination::{page_link, Page, PageParams};
use crate::resources::ServerResources;

/// Parse a numeric path id; anything else is treated as a missing resource
pub(crate) fn parse_path_id(raw: &str, resource: &str) -> AppResult<i64> {
    raw.parse()
        .map_err(|_| AppError::not_found(format!("{resource} {raw}")))
}

/// `page`/`limit` query parameters, kept as strings for field-level errors
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// 1-based page number
    pub page: Option<String>,
    /// Page size
    pub limit: Option<String>,
}

impl PageQuery {
    /// Parse into `PageParams`; blank values fall back to the defaults
    pub(crate) fn into_params(self) -> AppResult<PageParams> {
        Ok(PageParams {
            page: parse_count("page", self.page.as_deref())?,
            limit: parse_count("limit", self.limit.as_deref())?,
        })
    }
}

fn parse_count(field: &str, value: Option<&str>) -> AppResult<Option<u32>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| AppError::invalid_field(field, "A valid integer is required.")),
    }
}

/// Wrap one page of results with absolute `next`/`previous` links
pub(crate) fn paginate<T>(
    resources: &ServerResources,
    uri: &Uri,
    params: &PageParams,
    results: Vec<T>,
    count: i64,
) -> Page<T> {
    let base = resources.config.public_base_url.as_str();
    Page::new(results, count, params, |page| page_link(base, uri, page))
}

/// Parse an optional boolean query flag (`1`, `0`, `true`, `false`)
pub(crate) fn parse_flag(field: &str, value: Option<&str>) -> AppResult<Option<bool>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some("1" | "true" | "True") => Ok(Some(true)),
        Some("0" | "false" | "False") => Ok(Some(false)),
        Some(other) => Err(AppError::invalid_field(
            field,
            format!("'{other}' is not a valid boolean; use 1 or 0"),
        )),
    }
}
