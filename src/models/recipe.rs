// ABOUTME: Ingredient and recipe models plus the favorite/shopping-cart relation kinds
// ABOUTME: RecipeView is a recipe joined with its author, ingredients, and viewer flags
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::User;

/// Catalog ingredient
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ingredient {
    /// Database-assigned identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// Unit the amounts are expressed in
    pub measurement_unit: String,
}

/// Ingredient to add to the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewIngredient {
    /// Display name
    pub name: String,
    /// Unit the amounts are expressed in
    pub measurement_unit: String,
}

/// An ingredient as used by a particular recipe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeIngredient {
    /// Ingredient identifier
    pub id: i64,
    /// Ingredient name
    pub name: String,
    /// Ingredient unit
    pub measurement_unit: String,
    /// Quantity in `measurement_unit`
    pub amount: i64,
}

/// Ingredient reference with quantity, as submitted by clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngredientAmount {
    /// Catalog ingredient id
    pub ingredient_id: i64,
    /// Quantity
    pub amount: i64,
}

/// Stored recipe row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    /// Database-assigned identifier
    pub id: i64,
    /// Owning user
    pub author_id: i64,
    /// Title
    pub name: String,
    /// Image path relative to the media root
    pub image: String,
    /// Description and instructions
    pub text: String,
    /// Minutes
    pub cooking_time: i64,
    /// Publication time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

/// Minified recipe used in relation and subscription responses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeSummary {
    /// Recipe id
    pub id: i64,
    /// Title
    pub name: String,
    /// Image path relative to the media root
    pub image: String,
    /// Minutes
    pub cooking_time: i64,
}

impl From<&Recipe> for RecipeSummary {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            image: recipe.image.clone(),
            cooking_time: recipe.cooking_time,
        }
    }
}

/// A recipe as seen by a particular viewer
#[derive(Debug, Clone)]
pub struct RecipeView {
    /// The recipe itself
    pub recipe: Recipe,
    /// Its author
    pub author: User,
    /// Whether the viewer follows the author
    pub author_is_subscribed: bool,
    /// Ingredient list with amounts
    pub ingredients: Vec<RecipeIngredient>,
    /// Whether the viewer favorited the recipe
    pub is_favorited: bool,
    /// Whether the recipe is in the viewer's cart
    pub is_in_shopping_cart: bool,
}

/// Validated recipe ready to insert
#[derive(Debug, Clone)]
pub struct NewRecipe {
    /// Title
    pub name: String,
    /// Image path relative to the media root
    pub image: String,
    /// Description
    pub text: String,
    /// Minutes
    pub cooking_time: i64,
    /// Ingredients with quantities
    pub ingredients: Vec<IngredientAmount>,
}

/// Validated partial update; `ingredients` always replaces the full set
#[derive(Debug, Clone, Default)]
pub struct RecipeChanges {
    /// New title
    pub name: Option<String>,
    /// New image path
    pub image: Option<String>,
    /// New description
    pub text: Option<String>,
    /// New cooking time
    pub cooking_time: Option<i64>,
    /// Replacement ingredient set
    pub ingredients: Vec<IngredientAmount>,
}

/// Filters accepted by the recipe list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    /// Only recipes by this author
    pub author: Option<i64>,
    /// Only recipes the viewer favorited
    pub favorited_only: bool,
    /// Only recipes in the viewer's cart
    pub in_shopping_cart_only: bool,
}

/// User-to-recipe relation sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// Bookmarked recipes
    Favorite,
    /// Recipes queued for shopping
    ShoppingCart,
}

impl RelationKind {
    /// Backing table
    #[must_use]
    pub const fn table(&self) -> &'static str {
        match self {
            Self::Favorite => "favorites",
            Self::ShoppingCart => "shopping_cart",
        }
    }

    /// Human-readable list name for error messages
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Favorite => "favorites",
            Self::ShoppingCart => "shopping cart",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
