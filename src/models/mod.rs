// ABOUTME: Domain models for users, ingredients, and recipes
// ABOUTME: Plain data carried between database managers, services, and routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Ingredients, recipes, and their relations
pub mod recipe;
/// User accounts
pub mod user;

pub use recipe::{
    Ingredient, IngredientAmount, NewIngredient, NewRecipe, Recipe, RecipeChanges, RecipeFilter,
    RecipeIngredient, RecipeSummary, RecipeView, RelationKind,
};
pub use user::{NewUser, User};
