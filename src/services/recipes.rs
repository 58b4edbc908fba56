// ABOUTME: Recipe payload parsing and validation for create and partial update
// ABOUTME: Enforces non-empty unique ingredient sets and bounded amounts/cooking time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;

use super::FieldErrors;
use crate::constants::limits::{MAX_AMOUNT, MIN_AMOUNT, RECIPE_NAME_MAX_LEN};
use crate::errors::AppResult;
use crate::models::IngredientAmount;

/// Ingredient entry as submitted: `{"id": 1, "amount": 10}`
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientInput {
    /// Catalog ingredient id
    pub id: Option<Value>,
    /// Quantity
    pub amount: Option<Value>,
}

/// Recipe body for `POST` and `PATCH`
///
/// Numbers are kept as raw JSON so that validation can report a
/// field-level message instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeInput {
    /// Ingredients with quantities
    pub ingredients: Option<Vec<IngredientInput>>,
    /// Base64 data URI
    pub image: Option<String>,
    /// Title
    pub name: Option<String>,
    /// Description
    pub text: Option<String>,
    /// Minutes
    pub cooking_time: Option<Value>,
}

/// Whether absent fields are acceptable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftMode {
    /// Every field is required
    Create,
    /// Only `ingredients` is required
    Update,
}

/// Validated recipe body; `image` is still the undecoded data URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    /// Title
    pub name: Option<String>,
    /// Data URI to store
    pub image: Option<String>,
    /// Description
    pub text: Option<String>,
    /// Minutes
    pub cooking_time: Option<i64>,
    /// Non-empty, duplicate-free ingredient list
    pub ingredients: Vec<IngredientAmount>,
}

impl RecipeDraft {
    /// Ids referenced by the draft, for the catalog existence check
    #[must_use]
    pub fn ingredient_ids(&self) -> Vec<i64> {
        self.ingredients.iter().map(|i| i.ingredient_id).collect()
    }
}

impl RecipeInput {
    /// Validate every field, reporting all failures at once
    ///
    /// # Errors
    ///
    /// Returns an `InvalidInput` error whose details name each bad field
    pub fn validate(self, mode: DraftMode) -> AppResult<RecipeDraft> {
        let mut errors = FieldErrors::new();
        let required = mode == DraftMode::Create;

        let ingredients = validate_ingredients(self.ingredients, &mut errors);

        let name = self.name.map(|n| n.trim().to_owned());
        match &name {
            None if required => errors.required("name"),
            Some(n) if n.is_empty() => errors.add("name", "This field may not be blank."),
            Some(n) if n.chars().count() > RECIPE_NAME_MAX_LEN => errors.add(
                "name",
                format!("Ensure this field has no more than {RECIPE_NAME_MAX_LEN} characters."),
            ),
            _ => {}
        }

        match &self.text {
            None if required => errors.required("text"),
            Some(t) if t.trim().is_empty() => errors.add("text", "This field may not be blank."),
            _ => {}
        }

        match &self.image {
            None if required => errors.required("image"),
            Some(i) if i.trim().is_empty() => errors.add("image", "No file was submitted."),
            _ => {}
        }

        let cooking_time = match self.cooking_time {
            None | Some(Value::Null) => {
                if required {
                    errors.required("cooking_time");
                }
                None
            }
            Some(value) => bounded_integer(&value, "cooking_time", &mut errors),
        };

        errors.finish(RecipeDraft {
            name,
            image: self.image,
            text: self.text,
            cooking_time,
            ingredients,
        })
    }
}

fn validate_ingredients(
    input: Option<Vec<IngredientInput>>,
    errors: &mut FieldErrors,
) -> Vec<IngredientAmount> {
    let Some(input) = input else {
        errors.required("ingredients");
        return Vec::new();
    };
    if input.is_empty() {
        errors.add("ingredients", "At least one ingredient is required.");
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut validated = Vec::with_capacity(input.len());
    for item in input {
        let Some(id) = item.id.as_ref().and_then(parse_integer) else {
            errors.add("ingredients", "Each ingredient needs an integer id.");
            continue;
        };
        if !seen.insert(id) {
            errors.add("ingredients", format!("Ingredient {id} is listed more than once."));
            continue;
        }
        let Some(amount) = item.amount.as_ref().and_then(parse_integer) else {
            errors.add("ingredients", format!("Ingredient {id} needs an integer amount."));
            continue;
        };
        if !(MIN_AMOUNT..=MAX_AMOUNT).contains(&amount) {
            errors.add(
                "ingredients",
                format!("Amount for ingredient {id} must be between {MIN_AMOUNT} and {MAX_AMOUNT}."),
            );
            continue;
        }
        validated.push(IngredientAmount {
            ingredient_id: id,
            amount,
        });
    }
    validated
}

fn bounded_integer(value: &Value, field: &str, errors: &mut FieldErrors) -> Option<i64> {
    let Some(number) = parse_integer(value) else {
        errors.add(field, "A valid integer is required.");
        return None;
    };
    if number < MIN_AMOUNT {
        errors.add(field, format!("Ensure this value is greater than or equal to {MIN_AMOUNT}."));
        return None;
    }
    if number > MAX_AMOUNT {
        errors.add(field, format!("Ensure this value is less than or equal to {MAX_AMOUNT}."));
        return None;
    }
    Some(number)
}

/// Accept JSON integers and integer strings (`"10"`), as HTML forms send them
fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
