// ABOUTME: Ingredient catalog persistence with Unicode-aware prefix search
// ABOUTME: A lowercased name column backs case-insensitive search for non-ASCII names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashSet;

use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use super::escape_like;
use crate::errors::{AppError, AppResult};
use crate::models::{Ingredient, NewIngredient};

/// Ingredient catalog database operations manager
pub struct IngredientsManager {
    pool: SqlitePool,
}

impl IngredientsManager {
    /// Create a new ingredients manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Ingredients whose name starts with `prefix`, ignoring case; all when `None`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn search(&self, prefix: Option<&str>) -> AppResult<Vec<Ingredient>> {
        let pattern = format!(
            "{}%",
            escape_like(&prefix.unwrap_or_default().to_lowercase())
        );

        let rows = sqlx::query(
            r"
            SELECT id, name, measurement_unit
            FROM ingredients
            WHERE name_lower LIKE $1 ESCAPE '\'
            ORDER BY name_lower, measurement_unit, id
            ",
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to search ingredients: {e}")))?;

        rows.iter().map(Self::row_to_ingredient).collect()
    }

    /// Get an ingredient by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get(&self, id: i64) -> AppResult<Option<Ingredient>> {
        let row = sqlx::query("SELECT id, name, measurement_unit FROM ingredients WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get ingredient: {e}")))?;

        row.map(|r| Self::row_to_ingredient(&r)).transpose()
    }

    /// The subset of `ids` that is not in the catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn find_missing(&self, ids: &[i64]) -> AppResult<Vec<i64>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT id FROM ingredients WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let found: HashSet<i64> = builder
            .build_query_scalar::<i64>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to look up ingredients: {e}")))?
            .into_iter()
            .collect();

        Ok(ids.iter().copied().filter(|id| !found.contains(id)).collect())
    }

    /// Insert unless an ingredient with the same name and unit exists
    ///
    /// Returns `true` when a row was created.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn create_if_missing(&self, ingredient: &NewIngredient) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            INSERT INTO ingredients (name, name_lower, measurement_unit)
            VALUES ($1, $2, $3)
            ON CONFLICT (name, measurement_unit) DO NOTHING
            ",
        )
        .bind(ingredient.name.trim())
        .bind(ingredient.name.trim().to_lowercase())
        .bind(ingredient.measurement_unit.trim())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create ingredient: {e}")))?;

        Ok(result.rows_affected() == 1)
    }

    /// Bulk-load ingredients in one transaction, returning how many were new
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails; nothing is committed in that case
    pub async fn load(&self, ingredients: &[NewIngredient]) -> AppResult<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let mut created = 0;
        for ingredient in ingredients {
            let result = sqlx::query(
                r"
                INSERT INTO ingredients (name, name_lower, measurement_unit)
                VALUES ($1, $2, $3)
                ON CONFLICT (name, measurement_unit) DO NOTHING
                ",
            )
            .bind(ingredient.name.trim())
            .bind(ingredient.name.trim().to_lowercase())
            .bind(ingredient.measurement_unit.trim())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::database(format!(
                    "Failed to load ingredient '{}': {e}",
                    ingredient.name
                ))
            })?;
            created += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit ingredients: {e}")))?;

        Ok(created)
    }

    fn row_to_ingredient(row: &SqliteRow) -> AppResult<Ingredient> {
        let decode =
            |e: sqlx::Error| AppError::database(format!("Failed to decode ingredient row: {e}"));

        Ok(Ingredient {
            id: row.try_get("id").map_err(decode)?,
            name: row.try_get("name").map_err(decode)?,
            measurement_unit: row.try_get("measurement_unit").map_err(decode)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::database::test_support::create_test_db;
    use crate::models::NewIngredient;

    fn ingredient(name: &str, unit: &str) -> NewIngredient {
        NewIngredient {
            name: name.to_owned(),
            measurement_unit: unit.to_owned(),
        }
    }

    #[tokio::test]
    async fn test_cyrillic_prefix_search_ignores_case() {
        let db = create_test_db().await;
        let created = db
            .ingredients()
            .load(&[
                ingredient("Мука", "г"),
                ingredient("мускатный орех", "г"),
                ingredient("Сахар", "г"),
            ])
            .await
            .unwrap();
        assert_eq!(created, 3);

        let found = db.ingredients().search(Some("МУ")).await.unwrap();
        let names: Vec<_> = found.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Мука", "мускатный орех"]);

        assert_eq!(db.ingredients().search(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_load_skips_existing_pairs() {
        let db = create_test_db().await;
        db.ingredients()
            .load(&[ingredient("Соль", "г")])
            .await
            .unwrap();

        let created = db
            .ingredients()
            .load(&[ingredient("Соль", "г"), ingredient("Соль", "щепотка")])
            .await
            .unwrap();
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn test_like_wildcards_are_literal() {
        let db = create_test_db().await;
        db.ingredients()
            .load(&[ingredient("100% сок", "мл"), ingredient("1000 островов", "г")])
            .await
            .unwrap();

        let found = db.ingredients().search(Some("100%")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "100% сок");
    }

    #[tokio::test]
    async fn test_find_missing() {
        let db = create_test_db().await;
        db.ingredients()
            .load(&[ingredient("Мука", "г")])
            .await
            .unwrap();
        let id = db.ingredients().search(Some("мука")).await.unwrap()[0].id;

        let missing = db.ingredients().find_missing(&[id, id + 100]).await.unwrap();
        assert_eq!(missing, vec![id + 100]);
    }
}
