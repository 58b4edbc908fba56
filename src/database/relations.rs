// ABOUTME: Favorites and shopping-cart persistence keyed by RelationKind
// ABOUTME: Inserts are conflict-tolerant so duplicates are detected from the affected-row count
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::Utc;
use sqlx::SqlitePool;

use super::format_timestamp;
use super::recipes::row_to_summary;
use crate::errors::{AppError, AppResult};
use crate::models::{RecipeSummary, RelationKind};
use crate::pagination::PageParams;

/// User-to-recipe relation database operations manager
pub struct RelationsManager {
    pool: SqlitePool,
}

impl RelationsManager {
    /// Create a new relations manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Add a recipe to the user's set; `false` if it was already there
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn add(&self, kind: RelationKind, user_id: i64, recipe_id: i64) -> AppResult<bool> {
        let result = sqlx::query(&format!(
            "INSERT INTO {} (user_id, recipe_id, created_at) VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
            kind.table()
        ))
        .bind(user_id)
        .bind(recipe_id)
        .bind(format_timestamp(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to add to {kind}: {e}")))?;

        Ok(result.rows_affected() == 1)
    }

    /// Remove a recipe from the user's set; `false` if it was not there
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn remove(
        &self,
        kind: RelationKind,
        user_id: i64,
        recipe_id: i64,
    ) -> AppResult<bool> {
        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE user_id = $1 AND recipe_id = $2",
            kind.table()
        ))
        .bind(user_id)
        .bind(recipe_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to remove from {kind}: {e}")))?;

        Ok(result.rows_affected() == 1)
    }

    /// One page of the user's set, most recently added first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list(
        &self,
        kind: RelationKind,
        user_id: i64,
        params: &PageParams,
    ) -> AppResult<(Vec<RecipeSummary>, i64)> {
        let table = kind.table();
        let rows = sqlx::query(&format!(
            r"
            SELECT r.id, r.name, r.image, r.cooking_time
            FROM {table} rel
            JOIN recipes r ON r.id = rel.recipe_id
            WHERE rel.user_id = $1
            ORDER BY rel.created_at DESC, r.id DESC
            LIMIT $2 OFFSET $3
            "
        ))
        .bind(user_id)
        .bind(i64::from(params.limit()))
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list {kind}: {e}")))?;

        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {table} WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count {kind}: {e}")))?;

        let recipes = rows
            .iter()
            .map(row_to_summary)
            .collect::<AppResult<Vec<_>>>()?;

        Ok((recipes, count))
    }
}

#[cfg(test)]
mod tests {
    use crate::database::test_support::{create_ingredient, create_test_db, create_user};
    use crate::models::{IngredientAmount, NewRecipe, RelationKind};
    use crate::pagination::PageParams;

    #[tokio::test]
    async fn test_add_and_remove_are_set_operations() {
        let db = create_test_db().await;
        let user = create_user(&db, "cook").await;
        let salt = create_ingredient(&db, "Соль", "г").await;
        let recipe = db
            .recipes()
            .create(
                user,
                &NewRecipe {
                    name: "Суп".to_owned(),
                    image: "recipes/images/soup.png".to_owned(),
                    text: "Boil".to_owned(),
                    cooking_time: 40,
                    ingredients: vec![IngredientAmount {
                        ingredient_id: salt,
                        amount: 3,
                    }],
                },
            )
            .await
            .unwrap();

        let relations = db.relations();
        assert!(relations.add(RelationKind::Favorite, user, recipe).await.unwrap());
        assert!(!relations.add(RelationKind::Favorite, user, recipe).await.unwrap());

        let (page, count) = relations
            .list(RelationKind::Favorite, user, &PageParams::default())
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(page[0].name, "Суп");

        let (cart, _) = relations
            .list(RelationKind::ShoppingCart, user, &PageParams::default())
            .await
            .unwrap();
        assert!(cart.is_empty());

        assert!(relations.remove(RelationKind::Favorite, user, recipe).await.unwrap());
        assert!(!relations.remove(RelationKind::Favorite, user, recipe).await.unwrap());
    }
}
