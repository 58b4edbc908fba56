// ABOUTME: Recipe persistence with per-viewer flags, filters, and ingredient rows
// ABOUTME: Create and update run in one transaction; ingredients are batch-loaded per page
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashMap;

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};

use super::users::row_to_user;
use super::{format_timestamp, parse_timestamp};
use crate::errors::{AppError, AppResult};
use crate::models::{
    IngredientAmount, NewRecipe, Recipe, RecipeChanges, RecipeFilter, RecipeIngredient,
    RecipeSummary, RecipeView,
};
use crate::pagination::PageParams;

/// `$1` is the viewer id (NULL for anonymous callers)
const VIEW_SELECT: &str = r"
    SELECT r.id, r.author_id, r.name, r.image, r.text, r.cooking_time, r.created_at, r.updated_at,
           u.id AS u_id, u.email AS u_email, u.username AS u_username,
           u.first_name AS u_first_name, u.last_name AS u_last_name,
           u.password_hash AS u_password_hash, u.avatar AS u_avatar,
           u.is_active AS u_is_active, u.created_at AS u_created_at,
           EXISTS (SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = $1) AS is_favorited,
           EXISTS (SELECT 1 FROM shopping_cart c WHERE c.recipe_id = r.id AND c.user_id = $1) AS is_in_shopping_cart,
           EXISTS (SELECT 1 FROM follows s WHERE s.author_id = r.author_id AND s.follower_id = $1) AS author_is_subscribed
    FROM recipes r
    JOIN users u ON u.id = r.author_id
";

/// `$1` viewer, `$2` author (NULL for any), `$3` favorites only, `$4` cart only
const LIST_FILTER: &str = r"
    WHERE ($2 IS NULL OR r.author_id = $2)
      AND ($3 = 0 OR EXISTS (SELECT 1 FROM favorites f2 WHERE f2.recipe_id = r.id AND f2.user_id = $1))
      AND ($4 = 0 OR EXISTS (SELECT 1 FROM shopping_cart c2 WHERE c2.recipe_id = r.id AND c2.user_id = $1))
";

/// Recipe database operations manager
pub struct RecipesManager {
    pool: SqlitePool,
}

impl RecipesManager {
    /// Create a new recipes manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a recipe and its ingredient rows atomically, returning the new id
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails; nothing is committed then
    pub async fn create(&self, author_id: i64, recipe: &NewRecipe) -> AppResult<i64> {
        let now = format_timestamp(Utc::now());
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let result = sqlx::query(
            r"
            INSERT INTO recipes (author_id, name, image, text, cooking_time, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ",
        )
        .bind(author_id)
        .bind(&recipe.name)
        .bind(&recipe.image)
        .bind(&recipe.text)
        .bind(recipe.cooking_time)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to create recipe: {e}")))?;

        let recipe_id = result.last_insert_rowid();
        Self::insert_ingredients(&mut tx, recipe_id, &recipe.ingredients).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit recipe: {e}")))?;

        Ok(recipe_id)
    }

    /// Apply a partial update and replace the ingredient set atomically
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails; nothing is committed then
    pub async fn update(&self, recipe_id: i64, changes: &RecipeChanges) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query(
            r"
            UPDATE recipes
            SET name = COALESCE($1, name),
                image = COALESCE($2, image),
                text = COALESCE($3, text),
                cooking_time = COALESCE($4, cooking_time),
                updated_at = $5
            WHERE id = $6
            ",
        )
        .bind(changes.name.as_deref())
        .bind(changes.image.as_deref())
        .bind(changes.text.as_deref())
        .bind(changes.cooking_time)
        .bind(format_timestamp(Utc::now()))
        .bind(recipe_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to update recipe: {e}")))?;

        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to clear recipe ingredients: {e}")))?;

        Self::insert_ingredients(&mut tx, recipe_id, &changes.ingredients).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit recipe update: {e}")))?;

        Ok(())
    }

    async fn insert_ingredients(
        conn: &mut SqliteConnection,
        recipe_id: i64,
        ingredients: &[IngredientAmount],
    ) -> AppResult<()> {
        if ingredients.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) ");
        builder.push_values(ingredients, |mut row, item| {
            row.push_bind(recipe_id)
                .push_bind(item.ingredient_id)
                .push_bind(item.amount);
        });

        builder
            .build()
            .execute(conn)
            .await
            .map_err(|e| AppError::database(format!("Failed to store recipe ingredients: {e}")))?;

        Ok(())
    }

    /// Delete a recipe; cascades to ingredient rows and relations
    ///
    /// Returns the deleted recipe so its image can be cleaned up.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn delete(&self, recipe_id: i64) -> AppResult<Option<Recipe>> {
        let Some(recipe) = self.get(recipe_id).await? else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(recipe_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete recipe: {e}")))?;

        Ok(Some(recipe))
    }

    /// Get the bare recipe row
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get(&self, recipe_id: i64) -> AppResult<Option<Recipe>> {
        let row = sqlx::query(
            r"
            SELECT id, author_id, name, image, text, cooking_time, created_at, updated_at
            FROM recipes WHERE id = $1
            ",
        )
        .bind(recipe_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get recipe: {e}")))?;

        row.map(|r| row_to_recipe(&r)).transpose()
    }

    /// Get a recipe with author, ingredients, and the viewer's flags
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_view(
        &self,
        recipe_id: i64,
        viewer: Option<i64>,
    ) -> AppResult<Option<RecipeView>> {
        let row = sqlx::query(&format!("{VIEW_SELECT} WHERE r.id = $2"))
            .bind(viewer)
            .bind(recipe_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get recipe: {e}")))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut ingredients = self.ingredients_for(&[recipe_id]).await?;
        let view = row_to_view(&row, ingredients.remove(&recipe_id).unwrap_or_default())?;
        Ok(Some(view))
    }

    /// One page of recipes, newest first, plus the filtered total
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list(
        &self,
        viewer: Option<i64>,
        filter: &RecipeFilter,
        params: &PageParams,
    ) -> AppResult<(Vec<RecipeView>, i64)> {
        let rows = sqlx::query(&format!(
            "{VIEW_SELECT} {LIST_FILTER} ORDER BY r.created_at DESC, r.id DESC LIMIT $5 OFFSET $6"
        ))
        .bind(viewer)
        .bind(filter.author)
        .bind(filter.favorited_only)
        .bind(filter.in_shopping_cart_only)
        .bind(i64::from(params.limit()))
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list recipes: {e}")))?;

        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM recipes r {LIST_FILTER}"
        ))
        .bind(viewer)
        .bind(filter.author)
        .bind(filter.favorited_only)
        .bind(filter.in_shopping_cart_only)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count recipes: {e}")))?;

        let ids: Vec<i64> = rows
            .iter()
            .map(|r| r.try_get::<i64, _>("id"))
            .collect::<Result<_, _>>()
            .map_err(|e| AppError::database(format!("Failed to decode recipe id: {e}")))?;
        let mut ingredients = self.ingredients_for(&ids).await?;

        let views = rows
            .iter()
            .zip(&ids)
            .map(|(row, id)| row_to_view(row, ingredients.remove(id).unwrap_or_default()))
            .collect::<AppResult<Vec<_>>>()?;

        Ok((views, count))
    }

    /// Ingredient rows for each of `recipe_ids`, ordered by ingredient name
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn ingredients_for(
        &self,
        recipe_ids: &[i64],
    ) -> AppResult<HashMap<i64, Vec<RecipeIngredient>>> {
        let mut grouped: HashMap<i64, Vec<RecipeIngredient>> = HashMap::new();
        if recipe_ids.is_empty() {
            return Ok(grouped);
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            r"
            SELECT ri.recipe_id, i.id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id IN (",
        );
        let mut separated = builder.separated(", ");
        for id in recipe_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY i.name_lower, i.id");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to load recipe ingredients: {e}")))?;

        for row in &rows {
            let recipe_id: i64 = row
                .try_get("recipe_id")
                .map_err(|e| AppError::database(format!("Failed to decode recipe id: {e}")))?;
            grouped
                .entry(recipe_id)
                .or_default()
                .push(row_to_recipe_ingredient(row)?);
        }

        Ok(grouped)
    }

    /// Every (ingredient, amount) pair across all recipes in the user's cart
    ///
    /// Amounts are not summed here; that is the shopping-list aggregator's job.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn cart_ingredients(&self, user_id: i64) -> AppResult<Vec<RecipeIngredient>> {
        let rows = sqlx::query(
            r"
            SELECT i.id, i.name, i.measurement_unit, ri.amount
            FROM shopping_cart c
            JOIN recipe_ingredients ri ON ri.recipe_id = c.recipe_id
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE c.user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load cart ingredients: {e}")))?;

        rows.iter().map(row_to_recipe_ingredient).collect()
    }

    /// Newest recipes by `author_id`, at most `limit` when given
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn summaries_by_author(
        &self,
        author_id: i64,
        limit: Option<u32>,
    ) -> AppResult<Vec<RecipeSummary>> {
        let rows = sqlx::query(
            r"
            SELECT id, name, image, cooking_time
            FROM recipes
            WHERE author_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            ",
        )
        .bind(author_id)
        .bind(limit.map_or(-1, i64::from))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list author recipes: {e}")))?;

        rows.iter().map(row_to_summary).collect()
    }

    /// Number of recipes by `author_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn count_by_author(&self, author_id: i64) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM recipes WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count author recipes: {e}")))
    }
}

fn decode_error(e: sqlx::Error) -> AppError {
    AppError::database(format!("Failed to decode recipe row: {e}"))
}

fn row_to_recipe(row: &SqliteRow) -> AppResult<Recipe> {
    let created_at: String = row.try_get("created_at").map_err(decode_error)?;
    let updated_at: String = row.try_get("updated_at").map_err(decode_error)?;

    Ok(Recipe {
        id: row.try_get("id").map_err(decode_error)?,
        author_id: row.try_get("author_id").map_err(decode_error)?,
        name: row.try_get("name").map_err(decode_error)?,
        image: row.try_get("image").map_err(decode_error)?,
        text: row.try_get("text").map_err(decode_error)?,
        cooking_time: row.try_get("cooking_time").map_err(decode_error)?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

pub(super) fn row_to_summary(row: &SqliteRow) -> AppResult<RecipeSummary> {
    Ok(RecipeSummary {
        id: row.try_get("id").map_err(decode_error)?,
        name: row.try_get("name").map_err(decode_error)?,
        image: row.try_get("image").map_err(decode_error)?,
        cooking_time: row.try_get("cooking_time").map_err(decode_error)?,
    })
}

fn row_to_recipe_ingredient(row: &SqliteRow) -> AppResult<RecipeIngredient> {
    Ok(RecipeIngredient {
        id: row.try_get("id").map_err(decode_error)?,
        name: row.try_get("name").map_err(decode_error)?,
        measurement_unit: row.try_get("measurement_unit").map_err(decode_error)?,
        amount: row.try_get("amount").map_err(decode_error)?,
    })
}

fn row_to_view(row: &SqliteRow, ingredients: Vec<RecipeIngredient>) -> AppResult<RecipeView> {
    let flag = |name: &str| -> AppResult<bool> {
        row.try_get::<i64, _>(name)
            .map(|value| value != 0)
            .map_err(decode_error)
    };

    Ok(RecipeView {
        recipe: row_to_recipe(row)?,
        author: row_to_user(row, "u_")?,
        author_is_subscribed: flag("author_is_subscribed")?,
        ingredients,
        is_favorited: flag("is_favorited")?,
        is_in_shopping_cart: flag("is_in_shopping_cart")?,
    })
}

#[cfg(test)]
mod tests {
    use crate::database::test_support::{create_ingredient, create_test_db, create_user};
    use crate::models::{
        IngredientAmount, NewRecipe, RecipeChanges, RecipeFilter, RelationKind,
    };
    use crate::pagination::PageParams;

    fn recipe(name: &str, ingredients: Vec<IngredientAmount>) -> NewRecipe {
        NewRecipe {
            name: name.to_owned(),
            image: "recipes/images/test.png".to_owned(),
            text: "Mix and bake".to_owned(),
            cooking_time: 30,
            ingredients,
        }
    }

    #[tokio::test]
    async fn test_create_and_view_with_flags() {
        let db = create_test_db().await;
        let author = create_user(&db, "author").await;
        let viewer = create_user(&db, "viewer").await;
        let flour = create_ingredient(&db, "Мука", "г").await;

        let id = db
            .recipes()
            .create(
                author,
                &recipe(
                    "Блины",
                    vec![IngredientAmount {
                        ingredient_id: flour,
                        amount: 200,
                    }],
                ),
            )
            .await
            .unwrap();
        db.relations()
            .add(RelationKind::Favorite, viewer, id)
            .await
            .unwrap();

        let view = db.recipes().get_view(id, Some(viewer)).await.unwrap().unwrap();
        assert_eq!(view.author.username, "author");
        assert!(view.is_favorited);
        assert!(!view.is_in_shopping_cart);
        assert_eq!(view.ingredients.len(), 1);
        assert_eq!(view.ingredients[0].amount, 200);

        let anonymous = db.recipes().get_view(id, None).await.unwrap().unwrap();
        assert!(!anonymous.is_favorited);
    }

    #[tokio::test]
    async fn test_update_replaces_ingredients() {
        let db = create_test_db().await;
        let author = create_user(&db, "author").await;
        let flour = create_ingredient(&db, "Мука", "г").await;
        let sugar = create_ingredient(&db, "Сахар", "г").await;

        let id = db
            .recipes()
            .create(
                author,
                &recipe(
                    "Пирог",
                    vec![IngredientAmount {
                        ingredient_id: flour,
                        amount: 100,
                    }],
                ),
            )
            .await
            .unwrap();

        db.recipes()
            .update(
                id,
                &RecipeChanges {
                    name: Some("Сладкий пирог".to_owned()),
                    ingredients: vec![IngredientAmount {
                        ingredient_id: sugar,
                        amount: 50,
                    }],
                    ..RecipeChanges::default()
                },
            )
            .await
            .unwrap();

        let view = db.recipes().get_view(id, None).await.unwrap().unwrap();
        assert_eq!(view.recipe.name, "Сладкий пирог");
        assert_eq!(view.recipe.cooking_time, 30);
        assert_eq!(view.ingredients.len(), 1);
        assert_eq!(view.ingredients[0].id, sugar);
    }

    #[tokio::test]
    async fn test_list_filters_and_orders_newest_first() {
        let db = create_test_db().await;
        let alice = create_user(&db, "alice").await;
        let bob = create_user(&db, "bob").await;
        let salt = create_ingredient(&db, "Соль", "г").await;
        let items = vec![IngredientAmount {
            ingredient_id: salt,
            amount: 1,
        }];

        let first = db.recipes().create(alice, &recipe("A", items.clone())).await.unwrap();
        let second = db.recipes().create(bob, &recipe("B", items.clone())).await.unwrap();
        db.relations()
            .add(RelationKind::ShoppingCart, alice, second)
            .await
            .unwrap();

        let (all, count) = db
            .recipes()
            .list(None, &RecipeFilter::default(), &PageParams::default())
            .await
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(all[0].recipe.id, second);
        assert_eq!(all[1].recipe.id, first);

        let by_author = RecipeFilter {
            author: Some(alice),
            ..RecipeFilter::default()
        };
        let (mine, count) = db
            .recipes()
            .list(None, &by_author, &PageParams::default())
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(mine[0].recipe.id, first);

        let in_cart = RecipeFilter {
            in_shopping_cart_only: true,
            ..RecipeFilter::default()
        };
        let (cart, _) = db
            .recipes()
            .list(Some(alice), &in_cart, &PageParams::default())
            .await
            .unwrap();
        assert_eq!(cart.len(), 1);
        assert!(cart[0].is_in_shopping_cart);

        let (cart, count) = db
            .recipes()
            .list(Some(bob), &in_cart, &PageParams::default())
            .await
            .unwrap();
        assert!(cart.is_empty());
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_cart_ingredients_are_not_presummed() {
        let db = create_test_db().await;
        let user = create_user(&db, "cook").await;
        let flour = create_ingredient(&db, "Мука", "г").await;

        for amount in [200, 100] {
            let id = db
                .recipes()
                .create(
                    user,
                    &recipe(
                        "R",
                        vec![IngredientAmount {
                            ingredient_id: flour,
                            amount,
                        }],
                    ),
                )
                .await
                .unwrap();
            db.relations()
                .add(RelationKind::ShoppingCart, user, id)
                .await
                .unwrap();
        }

        let lines = db.recipes().cart_ingredients(user).await.unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines.iter().map(|l| l.amount).sum::<i64>(), 300);
    }

    #[tokio::test]
    async fn test_delete_cascades_relations() {
        let db = create_test_db().await;
        let user = create_user(&db, "cook").await;
        let salt = create_ingredient(&db, "Соль", "г").await;
        let id = db
            .recipes()
            .create(
                user,
                &recipe(
                    "R",
                    vec![IngredientAmount {
                        ingredient_id: salt,
                        amount: 5,
                    }],
                ),
            )
            .await
            .unwrap();
        db.relations()
            .add(RelationKind::ShoppingCart, user, id)
            .await
            .unwrap();

        assert!(db.recipes().delete(id).await.unwrap().is_some());
        assert!(db.recipes().get(id).await.unwrap().is_none());
        assert!(db.recipes().cart_ingredients(user).await.unwrap().is_empty());
        assert!(db.recipes().delete(id).await.unwrap().is_none());
    }
}
