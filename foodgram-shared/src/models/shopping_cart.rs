/// Shopping cart entries
///
/// A user's cart is the set of recipes whose ingredients go on the shopping
/// list. Same shape and rules as favorites: unique per (user, recipe), keyed
/// by that pair, cascading on delete.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE shopping_cart (
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     recipe_id UUID NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (user_id, recipe_id)
/// );
/// ```

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Shopping cart of a user
pub struct ShoppingCart;

impl ShoppingCart {
    /// Puts a recipe in the cart
    ///
    /// Returns false if it was already there.
    pub async fn add(pool: &PgPool, user_id: Uuid, recipe_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO shopping_cart (user_id, recipe_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, recipe_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(recipe_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Takes a recipe out of the cart
    ///
    /// Returns false if it was not there.
    pub async fn remove(pool: &PgPool, user_id: Uuid, recipe_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM shopping_cart WHERE user_id = $1 AND recipe_id = $2")
            .bind(user_id)
            .bind(recipe_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether the recipe is in the user's cart
    pub async fn exists(pool: &PgPool, user_id: Uuid, recipe_id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM shopping_cart WHERE user_id = $1 AND recipe_id = $2)",
        )
        .bind(user_id)
        .bind(recipe_id)
        .fetch_one(pool)
        .await
    }

    /// Recipe IDs in the user's cart
    pub async fn recipe_ids<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar("SELECT recipe_id FROM shopping_cart WHERE user_id = $1 ORDER BY recipe_id")
            .bind(user_id)
            .fetch_all(executor)
            .await
    }
}
