/// Favorite recipes
///
/// One row per (user, recipe). Entries are keyed by that pair, never by a
/// surrogate ID, and vanish with the recipe or the user.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE favorites (
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     recipe_id UUID NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (user_id, recipe_id)
/// );
/// ```

use sqlx::PgPool;
use uuid::Uuid;

/// Favorites of a user
pub struct Favorite;

impl Favorite {
    /// Marks a recipe as favorite
    ///
    /// Returns false if it already was.
    pub async fn add(pool: &PgPool, user_id: Uuid, recipe_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO favorites (user_id, recipe_id)
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

    /// Removes a recipe from favorites
    ///
    /// Returns false if it was not a favorite.
    pub async fn remove(pool: &PgPool, user_id: Uuid, recipe_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND recipe_id = $2")
            .bind(user_id)
            .bind(recipe_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether the user has favorited the recipe
    pub async fn exists(pool: &PgPool, user_id: Uuid, recipe_id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM favorites WHERE user_id = $1 AND recipe_id = $2)",
        )
        .bind(user_id)
        .bind(recipe_id)
        .fetch_one(pool)
        .await
    }
}
