/// Tag reference data
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tags (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(32) NOT NULL UNIQUE,
///     slug VARCHAR(32) NOT NULL UNIQUE
/// );
///
/// CREATE TABLE recipe_tags (
///     recipe_id UUID NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
///     tag_id UUID NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
///     PRIMARY KEY (recipe_id, tag_id)
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// A recipe tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

/// Input for loading a tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTag {
    pub name: String,
    pub slug: String,
}

impl Tag {
    /// Inserts a tag (reference data loading)
    pub async fn create(pool: &PgPool, data: CreateTag) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (name, slug) VALUES ($1, $2) RETURNING id, name, slug",
        )
        .bind(data.name)
        .bind(data.slug)
        .fetch_one(pool)
        .await
    }

    /// Finds a tag by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tag>("SELECT id, name, slug FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists all tags by name
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tag>("SELECT id, name, slug FROM tags ORDER BY name")
            .fetch_all(pool)
            .await
    }

    /// Tags attached to a recipe, by name
    pub async fn list_for_recipe<'e, E>(executor: E, recipe_id: Uuid) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.id, t.name, t.slug
            FROM tags t
            JOIN recipe_tags rt ON rt.tag_id = t.id
            WHERE rt.recipe_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(recipe_id)
        .fetch_all(executor)
        .await
    }

    /// Returns which of `ids` exist
    pub async fn existing_ids<'e, E>(executor: E, ids: &[Uuid]) -> Result<Vec<Uuid>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM tags WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(executor)
            .await
    }
}
