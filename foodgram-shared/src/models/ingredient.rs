/// Ingredient reference data
///
/// Ingredients are loaded out of band and only read by the API. Recipes
/// point at them through `recipe_ingredients`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE ingredients (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(128) NOT NULL UNIQUE,
///     measurement_unit VARCHAR(64) NOT NULL
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// An ingredient with its unit of measurement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ingredient {
    pub id: Uuid,

    /// Unique display name
    pub name: String,

    /// Unit the amounts are expressed in ("g", "ml", "pcs", ...)
    pub measurement_unit: String,
}

/// Input for loading an ingredient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIngredient {
    pub name: String,
    pub measurement_unit: String,
}

impl Ingredient {
    /// Inserts an ingredient (reference data loading)
    pub async fn create(pool: &PgPool, data: CreateIngredient) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Ingredient>(
            r#"
            INSERT INTO ingredients (name, measurement_unit)
            VALUES ($1, $2)
            RETURNING id, name, measurement_unit
            "#,
        )
        .bind(data.name)
        .bind(data.measurement_unit)
        .fetch_one(pool)
        .await
    }

    /// Finds an ingredient by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Ingredient>(
            "SELECT id, name, measurement_unit FROM ingredients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists ingredients by name, optionally only those whose name starts
    /// with `prefix` (case-insensitive)
    pub async fn list(pool: &PgPool, prefix: Option<&str>) -> Result<Vec<Self>, sqlx::Error> {
        match prefix.map(str::trim).filter(|p| !p.is_empty()) {
            Some(prefix) => {
                sqlx::query_as::<_, Ingredient>(
                    r#"
                    SELECT id, name, measurement_unit
                    FROM ingredients
                    WHERE LOWER(name) LIKE $1 ESCAPE '\'
                    ORDER BY name
                    "#,
                )
                .bind(format!("{}%", escape_like(&prefix.to_lowercase())))
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Ingredient>(
                    "SELECT id, name, measurement_unit FROM ingredients ORDER BY name",
                )
                .fetch_all(pool)
                .await
            }
        }
    }

    /// Returns which of `ids` exist
    ///
    /// Takes any executor so it can run inside a transaction.
    pub async fn existing_ids<'e, E>(executor: E, ids: &[Uuid]) -> Result<Vec<Uuid>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM ingredients WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(executor)
            .await
    }
}

/// Escapes LIKE wildcards so user input matches literally
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
