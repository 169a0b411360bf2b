/// Recipe model and read-side database operations
///
/// Writes that touch the ingredient and tag associations go through the
/// `RecipeStore` (see `crate::store`) so that they run in one transaction.
/// This module covers lookups, listing with filters, and deletion.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE recipes (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(256) NOT NULL,
///     text TEXT NOT NULL,
///     image TEXT NOT NULL,
///     cooking_time INTEGER NOT NULL CHECK (cooking_time >= 1),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE recipe_ingredients (
///     recipe_id UUID NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
///     ingredient_id UUID NOT NULL REFERENCES ingredients(id) ON DELETE CASCADE,
///     amount INTEGER NOT NULL CHECK (amount >= 1),
///     PRIMARY KEY (recipe_id, ingredient_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::tag::Tag;

/// A recipe row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recipe {
    pub id: Uuid,

    /// Owning user
    pub author_id: Uuid,

    pub name: String,

    /// Cooking instructions
    pub text: String,

    /// Image reference, stored verbatim
    pub image: String,

    /// Preparation time in minutes, at least 1
    pub cooking_time: i32,

    /// Creation order; listings are newest first
    pub created_at: DateTime<Utc>,
}

/// An ingredient as used by one recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecipeIngredient {
    /// Ingredient ID
    pub id: Uuid,

    pub name: String,

    pub measurement_unit: String,

    /// Quantity in `measurement_unit`
    pub amount: i32,
}

/// A recipe together with its ingredient and tag associations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeWithAssociations {
    pub recipe: Recipe,

    /// Ordered by ingredient name
    pub ingredients: Vec<RecipeIngredient>,

    /// Ordered by tag name
    pub tags: Vec<Tag>,
}

/// Filters for [`Recipe::list`]
///
/// Empty filter lists every recipe.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    /// Only recipes by this author
    pub author_id: Option<Uuid>,

    /// Only recipes carrying at least one of these tag slugs
    pub tag_slugs: Vec<String>,

    /// Only recipes this user has favorited
    pub favorited_by: Option<Uuid>,

    /// Only recipes in this user's shopping cart
    pub in_cart_of: Option<Uuid>,
}

/// Compact recipe representation used in favorites, carts and subscriptions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecipeSummary {
    pub id: Uuid,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
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

const RECIPE_COLUMNS: &str = "r.id, r.author_id, r.name, r.text, r.image, r.cooking_time, r.created_at";

impl Recipe {
    /// Finds a recipe by ID
    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.id = $1");

        sqlx::query_as::<_, Recipe>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Lists recipes matching `filter`, newest first
    pub async fn list(pool: &PgPool, filter: &RecipeFilter) -> Result<Vec<Self>, sqlx::Error> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {RECIPE_COLUMNS} FROM recipes r WHERE TRUE"));

        if let Some(author_id) = filter.author_id {
            builder.push(" AND r.author_id = ").push_bind(author_id);
        }

        if !filter.tag_slugs.is_empty() {
            builder
                .push(
                    " AND EXISTS (SELECT 1 FROM recipe_tags rt JOIN tags t ON t.id = rt.tag_id \
                     WHERE rt.recipe_id = r.id AND t.slug = ANY(",
                )
                .push_bind(filter.tag_slugs.clone())
                .push("))");
        }

        if let Some(user_id) = filter.favorited_by {
            builder
                .push(" AND EXISTS (SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = ")
                .push_bind(user_id)
                .push(")");
        }

        if let Some(user_id) = filter.in_cart_of {
            builder
                .push(" AND EXISTS (SELECT 1 FROM shopping_cart c WHERE c.recipe_id = r.id AND c.user_id = ")
                .push_bind(user_id)
                .push(")");
        }

        builder.push(" ORDER BY r.created_at DESC, r.id");

        builder.build_query_as::<Recipe>().fetch_all(pool).await
    }

    /// Ingredients of a recipe, by ingredient name
    pub async fn ingredients<'e, E>(executor: E, recipe_id: Uuid) -> Result<Vec<RecipeIngredient>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, RecipeIngredient>(
            r#"
            SELECT i.id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = $1
            ORDER BY i.name
            "#,
        )
        .bind(recipe_id)
        .fetch_all(executor)
        .await
    }

    /// Loads a recipe with its associations
    ///
    /// All three reads share one `REPEATABLE READ` snapshot, so a concurrent
    /// association replace is seen either entirely or not at all.
    pub async fn find_with_associations(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<RecipeWithAssociations>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let Some(recipe) = Recipe::find_by_id(&mut *tx, id).await? else {
            tx.rollback().await?;
            return Ok(None);
        };

        let ingredients = Recipe::ingredients(&mut *tx, id).await?;
        let tags = Tag::list_for_recipe(&mut *tx, id).await?;

        tx.commit().await?;

        Ok(Some(RecipeWithAssociations {
            recipe,
            ingredients,
            tags,
        }))
    }

    /// Latest recipes of an author, at most `limit` (all when `None`)
    pub async fn summaries_by_author(
        pool: &PgPool,
        author_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<RecipeSummary>, sqlx::Error> {
        sqlx::query_as::<_, RecipeSummary>(
            r#"
            SELECT id, name, image, cooking_time
            FROM recipes
            WHERE author_id = $1
            ORDER BY created_at DESC, id
            LIMIT $2
            "#,
        )
        .bind(author_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Number of recipes by an author
    pub async fn count_by_author(pool: &PgPool, author_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipes WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Deletes a recipe
    ///
    /// Associations, favorites and cart entries are removed by cascade.
    /// Returns false if the recipe did not exist.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl RecipeWithAssociations {
    /// Ingredient IDs with amounts, as stored
    pub fn ingredient_amounts(&self) -> Vec<(Uuid, i32)> {
        self.ingredients.iter().map(|i| (i.id, i.amount)).collect()
    }

    /// Tag IDs, as stored
    pub fn tag_ids(&self) -> Vec<Uuid> {
        self.tags.iter().map(|t| t.id).collect()
    }
}
