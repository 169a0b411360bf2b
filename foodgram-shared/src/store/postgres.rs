/// PostgreSQL recipe store
///
/// Every write opens a transaction, locks the recipe row it changes, checks
/// that all referenced ingredients and tags exist, then swaps the association
/// rows. Returning early with an error drops the transaction, which rolls it
/// back.
///
/// # Association replace
///
/// ```text
/// BEGIN
///   SELECT ... FROM recipes WHERE id = $1 FOR UPDATE
///   SELECT id FROM ingredients WHERE id = ANY($ids)   -- NotFound if short
///   SELECT id FROM tags WHERE id = ANY($ids)          -- NotFound if short
///   DELETE FROM recipe_ingredients WHERE recipe_id = $1
///   INSERT INTO recipe_ingredients SELECT ... FROM UNNEST($ids, $amounts)
///   DELETE FROM recipe_tags WHERE recipe_id = $1 AND tag_id <> ALL($tags)
///   INSERT INTO recipe_tags SELECT ... FROM UNNEST($tags) ON CONFLICT DO NOTHING
/// COMMIT
/// ```

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{NewRecipe, RecipeChanges, RecipeStore};
use crate::error::{RecipeError, RecipeResult};
use crate::models::ingredient::Ingredient;
use crate::models::recipe::{Recipe, RecipeWithAssociations};
use crate::models::shopping_cart::ShoppingCart;
use crate::models::tag::Tag;
use crate::recipes::associations::{missing_ids, AssociationSet};
use crate::recipes::shopping_list::CartIngredientLine;

const RETURNING_RECIPE: &str = "RETURNING id, author_id, name, text, image, cooking_time, created_at";

/// Recipe store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgRecipeStore {
    pool: PgPool,
}

impl PgRecipeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RecipeStore for PgRecipeStore {
    async fn create_recipe(
        &self,
        author_id: Uuid,
        recipe: NewRecipe,
        associations: &AssociationSet,
    ) -> RecipeResult<RecipeWithAssociations> {
        let mut tx = self.pool.begin().await?;

        let query = format!(
            "INSERT INTO recipes (author_id, name, text, image, cooking_time)
             VALUES ($1, $2, $3, $4, $5)
             {RETURNING_RECIPE}"
        );
        let created = sqlx::query_as::<_, Recipe>(&query)
            .bind(author_id)
            .bind(recipe.name)
            .bind(recipe.text)
            .bind(recipe.image)
            .bind(recipe.cooking_time)
            .fetch_one(&mut *tx)
            .await?;

        write_associations(&mut tx, created.id, associations).await?;
        let loaded = load_associations(&mut tx, created).await?;

        tx.commit().await?;

        info!(recipe_id = %loaded.recipe.id, %author_id, "Recipe created");
        Ok(loaded)
    }

    async fn update_recipe(
        &self,
        recipe_id: Uuid,
        changes: RecipeChanges,
        associations: &AssociationSet,
    ) -> RecipeResult<RecipeWithAssociations> {
        let mut tx = self.pool.begin().await?;

        lock_recipe(&mut tx, recipe_id).await?;

        let query = format!(
            "UPDATE recipes SET
                name = COALESCE($2, name),
                text = COALESCE($3, text),
                image = COALESCE($4, image),
                cooking_time = COALESCE($5, cooking_time)
             WHERE id = $1
             {RETURNING_RECIPE}"
        );
        let updated = sqlx::query_as::<_, Recipe>(&query)
            .bind(recipe_id)
            .bind(changes.name)
            .bind(changes.text)
            .bind(changes.image)
            .bind(changes.cooking_time)
            .fetch_one(&mut *tx)
            .await?;

        write_associations(&mut tx, recipe_id, associations).await?;
        let loaded = load_associations(&mut tx, updated).await?;

        tx.commit().await?;

        info!(%recipe_id, "Recipe updated");
        Ok(loaded)
    }

    async fn replace_associations(
        &self,
        recipe_id: Uuid,
        associations: &AssociationSet,
    ) -> RecipeResult<RecipeWithAssociations> {
        let mut tx = self.pool.begin().await?;

        let recipe = lock_recipe(&mut tx, recipe_id).await?;
        write_associations(&mut tx, recipe_id, associations).await?;
        let loaded = load_associations(&mut tx, recipe).await?;

        tx.commit().await?;

        debug!(%recipe_id, "Recipe associations replaced");
        Ok(loaded)
    }

    async fn find_recipe(&self, recipe_id: Uuid) -> RecipeResult<Option<RecipeWithAssociations>> {
        Ok(Recipe::find_with_associations(&self.pool, recipe_id).await?)
    }

    async fn delete_recipe(&self, recipe_id: Uuid) -> RecipeResult<bool> {
        let deleted = Recipe::delete(&self.pool, recipe_id).await?;
        if deleted {
            info!(%recipe_id, "Recipe deleted");
        }
        Ok(deleted)
    }

    async fn add_to_cart(&self, user_id: Uuid, recipe_id: Uuid) -> RecipeResult<bool> {
        if Recipe::find_by_id(&self.pool, recipe_id).await?.is_none() {
            return Err(RecipeError::not_found("recipe", recipe_id));
        }

        let added = ShoppingCart::add(&self.pool, user_id, recipe_id).await?;
        debug!(%user_id, %recipe_id, added, "Cart add");
        Ok(added)
    }

    async fn remove_from_cart(&self, user_id: Uuid, recipe_id: Uuid) -> RecipeResult<bool> {
        let removed = ShoppingCart::remove(&self.pool, user_id, recipe_id).await?;
        debug!(%user_id, %recipe_id, removed, "Cart remove");
        Ok(removed)
    }

    async fn cart_ingredient_lines(&self, user_id: Uuid) -> RecipeResult<Vec<CartIngredientLine>> {
        let lines = sqlx::query_as::<_, CartIngredientLine>(
            r#"
            SELECT ri.recipe_id, i.id AS ingredient_id, i.name, i.measurement_unit, ri.amount
            FROM shopping_cart c
            JOIN recipe_ingredients ri ON ri.recipe_id = c.recipe_id
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE c.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }
}

/// Locks the recipe row for the rest of the transaction
async fn lock_recipe(conn: &mut PgConnection, recipe_id: Uuid) -> RecipeResult<Recipe> {
    let query = "SELECT id, author_id, name, text, image, cooking_time, created_at \
                 FROM recipes WHERE id = $1 FOR UPDATE";

    sqlx::query_as::<_, Recipe>(query)
        .bind(recipe_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| RecipeError::not_found("recipe", recipe_id))
}

/// Makes the recipe's association rows equal to `associations`
async fn write_associations(
    conn: &mut PgConnection,
    recipe_id: Uuid,
    associations: &AssociationSet,
) -> RecipeResult<()> {
    let ingredient_ids = associations.ingredient_ids();
    let amounts = associations.amounts();
    let tag_ids = associations.tag_ids().to_vec();

    let existing = Ingredient::existing_ids(&mut *conn, &ingredient_ids).await?;
    let missing = missing_ids(&ingredient_ids, &existing);
    if !missing.is_empty() {
        warn!(%recipe_id, missing = missing.len(), "Unknown ingredients in recipe write");
        return Err(RecipeError::NotFound {
            entity: "ingredient",
            ids: missing,
        });
    }

    let existing = Tag::existing_ids(&mut *conn, &tag_ids).await?;
    let missing = missing_ids(&tag_ids, &existing);
    if !missing.is_empty() {
        warn!(%recipe_id, missing = missing.len(), "Unknown tags in recipe write");
        return Err(RecipeError::NotFound {
            entity: "tag",
            ids: missing,
        });
    }

    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
        SELECT $1, t.ingredient_id, t.amount
        FROM UNNEST($2::uuid[], $3::int4[]) AS t(ingredient_id, amount)
        "#,
    )
    .bind(recipe_id)
    .bind(&ingredient_ids)
    .bind(&amounts)
    .execute(&mut *conn)
    .await?;

    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1 AND tag_id <> ALL($2)")
        .bind(recipe_id)
        .bind(&tag_ids)
        .execute(&mut *conn)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO recipe_tags (recipe_id, tag_id)
        SELECT $1, t.tag_id
        FROM UNNEST($2::uuid[]) AS t(tag_id)
        ON CONFLICT (recipe_id, tag_id) DO NOTHING
        "#,
    )
    .bind(recipe_id)
    .bind(&tag_ids)
    .execute(&mut *conn)
    .await?;

    debug!(
        %recipe_id,
        ingredients = ingredient_ids.len(),
        tags = tag_ids.len(),
        "Wrote recipe associations"
    );

    Ok(())
}

async fn load_associations(
    conn: &mut PgConnection,
    recipe: Recipe,
) -> RecipeResult<RecipeWithAssociations> {
    let ingredients = Recipe::ingredients(&mut *conn, recipe.id).await?;
    let tags = Tag::list_for_recipe(&mut *conn, recipe.id).await?;

    Ok(RecipeWithAssociations {
        recipe,
        ingredients,
        tags,
    })
}
