/// Association Writer
///
/// Replaces a recipe's ingredient and tag associations as one unit. Input is
/// first checked by [`AssociationSet::new`]; only a checked set can reach the
/// store, so duplicates and non-positive amounts never get near a transaction.
///
/// # Example
///
/// ```no_run
/// use foodgram_shared::recipes::associations::{replace_associations, IngredientAmount};
/// use foodgram_shared::store::RecipeStore;
/// use uuid::Uuid;
///
/// # async fn example(store: &dyn RecipeStore, recipe_id: Uuid, flour: Uuid, breakfast: Uuid)
/// #     -> Result<(), foodgram_shared::error::RecipeError> {
/// let recipe = replace_associations(
///     store,
///     recipe_id,
///     vec![IngredientAmount::new(flour, 200)],
///     vec![breakfast],
/// )
/// .await?;
/// assert_eq!(recipe.ingredients.len(), 1);
/// # Ok(())
/// # }
/// ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{RecipeError, RecipeResult};
use crate::models::recipe::RecipeWithAssociations;
use crate::store::RecipeStore;

/// One requested (ingredient, amount) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientAmount {
    /// Ingredient reference
    #[serde(rename = "id")]
    pub ingredient_id: Uuid,

    /// Quantity in the ingredient's unit
    pub amount: i32,
}

impl IngredientAmount {
    pub fn new(ingredient_id: Uuid, amount: i32) -> Self {
        Self {
            ingredient_id,
            amount,
        }
    }
}

/// Validated ingredient amounts and tag references
///
/// Invariants:
/// - at least one ingredient, no ingredient twice, every amount ≥ 1
/// - at least one tag, no tag twice
///
/// Input order is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationSet {
    ingredients: Vec<IngredientAmount>,
    tag_ids: Vec<Uuid>,
}

impl AssociationSet {
    /// Checks the requested associations
    ///
    /// # Errors
    ///
    /// `RecipeError::Validation` naming `ingredients`, `amount` or `tags`.
    /// Existence of the referenced rows is not checked here.
    pub fn new(ingredients: Vec<IngredientAmount>, tag_ids: Vec<Uuid>) -> RecipeResult<Self> {
        if ingredients.is_empty() {
            return Err(RecipeError::validation(
                "ingredients",
                "at least one ingredient is required",
            ));
        }

        let mut seen = HashSet::with_capacity(ingredients.len());
        for item in &ingredients {
            if item.amount < 1 {
                return Err(RecipeError::validation(
                    "amount",
                    format!(
                        "amount for ingredient {} must be at least 1, got {}",
                        item.ingredient_id, item.amount
                    ),
                ));
            }
            if !seen.insert(item.ingredient_id) {
                return Err(RecipeError::validation(
                    "ingredients",
                    format!("ingredient {} is listed more than once", item.ingredient_id),
                ));
            }
        }

        if tag_ids.is_empty() {
            return Err(RecipeError::validation("tags", "at least one tag is required"));
        }

        let mut seen = HashSet::with_capacity(tag_ids.len());
        for tag_id in &tag_ids {
            if !seen.insert(*tag_id) {
                return Err(RecipeError::validation(
                    "tags",
                    format!("tag {} is listed more than once", tag_id),
                ));
            }
        }

        Ok(Self {
            ingredients,
            tag_ids,
        })
    }

    pub fn ingredients(&self) -> &[IngredientAmount] {
        &self.ingredients
    }

    pub fn tag_ids(&self) -> &[Uuid] {
        &self.tag_ids
    }

    /// Ingredient IDs in input order
    pub fn ingredient_ids(&self) -> Vec<Uuid> {
        self.ingredients.iter().map(|i| i.ingredient_id).collect()
    }

    /// Amounts in input order, aligned with [`Self::ingredient_ids`]
    pub fn amounts(&self) -> Vec<i32> {
        self.ingredients.iter().map(|i| i.amount).collect()
    }
}

/// Replaces every ingredient and tag association of `recipe_id`
///
/// Validates the input, then hands the set to the store, which applies it in a
/// single transaction: old ingredient lines are removed, the new ones bulk
/// inserted, and the tag links made equal to `tag_ids`. On any error nothing
/// changes.
///
/// # Errors
///
/// - `Validation` for empty, duplicate or non-positive input
/// - `NotFound` for an unknown recipe, ingredient or tag
/// - `Database` on storage failure
pub async fn replace_associations(
    store: &dyn RecipeStore,
    recipe_id: Uuid,
    ingredients: Vec<IngredientAmount>,
    tag_ids: Vec<Uuid>,
) -> RecipeResult<RecipeWithAssociations> {
    let associations = AssociationSet::new(ingredients, tag_ids)?;

    debug!(
        %recipe_id,
        ingredients = associations.ingredients().len(),
        tags = associations.tag_ids().len(),
        "Replacing recipe associations"
    );

    store.replace_associations(recipe_id, &associations).await
}

/// Lists ids in `requested` that are missing from `existing`, in request order
pub(crate) fn missing_ids(requested: &[Uuid], existing: &[Uuid]) -> Vec<Uuid> {
    let existing: HashSet<&Uuid> = existing.iter().collect();
    requested
        .iter()
        .filter(|id| !existing.contains(id))
        .copied()
        .collect()
}
