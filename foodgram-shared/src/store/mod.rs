/// Recipe storage seam
///
/// The recipe core never touches the database directly; it talks to a
/// [`RecipeStore`]. Two implementations ship:
///
/// - [`PgRecipeStore`]: PostgreSQL, every write in one transaction
/// - [`InMemoryRecipeStore`]: process-local, for tests and demos
///
/// # Contract
///
/// Writes are all-or-nothing. After a failed write (validation, missing
/// reference, storage error) the store is exactly as it was before the call.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RecipeResult;
use crate::models::recipe::RecipeWithAssociations;
use crate::recipes::associations::AssociationSet;
use crate::recipes::shopping_list::CartIngredientLine;

pub use memory::InMemoryRecipeStore;
pub use postgres::PgRecipeStore;

/// Scalar fields of a new recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecipe {
    pub name: String,
    pub text: String,
    pub image: String,
    pub cooking_time: i32,
}

/// Scalar field changes for an update; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeChanges {
    pub name: Option<String>,
    pub text: Option<String>,
    pub image: Option<String>,
    pub cooking_time: Option<i32>,
}

/// Storage operations behind the recipe core
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Inserts a recipe and its associations in one transaction
    ///
    /// # Errors
    ///
    /// `NotFound` if an ingredient or tag does not exist.
    async fn create_recipe(
        &self,
        author_id: Uuid,
        recipe: NewRecipe,
        associations: &AssociationSet,
    ) -> RecipeResult<RecipeWithAssociations>;

    /// Applies field changes and replaces associations in one transaction
    ///
    /// # Errors
    ///
    /// `NotFound` if the recipe, an ingredient or a tag does not exist.
    async fn update_recipe(
        &self,
        recipe_id: Uuid,
        changes: RecipeChanges,
        associations: &AssociationSet,
    ) -> RecipeResult<RecipeWithAssociations>;

    /// Replaces associations only, in one transaction
    async fn replace_associations(
        &self,
        recipe_id: Uuid,
        associations: &AssociationSet,
    ) -> RecipeResult<RecipeWithAssociations>;

    /// Loads a recipe with its associations
    async fn find_recipe(&self, recipe_id: Uuid) -> RecipeResult<Option<RecipeWithAssociations>>;

    /// Deletes a recipe; associations and list entries go with it
    ///
    /// Returns false if the recipe did not exist.
    async fn delete_recipe(&self, recipe_id: Uuid) -> RecipeResult<bool>;

    /// Puts a recipe in a user's cart; false if it was already there
    ///
    /// # Errors
    ///
    /// `NotFound` if the recipe does not exist.
    async fn add_to_cart(&self, user_id: Uuid, recipe_id: Uuid) -> RecipeResult<bool>;

    /// Takes a recipe out of a user's cart; false if it was not there
    async fn remove_from_cart(&self, user_id: Uuid, recipe_id: Uuid) -> RecipeResult<bool>;

    /// Every ingredient line of every recipe in the user's cart
    ///
    /// Reads from one consistent snapshot.
    async fn cart_ingredient_lines(&self, user_id: Uuid) -> RecipeResult<Vec<CartIngredientLine>>;
}
