/// Process-local recipe store
///
/// Holds reference data, recipes, associations and carts behind one
/// `RwLock`. A write clones the state, applies the change to the clone, and
/// swaps it in only when every step succeeded, so a failed write leaves the
/// store untouched. Readers never observe a half-applied write.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{NewRecipe, RecipeChanges, RecipeStore};
use crate::error::{RecipeError, RecipeResult};
use crate::models::ingredient::Ingredient;
use crate::models::recipe::{Recipe, RecipeIngredient, RecipeWithAssociations};
use crate::models::tag::Tag;
use crate::recipes::associations::{missing_ids, AssociationSet};
use crate::recipes::shopping_list::CartIngredientLine;

#[derive(Debug, Clone, Default)]
struct MemoryState {
    ingredients: HashMap<Uuid, Ingredient>,
    tags: HashMap<Uuid, Tag>,
    recipes: HashMap<Uuid, Recipe>,
    /// recipe -> (ingredient, amount)
    recipe_ingredients: HashMap<Uuid, Vec<(Uuid, i32)>>,
    recipe_tags: HashMap<Uuid, HashSet<Uuid>>,
    /// user -> recipes
    carts: HashMap<Uuid, HashSet<Uuid>>,
}

impl MemoryState {
    fn write_associations(&mut self, recipe_id: Uuid, associations: &AssociationSet) -> RecipeResult<()> {
        let existing: Vec<Uuid> = self.ingredients.keys().copied().collect();
        let missing = missing_ids(&associations.ingredient_ids(), &existing);
        if !missing.is_empty() {
            return Err(RecipeError::NotFound {
                entity: "ingredient",
                ids: missing,
            });
        }

        let existing: Vec<Uuid> = self.tags.keys().copied().collect();
        let missing = missing_ids(associations.tag_ids(), &existing);
        if !missing.is_empty() {
            return Err(RecipeError::NotFound {
                entity: "tag",
                ids: missing,
            });
        }

        let lines = associations
            .ingredients()
            .iter()
            .map(|item| (item.ingredient_id, item.amount))
            .collect();
        self.recipe_ingredients.insert(recipe_id, lines);
        self.recipe_tags
            .insert(recipe_id, associations.tag_ids().iter().copied().collect());

        Ok(())
    }

    fn load(&self, recipe_id: Uuid) -> Option<RecipeWithAssociations> {
        let recipe = self.recipes.get(&recipe_id)?.clone();

        let mut ingredients: Vec<RecipeIngredient> = self
            .recipe_ingredients
            .get(&recipe_id)
            .into_iter()
            .flatten()
            .filter_map(|(ingredient_id, amount)| {
                self.ingredients.get(ingredient_id).map(|i| RecipeIngredient {
                    id: i.id,
                    name: i.name.clone(),
                    measurement_unit: i.measurement_unit.clone(),
                    amount: *amount,
                })
            })
            .collect();
        ingredients.sort_by(|a, b| a.name.cmp(&b.name));

        let mut tags: Vec<Tag> = self
            .recipe_tags
            .get(&recipe_id)
            .into_iter()
            .flatten()
            .filter_map(|tag_id| self.tags.get(tag_id).cloned())
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));

        Some(RecipeWithAssociations {
            recipe,
            ingredients,
            tags,
        })
    }

    fn loaded(&self, recipe_id: Uuid) -> RecipeResult<RecipeWithAssociations> {
        self.load(recipe_id)
            .ok_or_else(|| RecipeError::not_found("recipe", recipe_id))
    }
}

/// In-memory [`RecipeStore`]
#[derive(Debug, Default)]
pub struct InMemoryRecipeStore {
    state: RwLock<MemoryState>,
}

impl InMemoryRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an ingredient to the reference data
    pub async fn insert_ingredient(&self, name: &str, measurement_unit: &str) -> Ingredient {
        let ingredient = Ingredient {
            id: Uuid::new_v4(),
            name: name.to_string(),
            measurement_unit: measurement_unit.to_string(),
        };
        self.state
            .write()
            .await
            .ingredients
            .insert(ingredient.id, ingredient.clone());
        ingredient
    }

    /// Adds a tag to the reference data
    pub async fn insert_tag(&self, name: &str, slug: &str) -> Tag {
        let tag = Tag {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: slug.to_string(),
        };
        self.state.write().await.tags.insert(tag.id, tag.clone());
        tag
    }
}

#[async_trait]
impl RecipeStore for InMemoryRecipeStore {
    async fn create_recipe(
        &self,
        author_id: Uuid,
        recipe: NewRecipe,
        associations: &AssociationSet,
    ) -> RecipeResult<RecipeWithAssociations> {
        let mut guard = self.state.write().await;
        let mut next = guard.clone();

        let id = Uuid::new_v4();
        next.recipes.insert(
            id,
            Recipe {
                id,
                author_id,
                name: recipe.name,
                text: recipe.text,
                image: recipe.image,
                cooking_time: recipe.cooking_time,
                created_at: Utc::now(),
            },
        );
        next.write_associations(id, associations)?;
        let loaded = next.loaded(id)?;

        *guard = next;
        debug!(recipe_id = %id, "Recipe created in memory");
        Ok(loaded)
    }

    async fn update_recipe(
        &self,
        recipe_id: Uuid,
        changes: RecipeChanges,
        associations: &AssociationSet,
    ) -> RecipeResult<RecipeWithAssociations> {
        let mut guard = self.state.write().await;
        let mut next = guard.clone();

        let recipe = next
            .recipes
            .get_mut(&recipe_id)
            .ok_or_else(|| RecipeError::not_found("recipe", recipe_id))?;
        if let Some(name) = changes.name {
            recipe.name = name;
        }
        if let Some(text) = changes.text {
            recipe.text = text;
        }
        if let Some(image) = changes.image {
            recipe.image = image;
        }
        if let Some(cooking_time) = changes.cooking_time {
            recipe.cooking_time = cooking_time;
        }

        next.write_associations(recipe_id, associations)?;
        let loaded = next.loaded(recipe_id)?;

        *guard = next;
        Ok(loaded)
    }

    async fn replace_associations(
        &self,
        recipe_id: Uuid,
        associations: &AssociationSet,
    ) -> RecipeResult<RecipeWithAssociations> {
        let mut guard = self.state.write().await;
        if !guard.recipes.contains_key(&recipe_id) {
            return Err(RecipeError::not_found("recipe", recipe_id));
        }

        let mut next = guard.clone();
        next.write_associations(recipe_id, associations)?;
        let loaded = next.loaded(recipe_id)?;

        *guard = next;
        Ok(loaded)
    }

    async fn find_recipe(&self, recipe_id: Uuid) -> RecipeResult<Option<RecipeWithAssociations>> {
        Ok(self.state.read().await.load(recipe_id))
    }

    async fn delete_recipe(&self, recipe_id: Uuid) -> RecipeResult<bool> {
        let mut state = self.state.write().await;
        if state.recipes.remove(&recipe_id).is_none() {
            return Ok(false);
        }
        state.recipe_ingredients.remove(&recipe_id);
        state.recipe_tags.remove(&recipe_id);
        for cart in state.carts.values_mut() {
            cart.remove(&recipe_id);
        }
        Ok(true)
    }

    async fn add_to_cart(&self, user_id: Uuid, recipe_id: Uuid) -> RecipeResult<bool> {
        let mut state = self.state.write().await;
        if !state.recipes.contains_key(&recipe_id) {
            return Err(RecipeError::not_found("recipe", recipe_id));
        }
        Ok(state.carts.entry(user_id).or_default().insert(recipe_id))
    }

    async fn remove_from_cart(&self, user_id: Uuid, recipe_id: Uuid) -> RecipeResult<bool> {
        let mut state = self.state.write().await;
        Ok(state
            .carts
            .get_mut(&user_id)
            .map(|cart| cart.remove(&recipe_id))
            .unwrap_or(false))
    }

    async fn cart_ingredient_lines(&self, user_id: Uuid) -> RecipeResult<Vec<CartIngredientLine>> {
        let state = self.state.read().await;

        let Some(cart) = state.carts.get(&user_id) else {
            return Ok(Vec::new());
        };

        let mut lines = Vec::new();
        for recipe_id in cart {
            for (ingredient_id, amount) in state.recipe_ingredients.get(recipe_id).into_iter().flatten() {
                if let Some(ingredient) = state.ingredients.get(ingredient_id) {
                    lines.push(CartIngredientLine {
                        recipe_id: *recipe_id,
                        ingredient_id: *ingredient_id,
                        name: ingredient.name.clone(),
                        measurement_unit: ingredient.measurement_unit.clone(),
                        amount: *amount,
                    });
                }
            }
        }

        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes::associations::{replace_associations, IngredientAmount};
    use crate::recipes::shopping_list::{build_shopping_list, render};

    fn new_recipe(name: &str) -> NewRecipe {
        NewRecipe {
            name: name.to_string(),
            text: "Mix everything".to_string(),
            image: "data:image/png;base64,AAAA".to_string(),
            cooking_time: 15,
        }
    }

    fn set(ingredients: &[(Uuid, i32)], tags: &[Uuid]) -> AssociationSet {
        AssociationSet::new(
            ingredients
                .iter()
                .map(|(id, amount)| IngredientAmount::new(*id, *amount))
                .collect(),
            tags.to_vec(),
        )
        .unwrap()
    }

    struct Fixture {
        store: InMemoryRecipeStore,
        flour: Ingredient,
        eggs: Ingredient,
        sugar: Ingredient,
        breakfast: Tag,
        dinner: Tag,
    }

    async fn fixture() -> Fixture {
        let store = InMemoryRecipeStore::new();
        let flour = store.insert_ingredient("Flour", "g").await;
        let eggs = store.insert_ingredient("Eggs", "pcs").await;
        let sugar = store.insert_ingredient("Sugar", "g").await;
        let breakfast = store.insert_tag("Breakfast", "breakfast").await;
        let dinner = store.insert_tag("Dinner", "dinner").await;
        Fixture {
            store,
            flour,
            eggs,
            sugar,
            breakfast,
            dinner,
        }
    }

    #[tokio::test]
    async fn test_create_stores_exact_associations() {
        let f = fixture().await;
        let author = Uuid::new_v4();

        let created = f
            .store
            .create_recipe(
                author,
                new_recipe("Pancakes"),
                &set(&[(f.flour.id, 200), (f.eggs.id, 2)], &[f.breakfast.id]),
            )
            .await
            .unwrap();

        assert_eq!(created.recipe.author_id, author);
        let mut pairs = created.ingredient_amounts();
        pairs.sort();
        let mut expected = vec![(f.flour.id, 200), (f.eggs.id, 2)];
        expected.sort();
        assert_eq!(pairs, expected);
        assert_eq!(created.tag_ids(), vec![f.breakfast.id]);
    }

    #[tokio::test]
    async fn test_replace_overwrites_previous_associations() {
        let f = fixture().await;
        let created = f
            .store
            .create_recipe(
                Uuid::new_v4(),
                new_recipe("Pancakes"),
                &set(&[(f.flour.id, 200), (f.eggs.id, 2)], &[f.breakfast.id]),
            )
            .await
            .unwrap();

        let replaced = replace_associations(
            &f.store,
            created.recipe.id,
            vec![IngredientAmount::new(f.sugar.id, 30)],
            vec![f.dinner.id],
        )
        .await
        .unwrap();

        assert_eq!(replaced.ingredient_amounts(), vec![(f.sugar.id, 30)]);
        assert_eq!(replaced.tag_ids(), vec![f.dinner.id]);

        let stored = f.store.find_recipe(created.recipe.id).await.unwrap().unwrap();
        assert_eq!(stored, replaced);
    }

    #[tokio::test]
    async fn test_missing_tag_leaves_recipe_unchanged() {
        let f = fixture().await;
        let created = f
            .store
            .create_recipe(
                Uuid::new_v4(),
                new_recipe("Pancakes"),
                &set(&[(f.flour.id, 200)], &[f.breakfast.id]),
            )
            .await
            .unwrap();

        let ghost = Uuid::new_v4();
        let err = replace_associations(
            &f.store,
            created.recipe.id,
            vec![IngredientAmount::new(f.sugar.id, 30)],
            vec![f.dinner.id, ghost],
        )
        .await
        .unwrap_err();

        match err {
            RecipeError::NotFound { entity, ids } => {
                assert_eq!(entity, "tag");
                assert_eq!(ids, vec![ghost]);
            }
            other => panic!("expected NotFound, got {other:?}"),
        }

        let stored = f.store.find_recipe(created.recipe.id).await.unwrap().unwrap();
        assert_eq!(stored, created);
    }

    #[tokio::test]
    async fn test_missing_ingredient_on_update_keeps_fields() {
        let f = fixture().await;
        let created = f
            .store
            .create_recipe(
                Uuid::new_v4(),
                new_recipe("Pancakes"),
                &set(&[(f.flour.id, 200)], &[f.breakfast.id]),
            )
            .await
            .unwrap();

        let changes = RecipeChanges {
            name: Some("Waffles".to_string()),
            ..Default::default()
        };
        let err = f
            .store
            .update_recipe(
                created.recipe.id,
                changes,
                &set(&[(Uuid::new_v4(), 1)], &[f.breakfast.id]),
            )
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let stored = f.store.find_recipe(created.recipe.id).await.unwrap().unwrap();
        assert_eq!(stored.recipe.name, "Pancakes");
    }

    #[tokio::test]
    async fn test_update_applies_fields_and_associations() {
        let f = fixture().await;
        let created = f
            .store
            .create_recipe(
                Uuid::new_v4(),
                new_recipe("Pancakes"),
                &set(&[(f.flour.id, 200)], &[f.breakfast.id]),
            )
            .await
            .unwrap();

        let changes = RecipeChanges {
            cooking_time: Some(40),
            ..Default::default()
        };
        let updated = f
            .store
            .update_recipe(
                created.recipe.id,
                changes,
                &set(&[(f.eggs.id, 4)], &[f.breakfast.id, f.dinner.id]),
            )
            .await
            .unwrap();

        assert_eq!(updated.recipe.name, "Pancakes");
        assert_eq!(updated.recipe.cooking_time, 40);
        assert_eq!(updated.ingredient_amounts(), vec![(f.eggs.id, 4)]);
        assert_eq!(updated.tag_ids(), vec![f.breakfast.id, f.dinner.id]);
    }

    #[tokio::test]
    async fn test_replace_unknown_recipe_is_not_found() {
        let f = fixture().await;
        let err = f
            .store
            .replace_associations(Uuid::new_v4(), &set(&[(f.flour.id, 1)], &[f.breakfast.id]))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_duplicate_input_rejected_before_store() {
        let f = fixture().await;
        let created = f
            .store
            .create_recipe(
                Uuid::new_v4(),
                new_recipe("Pancakes"),
                &set(&[(f.flour.id, 200)], &[f.breakfast.id]),
            )
            .await
            .unwrap();

        let err = replace_associations(
            &f.store,
            created.recipe.id,
            vec![
                IngredientAmount::new(f.eggs.id, 5),
                IngredientAmount::new(f.eggs.id, 3),
            ],
            vec![f.breakfast.id],
        )
        .await
        .unwrap_err();
        assert!(err.is_validation());

        let stored = f.store.find_recipe(created.recipe.id).await.unwrap().unwrap();
        assert_eq!(stored, created);
    }

    #[tokio::test]
    async fn test_shopping_list_sums_across_recipes() {
        let f = fixture().await;
        let user = Uuid::new_v4();

        let pancakes = f
            .store
            .create_recipe(
                Uuid::new_v4(),
                new_recipe("Pancakes"),
                &set(&[(f.flour.id, 200), (f.eggs.id, 2)], &[f.breakfast.id]),
            )
            .await
            .unwrap();
        let bread = f
            .store
            .create_recipe(
                Uuid::new_v4(),
                new_recipe("Bread"),
                &set(&[(f.flour.id, 150), (f.eggs.id, 1)], &[f.dinner.id]),
            )
            .await
            .unwrap();

        assert!(f.store.add_to_cart(user, pancakes.recipe.id).await.unwrap());
        assert!(f.store.add_to_cart(user, bread.recipe.id).await.unwrap());
        assert!(!f.store.add_to_cart(user, bread.recipe.id).await.unwrap());

        let entries = build_shopping_list(&f.store, user).await.unwrap();
        assert_eq!(render(&entries), "Eggs - 3 pcs\nFlour - 350 g\n");
    }

    #[tokio::test]
    async fn test_shopping_list_empty_cart() {
        let f = fixture().await;
        let entries = build_shopping_list(&f.store, Uuid::new_v4()).await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_shopping_list_is_deterministic() {
        let f = fixture().await;
        let user = Uuid::new_v4();

        for name in ["A", "B", "C"] {
            let recipe = f
                .store
                .create_recipe(
                    Uuid::new_v4(),
                    new_recipe(name),
                    &set(
                        &[(f.sugar.id, 10), (f.flour.id, 100), (f.eggs.id, 1)],
                        &[f.breakfast.id],
                    ),
                )
                .await
                .unwrap();
            f.store.add_to_cart(user, recipe.recipe.id).await.unwrap();
        }

        let first = render(&build_shopping_list(&f.store, user).await.unwrap());
        for _ in 0..5 {
            let again = render(&build_shopping_list(&f.store, user).await.unwrap());
            assert_eq!(first, again);
        }
        assert_eq!(first, "Eggs - 3 pcs\nFlour - 300 g\nSugar - 30 g\n");
    }

    #[tokio::test]
    async fn test_removed_and_deleted_recipes_leave_the_list() {
        let f = fixture().await;
        let user = Uuid::new_v4();

        let pancakes = f
            .store
            .create_recipe(
                Uuid::new_v4(),
                new_recipe("Pancakes"),
                &set(&[(f.flour.id, 200)], &[f.breakfast.id]),
            )
            .await
            .unwrap();
        let cake = f
            .store
            .create_recipe(
                Uuid::new_v4(),
                new_recipe("Cake"),
                &set(&[(f.sugar.id, 100)], &[f.dinner.id]),
            )
            .await
            .unwrap();
        f.store.add_to_cart(user, pancakes.recipe.id).await.unwrap();
        f.store.add_to_cart(user, cake.recipe.id).await.unwrap();

        assert!(f.store.remove_from_cart(user, pancakes.recipe.id).await.unwrap());
        assert!(!f.store.remove_from_cart(user, pancakes.recipe.id).await.unwrap());
        assert_eq!(
            render(&build_shopping_list(&f.store, user).await.unwrap()),
            "Sugar - 100 g\n"
        );

        assert!(f.store.delete_recipe(cake.recipe.id).await.unwrap());
        assert!(f.store.find_recipe(cake.recipe.id).await.unwrap().is_none());
        assert!(build_shopping_list(&f.store, user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_unknown_recipe_to_cart() {
        let store = InMemoryRecipeStore::new();
        let err = store.add_to_cart(Uuid::new_v4(), Uuid::new_v4()).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
