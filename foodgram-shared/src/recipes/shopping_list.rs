/// Shopping List Aggregator
///
/// Sums the ingredient amounts of every recipe in a user's cart, one total
/// per ingredient, and renders the result as plain text:
///
/// ```text
/// Eggs - 3 pcs
/// Flour - 350 g
/// ```
///
/// Lines are ordered by ingredient name, then unit, then ingredient ID, so
/// repeated downloads of an unchanged cart are byte-identical.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::RecipeResult;
use crate::store::RecipeStore;

/// One ingredient line of one recipe in the cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CartIngredientLine {
    pub recipe_id: Uuid,
    pub ingredient_id: Uuid,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Total amount of one ingredient across the cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingListEntry {
    pub ingredient_id: Uuid,
    pub name: String,
    pub measurement_unit: String,
    pub total_amount: i64,
}

impl ShoppingListEntry {
    /// `name - amount unit`
    pub fn to_line(&self) -> String {
        format!("{} - {} {}", self.name, self.total_amount, self.measurement_unit)
    }
}

/// Builds the shopping list for `user_id`
///
/// An empty cart gives an empty list. Ingredients used by no recipe in the
/// cart never appear.
pub async fn build_shopping_list(
    store: &dyn RecipeStore,
    user_id: Uuid,
) -> RecipeResult<Vec<ShoppingListEntry>> {
    let lines = store.cart_ingredient_lines(user_id).await?;
    let entries = aggregate(lines);

    debug!(%user_id, entries = entries.len(), "Built shopping list");

    Ok(entries)
}

/// Groups lines by ingredient and sums their amounts
pub fn aggregate(lines: impl IntoIterator<Item = CartIngredientLine>) -> Vec<ShoppingListEntry> {
    let mut totals: HashMap<Uuid, ShoppingListEntry> = HashMap::new();

    for line in lines {
        totals
            .entry(line.ingredient_id)
            .and_modify(|entry| entry.total_amount += i64::from(line.amount))
            .or_insert_with(|| ShoppingListEntry {
                ingredient_id: line.ingredient_id,
                name: line.name,
                measurement_unit: line.measurement_unit,
                total_amount: i64::from(line.amount),
            });
    }

    let mut entries: Vec<ShoppingListEntry> = totals.into_values().collect();
    entries.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.measurement_unit.cmp(&b.measurement_unit))
            .then_with(|| a.ingredient_id.cmp(&b.ingredient_id))
    });
    entries
}

/// Renders entries one per line, each terminated by `\n`
pub fn render(entries: &[ShoppingListEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&entry.to_line());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(recipe_id: Uuid, ingredient_id: Uuid, name: &str, unit: &str, amount: i32) -> CartIngredientLine {
        CartIngredientLine {
            recipe_id,
            ingredient_id,
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    #[test]
    fn test_same_ingredient_is_summed() {
        let flour = Uuid::new_v4();
        let (r1, r2) = (Uuid::new_v4(), Uuid::new_v4());

        let entries = aggregate(vec![
            line(r1, flour, "Flour", "g", 200),
            line(r2, flour, "Flour", "g", 150),
        ]);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Flour");
        assert_eq!(entries[0].measurement_unit, "g");
        assert_eq!(entries[0].total_amount, 350);
    }

    #[test]
    fn test_no_lines_gives_empty_list() {
        assert!(aggregate(Vec::new()).is_empty());
        assert_eq!(render(&[]), "");
    }

    #[test]
    fn test_entries_sorted_by_name() {
        let r = Uuid::new_v4();
        let entries = aggregate(vec![
            line(r, Uuid::new_v4(), "Sugar", "g", 10),
            line(r, Uuid::new_v4(), "Eggs", "pcs", 2),
            line(r, Uuid::new_v4(), "Milk", "ml", 300),
        ]);

        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Eggs", "Milk", "Sugar"]);
    }

    #[test]
    fn test_sums_do_not_overflow_i32() {
        let salt = Uuid::new_v4();
        let entries = aggregate(vec![
            line(Uuid::new_v4(), salt, "Salt", "g", i32::MAX),
            line(Uuid::new_v4(), salt, "Salt", "g", i32::MAX),
        ]);

        assert_eq!(entries[0].total_amount, 2 * i64::from(i32::MAX));
    }

    #[test]
    fn test_render_format() {
        let r = Uuid::new_v4();
        let entries = aggregate(vec![
            line(r, Uuid::new_v4(), "Flour", "g", 350),
            line(r, Uuid::new_v4(), "Яйца", "шт", 3),
        ]);

        assert_eq!(render(&entries), "Flour - 350 g\nЯйца - 3 шт\n");
    }
}
