/// Recipe core
///
/// - [`associations`]: the Association Writer, which replaces a recipe's
///   ingredient and tag links in one transaction
/// - [`shopping_list`]: the Shopping List Aggregator, which sums ingredient
///   amounts over a user's cart
///
/// Both work against any [`crate::store::RecipeStore`].

pub mod associations;
pub mod shopping_list;

pub use associations::{replace_associations, AssociationSet, IngredientAmount};
pub use shopping_list::{build_shopping_list, render, ShoppingListEntry};
