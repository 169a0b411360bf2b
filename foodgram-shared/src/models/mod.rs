/// Database models and their table-level operations
///
/// - `user`: accounts
/// - `ingredient`, `tag`: reference data
/// - `recipe`: recipes, their ingredient lines, listing filters
/// - `favorite`, `shopping_cart`: per-user recipe sets keyed by (user, recipe)
/// - `subscription`: subscriber → author links
///
/// Each model exposes associated functions taking a pool (or, for the
/// lookups used inside transactions, any executor).

pub mod favorite;
pub mod ingredient;
pub mod recipe;
pub mod shopping_cart;
pub mod subscription;
pub mod tag;
pub mod user;
