/// API route handlers, one module per resource
///
/// - `health`: liveness and database status
/// - `auth`: token login
/// - `users`, `subscriptions`: accounts and author follows
/// - `tags`, `ingredients`: reference data
/// - `recipes`, `favorites`, `shopping_cart`, `short_link`: recipes and
///   per-user lists
/// - `responses`: representations shared across resources

pub mod auth;
pub mod favorites;
pub mod health;
pub mod ingredients;
pub mod recipes;
pub mod responses;
pub mod shopping_cart;
pub mod short_link;
pub mod subscriptions;
pub mod tags;
pub mod users;
