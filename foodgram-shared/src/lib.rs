//! # Foodgram Shared Library
//!
//! Domain types, storage and business logic behind the Foodgram API.
//!
//! ## Module Organization
//!
//! - `models`: Database models (users, recipes, reference data, user lists)
//! - `recipes`: Association Writer and Shopping List Aggregator
//! - `store`: Transactional recipe storage (PostgreSQL and in-memory)
//! - `auth`: Password hashing, JWT and Axum auth middleware
//! - `db`: Connection pool and migrations
//! - `error`: Recipe core error type

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod recipes;
pub mod store;

/// Current version of the Foodgram shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
