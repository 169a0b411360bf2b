//! # Foodgram API Server Library
//!
//! HTTP layer of the Foodgram recipe backend: request validation, auth and
//! JSON representations on top of `foodgram-shared`.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
