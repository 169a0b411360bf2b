//! Common test utilities for integration tests
//!
//! - [`TestContext::memory`]: router over the in-memory recipe store and a
//!   lazily connected pool; nothing here may run SQL
//! - [`TestContext::postgres`]: router over a live database (`DATABASE_URL`)
//! - token and request helpers

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use foodgram_api::{
    app::{build_router, AppState},
    config::{ApiConfig, Config, DatabaseConfig, JwtConfig},
};
use foodgram_shared::{
    auth::jwt::{create_token, Claims},
    db::{migrations::run_migrations, pool::create_lazy_pool},
    models::{
        ingredient::Ingredient,
        recipe::RecipeWithAssociations,
        tag::Tag,
    },
    recipes::{AssociationSet, IngredientAmount},
    store::{InMemoryRecipeStore, NewRecipe, RecipeStore},
};
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

pub fn test_config(database_url: &str) -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            public_url: "http://foodgram.test".to_string(),
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: database_url.to_string(),
            max_connections: 5,
        },
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            expiration_hours: 24,
        },
    }
}

/// Bearer header value for `user_id`
pub fn bearer(user_id: Uuid) -> String {
    let token = create_token(&Claims::new(user_id), TEST_SECRET).unwrap();
    format!("Bearer {}", token)
}

/// Test context holding the router and its backing stores
pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
    pub memory: Option<Arc<InMemoryRecipeStore>>,
}

impl TestContext {
    /// Router over the in-memory recipe store
    pub fn memory() -> Self {
        let config = test_config("postgresql://localhost/foodgram_unused");
        let db = create_lazy_pool(&config.pool_config()).unwrap();
        let store = Arc::new(InMemoryRecipeStore::new());

        let state = AppState::with_store(db.clone(), config, store.clone());

        Self {
            db,
            app: build_router(state),
            memory: Some(store),
        }
    }

    /// Router over PostgreSQL at `DATABASE_URL`, migrations applied
    pub async fn postgres() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let url = std::env::var("DATABASE_URL")?;
        let config = test_config(&url);

        let db = PgPool::connect(&url).await?;
        run_migrations(&db).await?;

        Ok(Self {
            db: db.clone(),
            app: build_router(AppState::new(db, config)),
            memory: None,
        })
    }

    pub fn store(&self) -> &InMemoryRecipeStore {
        self.memory.as_deref().expect("memory store")
    }

    /// Seeds Flour (g), Eggs (pcs) and a breakfast tag
    pub async fn seed(&self) -> (Ingredient, Ingredient, Tag) {
        let store = self.store();
        let flour = store.insert_ingredient("Flour", "g").await;
        let eggs = store.insert_ingredient("Eggs", "pcs").await;
        let tag = store.insert_tag("Breakfast", "breakfast").await;
        (flour, eggs, tag)
    }

    /// Creates a recipe directly in the in-memory store
    pub async fn recipe(
        &self,
        author_id: Uuid,
        name: &str,
        ingredients: Vec<(Uuid, i32)>,
        tag_ids: Vec<Uuid>,
    ) -> RecipeWithAssociations {
        let ingredients = ingredients
            .into_iter()
            .map(|(id, amount)| IngredientAmount::new(id, amount))
            .collect();
        let associations = AssociationSet::new(ingredients, tag_ids).unwrap();

        self.store()
            .create_recipe(
                author_id,
                NewRecipe {
                    name: name.to_string(),
                    text: "Mix and cook.".to_string(),
                    image: "data:image/png;base64,AAAA".to_string(),
                    cooking_time: 10,
                },
                &associations,
            )
            .await
            .unwrap()
    }

    /// Sends one request through the router
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        auth: Option<Uuid>,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(user_id) = auth {
            builder = builder.header(header::AUTHORIZATION, bearer(user_id));
        }

        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
