/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use foodgram_api::{app::AppState, config::Config};
/// use foodgram_shared::db::pool::create_pool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(config.pool_config()).await?;
/// let app = foodgram_api::app::build_router(AppState::new(pool, config));
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use foodgram_shared::{
    auth::middleware::create_jwt_middleware,
    store::{PgRecipeStore, RecipeStore},
};
use sqlx::PgPool;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;

/// Shared application state
///
/// Cloned per request; everything inside is reference-counted.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Recipe writes and cart aggregation
    pub store: Arc<dyn RecipeStore>,
}

impl AppState {
    /// State backed by PostgreSQL throughout
    pub fn new(db: PgPool, config: Config) -> Self {
        let store = Arc::new(PgRecipeStore::new(db.clone()));
        Self::with_store(db, config, store)
    }

    /// State with a custom recipe store
    pub fn with_store(db: PgPool, config: Config, store: Arc<dyn RecipeStore>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            store,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /health
/// /api/
/// ├── auth/token/login/                 POST
/// ├── users/                            GET POST
/// │   ├── me/                           GET
/// │   ├── me/avatar/                    PUT DELETE
/// │   ├── set_password/                 POST
/// │   ├── subscriptions/                GET
/// │   ├── :id/                          GET
/// │   └── :id/subscribe/                POST DELETE
/// ├── tags/, tags/:id/                  GET
/// ├── ingredients/, ingredients/:id/    GET
/// └── recipes/                          GET POST
///     ├── download_shopping_cart/       GET
///     ├── :id/                          GET PATCH DELETE
///     ├── :id/get-link/                 GET
///     ├── :id/favorite/                 POST DELETE
///     └── :id/shopping_cart/            POST DELETE
/// /s/:id/                               GET (redirect)
/// ```
///
/// # Middleware Stack
///
/// Outermost first:
/// 1. CORS (tower-http CorsLayer)
/// 2. Logging (tower-http TraceLayer)
/// 3. Token authentication (anonymous requests pass through)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let api_routes = Router::new()
        .route("/auth/token/login/", post(routes::auth::login))
        .route(
            "/users/",
            get(routes::users::list_users).post(routes::users::register),
        )
        .route("/users/me/", get(routes::users::me))
        .route(
            "/users/me/avatar/",
            put(routes::users::set_avatar).delete(routes::users::delete_avatar),
        )
        .route("/users/set_password/", post(routes::users::set_password))
        .route(
            "/users/subscriptions/",
            get(routes::subscriptions::list_subscriptions),
        )
        .route("/users/:id/", get(routes::users::get_user))
        .route(
            "/users/:id/subscribe/",
            post(routes::subscriptions::subscribe).delete(routes::subscriptions::unsubscribe),
        )
        .route("/tags/", get(routes::tags::list_tags))
        .route("/tags/:id/", get(routes::tags::get_tag))
        .route("/ingredients/", get(routes::ingredients::list_ingredients))
        .route("/ingredients/:id/", get(routes::ingredients::get_ingredient))
        .route(
            "/recipes/",
            get(routes::recipes::list_recipes).post(routes::recipes::create_recipe),
        )
        .route(
            "/recipes/download_shopping_cart/",
            get(routes::shopping_cart::download_shopping_cart),
        )
        .route(
            "/recipes/:id/",
            get(routes::recipes::get_recipe)
                .patch(routes::recipes::update_recipe)
                .delete(routes::recipes::delete_recipe),
        )
        .route("/recipes/:id/get-link/", get(routes::short_link::get_link))
        .route(
            "/recipes/:id/favorite/",
            post(routes::favorites::add_favorite).delete(routes::favorites::remove_favorite),
        )
        .route(
            "/recipes/:id/shopping_cart/",
            post(routes::shopping_cart::add_to_cart)
                .delete(routes::shopping_cart::remove_from_cart),
        );

    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/s/:id/", get(routes::short_link::redirect))
        .nest("/api", api_routes)
        .layer(axum::middleware::from_fn(create_jwt_middleware(
            state.jwt_secret().to_string(),
        )))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
