//! # Foodgram API Server
//!
//! Serves the recipe, user, subscription and shopping cart API.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/foodgram \
//! JWT_SECRET=$(openssl rand -hex 32) \
//! cargo run -p foodgram-api
//! ```

use foodgram_api::{
    app::{build_router, AppState},
    config::Config,
};
use foodgram_shared::db::{
    migrations::run_migrations,
    pool::{close_pool, create_pool},
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "foodgram_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Foodgram API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;
    let bind_address = config.bind_address();

    let pool = create_pool(config.pool_config()).await?;
    run_migrations(&pool).await?;

    let app = build_router(AppState::new(pool.clone(), config));

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
