/// Favorite recipes
///
/// - `POST /api/recipes/{id}/favorite/` → 201 minified recipe
/// - `DELETE /api/recipes/{id}/favorite/` → 204

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use foodgram_shared::{
    auth::middleware::AuthContext,
    models::{favorite::Favorite, recipe::RecipeSummary},
};
use tracing::info;
use uuid::Uuid;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::recipes::find_recipe,
};

/// # Errors
///
/// - `400 Bad Request`: already a favorite
/// - `404 Not Found`: unknown recipe
pub async fn add_favorite(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<RecipeSummary>)> {
    let recipe = find_recipe(&state, id).await?;

    if !Favorite::add(&state.db, auth.user_id, id).await? {
        return Err(ApiError::field("recipe", "Recipe is already in favorites"));
    }

    info!(user_id = %auth.user_id, recipe_id = %id, "Added to favorites");

    Ok((StatusCode::CREATED, Json(RecipeSummary::from(&recipe.recipe))))
}

/// # Errors
///
/// - `400 Bad Request`: not a favorite
/// - `404 Not Found`: unknown recipe
pub async fn remove_favorite(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    find_recipe(&state, id).await?;

    if !Favorite::remove(&state.db, auth.user_id, id).await? {
        return Err(ApiError::field("recipe", "Recipe is not in favorites"));
    }

    info!(user_id = %auth.user_id, recipe_id = %id, "Removed from favorites");

    Ok(StatusCode::NO_CONTENT)
}
