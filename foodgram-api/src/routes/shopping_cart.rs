/// Shopping cart
///
/// - `POST /api/recipes/{id}/shopping_cart/` → 201 minified recipe
/// - `DELETE /api/recipes/{id}/shopping_cart/` → 204
/// - `GET /api/recipes/download_shopping_cart/` → `shopping_list.txt`
///
/// The download is the Shopping List Aggregator's output, one line per
/// ingredient:
///
/// ```text
/// Eggs - 3 pcs
/// Flour - 350 g
/// ```

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use foodgram_shared::{
    auth::middleware::AuthContext,
    models::recipe::RecipeSummary,
    recipes::{build_shopping_list, render},
};
use tracing::info;
use uuid::Uuid;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::recipes::find_recipe,
};

/// Attachment name of the downloaded list
pub const SHOPPING_LIST_FILENAME: &str = "shopping_list.txt";

/// # Errors
///
/// - `400 Bad Request`: already in the cart
/// - `404 Not Found`: unknown recipe
pub async fn add_to_cart(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<RecipeSummary>)> {
    let recipe = find_recipe(&state, id).await?;

    if !state.store.add_to_cart(auth.user_id, id).await? {
        return Err(ApiError::field("recipe", "Recipe is already in the shopping cart"));
    }

    info!(user_id = %auth.user_id, recipe_id = %id, "Added to shopping cart");

    Ok((StatusCode::CREATED, Json(RecipeSummary::from(&recipe.recipe))))
}

/// # Errors
///
/// - `400 Bad Request`: not in the cart
/// - `404 Not Found`: unknown recipe
pub async fn remove_from_cart(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    find_recipe(&state, id).await?;

    if !state.store.remove_from_cart(auth.user_id, id).await? {
        return Err(ApiError::field("recipe", "Recipe is not in the shopping cart"));
    }

    info!(user_id = %auth.user_id, recipe_id = %id, "Removed from shopping cart");

    Ok(StatusCode::NO_CONTENT)
}

/// Aggregated ingredient totals of the caller's cart as a text attachment
///
/// An empty cart downloads an empty file.
pub async fn download_shopping_cart(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<impl IntoResponse> {
    let entries = build_shopping_list(state.store.as_ref(), auth.user_id).await?;
    let body = render(&entries);

    info!(
        user_id = %auth.user_id,
        entries = entries.len(),
        "Shopping list downloaded"
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{SHOPPING_LIST_FILENAME}\""),
            ),
        ],
        body,
    ))
}
