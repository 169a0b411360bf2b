/// Ingredients (read-only)
///
/// - `GET /api/ingredients/?name=fl`: case-insensitive name prefix search
/// - `GET /api/ingredients/{id}/`

use axum::{
    extract::{Path, Query, State},
    Json,
};
use foodgram_shared::models::ingredient::Ingredient;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

#[derive(Debug, Default, Deserialize)]
pub struct IngredientSearch {
    /// Name prefix
    pub name: Option<String>,
}

pub async fn list_ingredients(
    State(state): State<AppState>,
    Query(search): Query<IngredientSearch>,
) -> ApiResult<Json<Vec<Ingredient>>> {
    let ingredients = Ingredient::list(&state.db, search.name.as_deref()).await?;
    Ok(Json(ingredients))
}

pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Ingredient>> {
    Ingredient::find_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("ingredient not found: {id}")))
}
