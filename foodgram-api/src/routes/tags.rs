/// Tags (read-only)
///
/// - `GET /api/tags/`
/// - `GET /api/tags/{id}/`

use axum::{
    extract::{Path, State},
    Json,
};
use foodgram_shared::models::tag::Tag;
use uuid::Uuid;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Json<Vec<Tag>>> {
    Ok(Json(Tag::list(&state.db).await?))
}

pub async fn get_tag(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<Tag>> {
    Tag::find_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("tag not found: {id}")))
}
