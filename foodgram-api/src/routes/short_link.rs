/// Short links
///
/// `GET /api/recipes/{id}/get-link/` hands out `{public_url}/s/{id}/`;
/// `GET /s/{id}/` redirects back to the recipe page.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{app::AppState, error::ApiResult, routes::recipes::find_recipe};

#[derive(Debug, Serialize, Deserialize)]
pub struct ShortLinkResponse {
    #[serde(rename = "short-link")]
    pub short_link: String,
}

pub async fn get_link(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ShortLinkResponse>> {
    find_recipe(&state, id).await?;

    Ok(Json(ShortLinkResponse {
        short_link: state.config.short_link(id),
    }))
}

/// 302 to the recipe page of the frontend
pub async fn redirect(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    find_recipe(&state, id).await?;

    Ok((
        StatusCode::FOUND,
        [(header::LOCATION, format!("/recipes/{id}/"))],
    ))
}
