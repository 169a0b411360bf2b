/// Author subscriptions
///
/// - `GET /api/users/subscriptions/?recipes_limit=N`
/// - `POST /api/users/{id}/subscribe/?recipes_limit=N`
/// - `DELETE /api/users/{id}/subscribe/`

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use foodgram_shared::{
    auth::middleware::AuthContext,
    models::{subscription::Subscription, user::User},
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::responses::AuthorWithRecipes,
};

#[derive(Debug, Default, Deserialize)]
pub struct RecipesLimit {
    pub recipes_limit: Option<i64>,
}

impl RecipesLimit {
    fn checked(&self) -> ApiResult<Option<i64>> {
        match self.recipes_limit {
            Some(limit) if limit < 0 => Err(ApiError::field(
                "recipes_limit",
                "recipes_limit must not be negative",
            )),
            limit => Ok(limit),
        }
    }
}

/// Authors the caller follows, each with their latest recipes
pub async fn list_subscriptions(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(params): Query<RecipesLimit>,
) -> ApiResult<Json<Vec<AuthorWithRecipes>>> {
    let limit = params.checked()?;

    let author_ids = Subscription::author_ids(&state.db, auth.user_id).await?;
    let authors = User::list_by_ids(&state.db, &author_ids).await?;

    let mut result = Vec::with_capacity(authors.len());
    for author in authors {
        result.push(AuthorWithRecipes::build(&state.db, author, limit).await?);
    }

    Ok(Json(result))
}

/// Follows an author
///
/// # Errors
///
/// - `400 Bad Request`: subscribing to yourself or already subscribed
/// - `404 Not Found`: unknown author
pub async fn subscribe(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(author_id): Path<Uuid>,
    Query(params): Query<RecipesLimit>,
) -> ApiResult<(StatusCode, Json<AuthorWithRecipes>)> {
    let limit = params.checked()?;

    let author = User::find_by_id(&state.db, author_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user not found: {author_id}")))?;

    if author.id == auth.user_id {
        return Err(ApiError::field("author", "You cannot subscribe to yourself"));
    }

    if Subscription::create(&state.db, auth.user_id, author.id)
        .await?
        .is_none()
    {
        return Err(ApiError::field("author", "Already subscribed to this author"));
    }

    info!(subscriber_id = %auth.user_id, %author_id, "Subscribed");

    let body = AuthorWithRecipes::build(&state.db, author, limit).await?;
    Ok((StatusCode::CREATED, Json(body)))
}

/// Stops following an author
///
/// # Errors
///
/// - `400 Bad Request`: not subscribed
/// - `404 Not Found`: unknown author
pub async fn unsubscribe(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(author_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if User::find_by_id(&state.db, author_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("user not found: {author_id}")));
    }

    if !Subscription::delete(&state.db, auth.user_id, author_id).await? {
        return Err(ApiError::field("author", "Not subscribed to this author"));
    }

    info!(subscriber_id = %auth.user_id, %author_id, "Unsubscribed");

    Ok(StatusCode::NO_CONTENT)
}
