/// User accounts
///
/// - `POST /api/users/`: register
/// - `GET /api/users/`: list profiles
/// - `GET /api/users/{id}/`: one profile
/// - `GET /api/users/me/`: own profile
/// - `PUT /api/users/me/avatar/`, `DELETE /api/users/me/avatar/`
/// - `POST /api/users/set_password/`

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use foodgram_shared::{
    auth::{middleware::AuthContext, password},
    models::user::{CreateUser, User},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::responses::UserProfile,
};

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        email(message = "Enter a valid email address"),
        length(max = 254, message = "Email must be at most 254 characters")
    )]
    pub email: String,

    #[validate(length(min = 1, max = 150, message = "Username must be 1 to 150 characters"))]
    pub username: String,

    #[validate(length(min = 1, max = 150, message = "First name must be 1 to 150 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 150, message = "Last name must be 1 to 150 characters"))]
    pub last_name: String,

    pub password: String,
}

/// Password change request
#[derive(Debug, Deserialize)]
pub struct SetPasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Avatar upload request; the value is stored verbatim
#[derive(Debug, Deserialize, Validate)]
pub struct AvatarRequest {
    #[validate(length(min = 1, max = 512, message = "Avatar must be 1 to 512 characters"))]
    pub avatar: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AvatarResponse {
    pub avatar: String,
}

/// Checks username characters: letters, digits and `_ . @ + -`
///
/// `me` is reserved for the own-profile route.
pub fn validate_username(username: &str) -> Result<(), ApiError> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || "_.@+-".contains(c);

    if let Some(bad) = username.chars().find(|c| !allowed(*c)) {
        return Err(ApiError::field(
            "username",
            format!("Username contains a forbidden character: {bad}"),
        ));
    }

    if username.eq_ignore_ascii_case("me") {
        return Err(ApiError::field("username", "Username 'me' is reserved"));
    }

    Ok(())
}

/// Registers a new user
///
/// # Errors
///
/// - `400 Bad Request`: invalid fields, weak password, email or username taken
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    req.validate()?;
    validate_username(&req.username)?;
    password::validate_password_strength(&req.password, &req.username)
        .map_err(|e| ApiError::field("password", e))?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            username: req.username,
            first_name: req.first_name,
            last_name: req.last_name,
            password_hash,
        },
    )
    .await?;

    info!(user_id = %user.id, username = %user.username, "User registered");

    Ok((StatusCode::CREATED, Json(UserProfile::new(user, false))))
}

pub async fn list_users(
    State(state): State<AppState>,
    auth: Option<AuthContext>,
) -> ApiResult<Json<Vec<UserProfile>>> {
    let viewer = auth.map(|a| a.user_id);
    let users = User::list(&state.db).await?;

    let mut profiles = Vec::with_capacity(users.len());
    for user in users {
        profiles.push(UserProfile::for_viewer(&state.db, viewer, user).await?);
    }

    Ok(Json(profiles))
}

pub async fn get_user(
    State(state): State<AppState>,
    auth: Option<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserProfile>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user not found: {id}")))?;

    let profile = UserProfile::for_viewer(&state.db, auth.map(|a| a.user_id), user).await?;
    Ok(Json(profile))
}

pub async fn me(State(state): State<AppState>, auth: AuthContext) -> ApiResult<Json<UserProfile>> {
    let user = current_user(&state, auth).await?;
    Ok(Json(UserProfile::new(user, false)))
}

pub async fn set_avatar(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<AvatarRequest>,
) -> ApiResult<Json<AvatarResponse>> {
    req.validate()?;

    if !User::update_avatar(&state.db, auth.user_id, Some(&req.avatar)).await? {
        return Err(ApiError::Unauthorized("User no longer exists".to_string()));
    }

    Ok(Json(AvatarResponse { avatar: req.avatar }))
}

pub async fn delete_avatar(State(state): State<AppState>, auth: AuthContext) -> ApiResult<StatusCode> {
    User::update_avatar(&state.db, auth.user_id, None).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Changes the caller's password
///
/// # Errors
///
/// - `400 Bad Request`: wrong current password or weak new password
pub async fn set_password(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<SetPasswordRequest>,
) -> ApiResult<StatusCode> {
    let user = current_user(&state, auth).await?;

    if !password::verify_password(&req.current_password, &user.password_hash)? {
        return Err(ApiError::field("current_password", "Invalid password"));
    }

    password::validate_password_strength(&req.new_password, &user.username)
        .map_err(|e| ApiError::field("new_password", e))?;

    let password_hash = password::hash_password(&req.new_password)?;
    User::update_password(&state.db, user.id, &password_hash).await?;

    info!(user_id = %user.id, "Password changed");

    Ok(StatusCode::NO_CONTENT)
}

/// The user behind a token; a token for a deleted user is treated as invalid
async fn current_user(state: &AppState, auth: AuthContext) -> ApiResult<User> {
    User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".to_string()))
}
