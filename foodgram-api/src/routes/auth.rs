/// Token login
///
/// ```text
/// POST /api/auth/token/login/
/// Content-Type: application/json
///
/// { "email": "cook@example.com", "password": "pancakes-42" }
/// ```
///
/// ```json
/// { "auth_token": "eyJ..." }
/// ```
///
/// Tokens are stateless JWTs; logging out is dropping the token client-side.

use axum::{extract::State, Json};
use chrono::Duration;
use foodgram_shared::{
    auth::{jwt, password},
    models::user::User,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

const INVALID_CREDENTIALS: &str = "Unable to log in with provided credentials.";

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "This field may not be blank"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub auth_token: String,
}

/// Exchanges email and password for a token
///
/// # Errors
///
/// - `400 Bad Request`: malformed input or wrong credentials
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::BadRequest(INVALID_CREDENTIALS.to_string()))?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        return Err(ApiError::BadRequest(INVALID_CREDENTIALS.to_string()));
    }

    let claims = jwt::Claims::with_expiration(
        user.id,
        Duration::hours(state.config.jwt.expiration_hours),
    );
    let auth_token = jwt::create_token(&claims, state.jwt_secret())?;

    info!(user_id = %user.id, "User logged in");

    Ok(Json(TokenResponse { auth_token }))
}
