/// Authentication middleware for Axum
///
/// One middleware covers the whole API. A request without an
/// `Authorization` header passes through anonymously; a request with one must
/// carry a valid token, otherwise it is rejected with 401 before reaching a
/// handler. On success an [`AuthContext`] is added to the request extensions.
///
/// Accepted header forms:
///
/// ```text
/// Authorization: Token <jwt>
/// Authorization: Bearer <jwt>
/// ```
///
/// Handlers that require a user take `AuthContext` as an extractor, handlers
/// where login is optional take `Option<AuthContext>`.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Router};
/// use foodgram_shared::auth::middleware::{create_jwt_middleware, AuthContext};
///
/// async fn me(auth: AuthContext) -> String {
///     format!("Hello, user {}!", auth.user_id)
/// }
///
/// let app: Router = Router::new()
///     .route("/me", get(me))
///     .layer(middleware::from_fn(create_jwt_middleware("secret")));
/// ```

use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::jwt::{validate_token, JwtError};

/// Authenticated caller, added to request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
}

impl AuthContext {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

/// Error type for authentication
#[derive(Debug)]
pub enum AuthError {
    /// No credentials on a route that needs a user
    MissingCredentials,

    /// Authorization header present but unparseable
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingCredentials => {
                "Authentication credentials were not provided.".to_string()
            }
            AuthError::InvalidFormat(msg) | AuthError::InvalidToken(msg) => msg,
        };

        let body = json!({ "error": "unauthorized", "message": message });
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .ok_or(AuthError::MissingCredentials)
    }
}

/// Pulls the token out of an `Authorization` header value
pub fn extract_token(header_value: &str) -> Result<&str, AuthError> {
    let token = header_value
        .strip_prefix("Token ")
        .or_else(|| header_value.strip_prefix("Bearer "))
        .ok_or_else(|| AuthError::InvalidFormat("Expected Token or Bearer scheme".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(AuthError::InvalidFormat("Empty token".to_string()));
    }

    Ok(token)
}

/// JWT authentication middleware
///
/// # Errors
///
/// 401 when the header is present but not a valid, unexpired token.
pub async fn jwt_auth_middleware(
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        return Ok(next.run(req).await);
    };

    let value = value
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("Invalid Authorization header".to_string()))?;
    let token = extract_token(value)?;

    let claims = validate_token(token, &secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer { .. } => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken("Invalid token".to_string()),
    })?;

    req.extensions_mut().insert(AuthContext::new(claims.sub));

    Ok(next.run(req).await)
}

/// Captures the JWT secret and returns a middleware function
pub fn create_jwt_middleware(
    secret: impl Into<String>,
) -> impl Fn(Request, Next) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AuthError>> + Send>> + Clone {
    let secret = secret.into();
    move |req, next| {
        let secret = secret.clone();
        Box::pin(jwt_auth_middleware(secret, req, next))
    }
}
