use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{AuthError, Claims};
use crate::error::ApiError;
use crate::AppState;

/// Authenticated caller extracted from the bearer token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self { user_id: claims.sub }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingScope(_) => ApiError::forbidden(err.to_string()),
            AuthError::InvalidToken(_) => ApiError::unauthorized(err.to_string()),
            AuthError::KeySet(msg) => {
                tracing::error!("Signing key error: {}", msg);
                ApiError::service_unavailable("Authentication temporarily unavailable")
            }
        }
    }
}

/// JWT authentication middleware that validates tokens and extracts user context.
///
/// Passes every request through untouched when the state carries no verifier
/// (authentication enforced upstream).
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(verifier) = state.verifier.as_deref() else {
        return Ok(next.run(request).await);
    };

    let token = extract_jwt_from_headers(&headers).map_err(ApiError::unauthorized)?;
    let claims = verifier.verify(token)?;

    tracing::debug!(user = %claims.sub, "authenticated request");
    request.extensions_mut().insert(AuthUser::from(claims));

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<&str, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        Some(_) => Err("Empty JWT token".to_string()),
        None => Err("Authorization header must use Bearer token format".to_string()),
    }
}
