//! Bearer token authentication middleware

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};

use crate::error::{AppError, AuthError};
use crate::AppState;

/// Extract the token from an `Authorization: Bearer <token>` header
fn extract_bearer_token(request: &Request<Body>) -> Option<&str> {
    let value = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Authentication middleware
///
/// Verifies the bearer token and injects the `Authenticated` principal into
/// request extensions. Routes that require authentication should use this middleware.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&request).ok_or(AuthError::MissingCredentials)?;

    let principal = state.access_guard.verify(token)?;
    tracing::debug!(subject = %principal.subject, "Authenticated request");

    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}
