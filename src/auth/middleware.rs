//! Authentication extractors
//!
//! Resolve the bearer token at the boundary into explicit identity
//! context passed to services; no handler reads ambient principal state.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};

use super::token::{verify_token, Claims};
use crate::error::AppError;
use crate::AppState;

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(ToOwned::to_owned)
}

/// Extractor for the authenticated subject
///
/// Rejects with 401 when the bearer token is missing or invalid.
///
/// # Usage
/// ```ignore
/// async fn handler(CurrentUser(claims): CurrentUser) -> impl IntoResponse {
///     format!("Hello, {}", claims.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let token = extract_bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let claims = verify_token(&token, &app_state.config.auth)?;

        Ok(CurrentUser(claims))
    }
}

/// Optional viewer extractor
///
/// Returns None for anonymous or unverifiable callers, instead of error.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<Claims>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let claims = extract_bearer_token(&parts.headers)
            .and_then(|token| verify_token(&token, &app_state.config.auth).ok());

        Ok(MaybeUser(claims))
    }
}
