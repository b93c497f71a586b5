use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::{
    auth::{jwt::JwtKeys, repo, repo::CurrentUser},
    error::ApiError,
    state::AppState,
};

/// Required identity: rejects the request with a generic 401 when the
/// bearer token is missing, fails verification, or its user is gone.
pub struct AuthUser(pub CurrentUser);

/// Optional identity: the same pipeline, but every failure silently
/// yields a guest context instead of a rejection.
pub struct MaybeAuthUser(pub Option<CurrentUser>);

async fn resolve_user(parts: &Parts, state: &AppState) -> Result<CurrentUser, ApiError> {
    let auth_header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthenticated)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
        .ok_or(ApiError::Unauthenticated)?;

    let keys = JwtKeys::from_ref(state);
    let claims = keys.verify(token).map_err(|_| {
        warn!("invalid or expired token");
        ApiError::Unauthenticated
    })?;

    // The account may have been deleted or deactivated since issuance.
    repo::find_current(&state.db, claims.sub)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| {
            warn!(user_id = %claims.sub, "token subject no longer exists");
            ApiError::Unauthenticated
        })
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_user(parts, state).await.map(AuthUser)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(resolve_user(parts, state).await.ok()))
    }
}
