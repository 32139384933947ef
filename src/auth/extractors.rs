use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    auth::token::{bearer_token, TokenKeys},
    error::ApiError,
    state::AppState,
};

/// Extracts the authenticated caller's user ID from the bearer token.
///
/// Validates the token again rather than trusting upstream middleware, so a
/// handler using it is safe even if wired into an unprotected route.
pub struct AuthUser(pub i64);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let keys = TokenKeys::from_ref(state);
        let raw = bearer_token(&parts.headers);
        let user_id = keys.subject(&raw)?;
        Ok(AuthUser(user_id))
    }
}
