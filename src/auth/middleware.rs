use axum::{
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::{
    auth::token::{bearer_token, TokenKeys},
    state::AppState,
};

/// Gate for protected routes: verify the bearer token and short-circuit with
/// 401 before the inner handler runs. Identity extraction is left to the
/// [`AuthUser`](crate::auth::extractors::AuthUser) extractor.
pub async fn require_auth(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let keys = TokenKeys::from_ref(&state);
    let raw = bearer_token(req.headers());
    if keys.verify(&raw).is_err() {
        warn!(uri = %req.uri(), "rejected unauthenticated request");
        return crate::error::ApiError::Unauthenticated.into_response();
    }
    next.run(req).await
}
