use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    Json,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::LoginRequest,
        password::verify_password,
        token::TokenKeys,
    },
    error::ApiError,
    state::AppState,
    users,
};

/// POST /login — authenticate and hand back a raw token string.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<String, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::Malformed(e.body_text()))?;
    let email = payload.email.trim().to_lowercase();

    let user = users::repo::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| {
            warn!(%email, "login with unknown email");
            ApiError::LoginFailed
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = user.id, "login with wrong password");
        return Err(ApiError::LoginFailed);
    }

    let keys = TokenKeys::from_ref(&state);
    let token = keys.issue(user.id)?;
    info!(user_id = user.id, "user logged in");
    Ok(token)
}
